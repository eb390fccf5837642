//! CFF outline extraction: run every CharString through the interpreter
//! and collect the resulting cubic command lists.

use kurbo::Point;
use read_fonts::FontRef;

use crosstype_cff::{interp, parse};

use crate::{
    error::{Error, Result},
    outline::{Outline, PathCommand},
    source::{CFF, TableSource},
};

/// Extract one outline per glyph from the font's `CFF ` table.
pub fn extract_outlines(font: &FontRef) -> Result<Vec<Outline>> {
    let data = TableSource::table_data(font, CFF).ok_or(Error::MissingTable(CFF))?;
    let cff = parse::parse(data)?;

    let mut outlines = Vec::with_capacity(cff.charstrings.len());
    for (gid, charstring) in cff.charstrings.iter().enumerate() {
        let mut sink = CommandSink::default();
        interp::run(charstring, &cff.local_subrs, &cff.global_subrs, &mut sink)?;
        outlines.push(Outline::from_commands(gid as u16, sink.commands));
    }
    Ok(outlines)
}

/// Collects interpreter output as outline commands.
#[derive(Default)]
struct CommandSink {
    commands: Vec<PathCommand>,
}

impl interp::PathSink for CommandSink {
    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.commands.push(PathCommand::CurveTo(
            Point::new(x1, y1),
            Point::new(x2, y2),
            Point::new(x, y),
        ));
    }

    fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }
}

/// Interpret raw CharStrings (outside any container) into outlines; used
/// by the converter to verify and by tests to compare pre/post-optimization
/// geometry.
pub fn outlines_from_charstrings(
    charstrings: &[Vec<u8>],
    local_subrs: &[Vec<u8>],
) -> Result<Vec<Outline>> {
    let local: Vec<&[u8]> = local_subrs.iter().map(Vec::as_slice).collect();
    charstrings
        .iter()
        .enumerate()
        .map(|(gid, cs)| {
            let mut sink = CommandSink::default();
            interp::run(cs, &local, &[], &mut sink)?;
            Ok(Outline::from_commands(gid as u16, sink.commands))
        })
        .collect()
}

//! CFF table assembly: CharString generation, width defaults, font name
//! extraction, and the final table build.

use std::collections::HashMap;

use log::debug;
use read_fonts::{FontRef, TableProvider};

use crosstype_cff::{Encoder, table};

use crate::{
    error::Result,
    outline::{Outline, PathCommand},
};

/// Name used when the source font has no usable family name record.
const FALLBACK_NAME: &[u8] = b"UnnamedFont";

/// Width defaults for the Private DICT plus the per-glyph deltas that
/// follow from them.
#[derive(Debug)]
pub struct Widths {
    pub default_width: i32,
    pub nominal_width: i32,
    /// `None` when the glyph's advance equals `default_width` (the
    /// CharString then omits its width operand).
    pub per_glyph: Vec<Option<i32>>,
}

/// Pick defaults the Type 2 way: defaultWidthX is the most common advance
/// (those glyphs then pay zero bytes for width), nominalWidthX the rounded
/// mean (keeping the remaining deltas small).
pub fn compute_widths(advances: &[u16]) -> Widths {
    if advances.is_empty() {
        return Widths { default_width: 0, nominal_width: 0, per_glyph: Vec::new() };
    }

    let mut counts: HashMap<u16, usize> = HashMap::new();
    for &advance in advances {
        *counts.entry(advance).or_default() += 1;
    }
    let default_width = counts
        .iter()
        .max_by_key(|(advance, count)| (**count, std::cmp::Reverse(**advance)))
        .map(|(advance, _)| *advance as i32)
        .unwrap_or(0);

    let sum: u64 = advances.iter().map(|&a| a as u64).sum();
    let nominal_width = (sum as f64 / advances.len() as f64 + 0.5).floor() as i32;

    let per_glyph = advances
        .iter()
        .map(|&advance| (advance as i32 != default_width).then(|| advance as i32 - nominal_width))
        .collect();

    Widths { default_width, nominal_width, per_glyph }
}

/// Advance widths per glyph, following hmtx's trailing-run rule: glyphs
/// past numberOfHMetrics repeat the last advance.
pub fn advances(font: &FontRef, num_glyphs: usize) -> Vec<u16> {
    let (Ok(hhea), Ok(hmtx)) = (font.hhea(), font.hmtx()) else {
        debug!("no horizontal metrics; CFF widths default to zero");
        return vec![0; num_glyphs];
    };
    let num_h_metrics = hhea.number_of_h_metrics() as usize;
    let metrics = hmtx.h_metrics();
    let last = if num_h_metrics > 0 {
        metrics.get(num_h_metrics - 1).map(|m| m.advance.get()).unwrap_or(0)
    } else {
        0
    };

    (0..num_glyphs)
        .map(|gid| metrics.get(gid).map(|m| m.advance.get()).unwrap_or(last))
        .collect()
}

/// Encode one outline (already cubic) as a CharString.
///
/// `hint_bytes` are pre-translated stem hints spliced between the width and
/// the first moveto.
pub fn build_charstring(
    outline: &Outline,
    width: Option<i32>,
    hint_bytes: Option<&[u8]>,
) -> Vec<u8> {
    let mut encoder = Encoder::new(width);
    if let Some(hints) = hint_bytes {
        encoder.raw(hints);
    }
    let mut cur = kurbo::Point::ZERO;
    let mut start = kurbo::Point::ZERO;
    for command in &outline.commands {
        match *command {
            PathCommand::MoveTo(p) => {
                encoder.move_to(p.x, p.y);
                cur = p;
                start = p;
            }
            PathCommand::LineTo(p) => {
                encoder.line_to(p.x, p.y);
                cur = p;
            }
            // Callers elevate beforehand, but a stray quadratic still
            // encodes exactly via degree elevation.
            PathCommand::QuadTo(q, p) => {
                let c1 = cur + (q - cur) * (2.0 / 3.0);
                let c2 = p + (q - p) * (2.0 / 3.0);
                encoder.curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                cur = p;
            }
            PathCommand::CurveTo(c1, c2, p) => {
                encoder.curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y);
                cur = p;
            }
            PathCommand::Close => {
                encoder.close();
                cur = start;
            }
        }
    }
    encoder.finish()
}

/// Family name from the `name` table, raw bytes; CFF strings are byte
/// strings, so anything outside Latin-1 degrades to `?`.
pub fn font_name(font: &FontRef) -> Vec<u8> {
    const FAMILY: u16 = 1;

    let Ok(name) = font.name() else {
        return FALLBACK_NAME.to_vec();
    };

    let mut fallback: Option<Vec<u8>> = None;
    for record in name.name_record() {
        if record.name_id().to_u16() != FAMILY {
            continue;
        }
        let Ok(value) = record.string(name.string_data()) else {
            continue;
        };
        let bytes: Vec<u8> = value
            .chars()
            .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
            .collect();
        if bytes.is_empty() {
            continue;
        }
        // Windows-English wins; remember any other language as a fallback.
        if record.platform_id() == 3 && record.language_id() == 0x409 {
            return bytes;
        }
        fallback.get_or_insert(bytes);
    }
    fallback.unwrap_or_else(|| FALLBACK_NAME.to_vec())
}

/// Assemble the final `CFF ` blob.
pub fn assemble(
    name: Vec<u8>,
    charstrings: Vec<Vec<u8>>,
    local_subrs: Vec<Vec<u8>>,
    widths: &Widths,
    font_bbox: [i32; 4],
) -> Result<Vec<u8>> {
    let font = table::Font {
        name,
        charstrings,
        local_subrs,
        default_width: widths.default_width,
        nominal_width: widths.nominal_width,
        font_bbox,
    };
    Ok(table::build(&font)?)
}

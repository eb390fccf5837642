//! Conversion orchestration.
//!
//! One [`Converter`] call takes a complete font binary and produces the
//! full table set of the converted font as a tag-to-bytes map. Supported
//! directions are a fixed match over (source, target); everything else is
//! an explicit unsupported-conversion error.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::Glyph as ReadGlyph,
    types::{GlyphId, Tag},
};
use write_fonts::FontBuilder;

use crosstype_subroutinizer as subroutinizer;

use crate::{
    collab::{HintTranslator, InstanceGenerator},
    error::{Error, Result},
    extract,
    options::Options,
    outline::{Bbox, Outline},
    source::{CFF, CFF2, FVAR, GLYF, HEAD, HHEA, LOCA, MAXP, SourceFormat, TableSource, TargetFormat},
    tables,
};

/// A converted font: table tag to raw table bytes, in insertion order.
pub type Tables = IndexMap<Tag, Vec<u8>>;

/// Tables whose contents only make sense next to `glyf` outlines.
const TRUETYPE_ONLY: &[Tag] = &[
    GLYF,
    LOCA,
    Tag::new(b"fpgm"),
    Tag::new(b"prep"),
    Tag::new(b"cvt "),
    Tag::new(b"gvar"),
    Tag::new(b"cvar"),
];

/// Tables whose contents only make sense next to CFF outlines.
const CFF_ONLY: &[Tag] = &[CFF, CFF2, Tag::new(b"VORG")];

/// Variation tables dropped when `preserve_variations` is off.
const VARIATION_TABLES: &[Tag] = &[
    FVAR,
    Tag::new(b"avar"),
    Tag::new(b"gvar"),
    Tag::new(b"cvar"),
    Tag::new(b"STAT"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
];

/// Converts fonts between outline formats.
#[derive(Default)]
pub struct Converter {
    options: Options,
    instancer: Option<Box<dyn InstanceGenerator>>,
    hint_translator: Option<Box<dyn HintTranslator>>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter").field("options", &self.options).finish_non_exhaustive()
    }
}

impl Converter {
    pub fn new(options: Options) -> Self {
        Self { options, instancer: None, hint_translator: None }
    }

    /// Install the collaborator that materializes variable-font instances.
    pub fn with_instance_generator(mut self, generator: Box<dyn InstanceGenerator>) -> Self {
        self.instancer = Some(generator);
        self
    }

    /// Install the collaborator that translates TrueType hints to CFF stems.
    pub fn with_hint_translator(mut self, translator: Box<dyn HintTranslator>) -> Self {
        self.hint_translator = Some(translator);
        self
    }

    /// Convert `font_data` to `target`, returning the complete table set.
    pub fn convert(&self, font_data: &[u8], target: TargetFormat) -> Result<Tables> {
        let instanced = self.maybe_instantiate(font_data)?;
        let data = instanced.as_deref().unwrap_or(font_data);
        let font = FontRef::new(data)?;

        let format = SourceFormat::detect(&font).ok_or(Error::UnknownFormat)?;
        self.check_required_tables(&font, format)?;

        match (format, target) {
            (SourceFormat::TrueType, TargetFormat::Otf) => self.ttf_to_otf(&font),
            (SourceFormat::OpenType, TargetFormat::Ttf) => self.otf_to_ttf(&font),
            (from, to) => {
                let valid = match from {
                    SourceFormat::TrueType => "otf",
                    SourceFormat::OpenType => "ttf",
                    SourceFormat::Cff2 => "(none)",
                };
                Err(Error::UnsupportedConversion { from, to, valid })
            }
        }
    }

    /// Convert and assemble the result into a complete font binary.
    pub fn convert_to_font(&self, font_data: &[u8], target: TargetFormat) -> Result<Vec<u8>> {
        let tables = self.convert(font_data, target)?;
        let mut builder = FontBuilder::new();
        for (tag, data) in &tables {
            builder.add_raw(*tag, data.clone());
        }
        Ok(builder.build())
    }

    fn maybe_instantiate(&self, font_data: &[u8]) -> Result<Option<Vec<u8>>> {
        if !self.options.generate_instance {
            return Ok(None);
        }
        let font = FontRef::new(font_data)?;
        if !TableSource::has_table(&font, FVAR) {
            warn!("instance generation requested but the font has no fvar table");
            return Ok(None);
        }
        let generator = self.instancer.as_ref().ok_or(Error::NoInstanceGenerator)?;
        let instanced = generator
            .instantiate(font_data, &self.options.instance_coordinates)
            .map_err(|e| Error::Instance(e.to_string()))?;
        Ok(Some(instanced))
    }

    fn check_required_tables(&self, font: &FontRef, format: SourceFormat) -> Result<()> {
        for &tag in [HEAD, HHEA, MAXP].iter().chain(format.required_tables()) {
            if !TableSource::has_table(font, tag) {
                return Err(Error::MissingTable(tag));
            }
        }
        Ok(())
    }

    fn ttf_to_otf(&self, font: &FontRef) -> Result<Tables> {
        let outlines = extract::ttf::extract_outlines(font)?;
        let cubic: Vec<Outline> = outlines.iter().map(Outline::to_cubic).collect();

        let advances = tables::cff::advances(font, cubic.len());
        let widths = tables::cff::compute_widths(&advances);
        let hints = self.translate_hints(font, cubic.len());

        let charstrings: Vec<Vec<u8>> = cubic
            .iter()
            .zip(&widths.per_glyph)
            .enumerate()
            .map(|(gid, (outline, width))| {
                let hint_bytes = hints.as_ref().and_then(|h| h[gid].as_deref());
                tables::cff::build_charstring(outline, *width, hint_bytes)
            })
            .collect();

        // Optimization is best-effort: a failed subroutinizer run falls
        // back to the unoptimized CharStrings.
        let (charstrings, local_subrs) = if self.options.optimize_cff {
            let subr_options = subroutinizer::Options {
                min_pattern_length: self.options.min_pattern_length,
                max_subroutines: self.options.max_subroutines,
                stack_aware: self.options.stack_aware,
            };
            match subroutinizer::subroutinize(&charstrings, &subr_options) {
                Ok(result) => (result.charstrings, result.subroutines),
                Err(e) => {
                    warn!("CFF optimization failed, using unoptimized charstrings: {e}");
                    (charstrings, Vec::new())
                }
            }
        } else {
            (charstrings, Vec::new())
        };

        let font_bbox = union_bbox(&outlines);
        let num_glyphs = charstrings.len() as u16;
        let cff = tables::cff::assemble(
            tables::cff::font_name(font),
            charstrings,
            local_subrs,
            &widths,
            [
                font_bbox.x_min as i32,
                font_bbox.y_min as i32,
                font_bbox.x_max as i32,
                font_bbox.y_max as i32,
            ],
        )?;

        let mut drop: HashSet<Tag> = TRUETYPE_ONLY.iter().copied().collect();
        if !self.options.preserve_variations {
            drop.extend(VARIATION_TABLES);
        }
        let mut out = copy_tables(font, &drop);

        let head = TableSource::table_data(font, HEAD).ok_or(Error::MissingTable(HEAD))?;
        // indexToLocFormat has no meaning without loca; zero it for
        // consistency.
        out.insert(HEAD, tables::head::update(head, None, 0)?);
        out.insert(MAXP, tables::maxp::cff(num_glyphs)?);
        out.insert(CFF, cff);
        Ok(out)
    }

    fn otf_to_ttf(&self, font: &FontRef) -> Result<Tables> {
        let outlines = extract::cff::extract_outlines(font)?;
        let declared = font.maxp()?.num_glyphs();
        if declared as usize != outlines.len() {
            warn!(
                "maxp declares {declared} glyphs but the CFF table holds {}",
                outlines.len()
            );
        }

        let built = tables::glyf::build(&outlines)?;
        let loca_format = match built.format {
            write_fonts::tables::loca::LocaFormat::Short => 0i16,
            write_fonts::tables::loca::LocaFormat::Long => 1i16,
        };

        let mut drop: HashSet<Tag> = CFF_ONLY.iter().copied().collect();
        if !self.options.preserve_variations {
            drop.extend(VARIATION_TABLES);
        }
        let mut out = copy_tables(font, &drop);

        let head = TableSource::table_data(font, HEAD).ok_or(Error::MissingTable(HEAD))?;
        out.insert(HEAD, tables::head::update(head, Some(built.bbox), loca_format)?);
        out.insert(
            MAXP,
            tables::maxp::truetype(outlines.len() as u16, built.max_points, built.max_contours)?,
        );
        out.insert(GLYF, built.glyf);
        out.insert(LOCA, built.loca);
        Ok(out)
    }

    /// Run the hint translator over every glyph's instructions. Failures
    /// are logged and drop that glyph's hints; they never fail the
    /// conversion.
    fn translate_hints(&self, font: &FontRef, num_glyphs: usize) -> Option<Vec<Option<Vec<u8>>>> {
        if !self.options.preserve_hints {
            return None;
        }
        let Some(translator) = self.hint_translator.as_ref() else {
            warn!("hint preservation requested but no hint translator is configured");
            return None;
        };

        let (Ok(loca), Ok(glyf)) = (font.loca(None), font.glyf()) else {
            return None;
        };
        let translated = (0..num_glyphs)
            .map(|gid| {
                let instructions = match loca.get_glyf(GlyphId::new(gid as u32), &glyf) {
                    Ok(Some(ReadGlyph::Simple(simple))) => simple.instructions().to_vec(),
                    _ => return None,
                };
                if instructions.is_empty() {
                    return None;
                }
                match translator.truetype_to_cff(gid as u16, &instructions) {
                    Ok(hints) if !hints.is_empty() => Some(hints),
                    Ok(_) => None,
                    Err(e) => {
                        debug!("glyph {gid}: hint translation failed: {e}");
                        None
                    }
                }
            })
            .collect();
        Some(translated)
    }
}

/// Convert with default collaborators (none); the common entry point.
pub fn convert(font_data: &[u8], target: TargetFormat, options: &Options) -> Result<Tables> {
    Converter::new(options.clone()).convert(font_data, target)
}

fn union_bbox(outlines: &[Outline]) -> Bbox {
    outlines
        .iter()
        .filter(|o| !o.is_empty())
        .map(|o| o.bbox)
        .reduce(Bbox::union)
        .unwrap_or(Bbox::ZERO)
}

fn copy_tables(font: &FontRef, drop: &HashSet<Tag>) -> Tables {
    let mut out = Tables::new();
    for tag in TableSource::tags(font) {
        if drop.contains(&tag) {
            debug!("dropping table {tag}");
            continue;
        }
        if let Some(data) = TableSource::table_data(font, tag) {
            out.insert(tag, data.to_vec());
        }
    }
    out
}

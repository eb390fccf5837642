//! Whole-table CFF assembly.
//!
//! The Top DICT declares the CharStrings INDEX offset and the Private DICT
//! (size, offset) pair, but its own encoded size depends on the magnitude of
//! those offsets, which in turn depend on the Top DICT's size. The builder
//! resolves the cycle with an explicit fixed-point loop: rebuild the Top
//! DICT with the latest offsets until the layout is byte-stable, with a hard
//! pass cap instead of a trusted pass count.

use crate::{
    dict::{self, op},
    error::{Error, Result},
    index,
    writer::Writer,
};

/// Fixed 4-byte CFF header: major 1, minor 0, hdrSize 4, offSize 4.
pub const HEADER: [u8; 4] = [1, 0, 4, 4];

const MAX_OFFSET_PASSES: usize = 8;

/// Everything needed to assemble one `CFF ` table.
#[derive(Debug, Clone)]
pub struct Font {
    /// PostScript-ish font name, raw bytes (CFF strings are not Unicode).
    pub name: Vec<u8>,
    /// One CharString per glyph, in glyph order.
    pub charstrings: Vec<Vec<u8>>,
    /// Local subroutines, already in final biased order. May be empty.
    pub local_subrs: Vec<Vec<u8>>,
    /// Advance width applied to glyphs whose CharString omits a width.
    pub default_width: i32,
    /// Base added to every encoded width delta.
    pub nominal_width: i32,
    /// Union of glyph bounding boxes: x_min, y_min, x_max, y_max.
    pub font_bbox: [i32; 4],
}

/// Assemble the complete `CFF ` table blob.
pub fn build(font: &Font) -> Result<Vec<u8>> {
    let name_index = index::build(&[&font.name]);
    let string_index = index::build::<&[u8]>(&[]);
    let gsubr_index = index::build::<&[u8]>(&[]);
    let charstrings_index = index::build(&font.charstrings);
    let private_dict = build_private_dict(font)?;

    let mut charstrings_offset = 0usize;
    let mut private_offset = 0usize;
    let mut converged = false;

    for _ in 0..MAX_OFFSET_PASSES {
        let top_dict = build_top_dict(font, charstrings_offset, private_dict.len(), private_offset);
        let top_dict_index_len = index::size_of(&[&top_dict]);

        let next_charstrings = HEADER.len()
            + name_index.len()
            + top_dict_index_len
            + string_index.len()
            + gsubr_index.len();
        let next_private = next_charstrings + charstrings_index.len();

        if next_charstrings == charstrings_offset && next_private == private_offset {
            converged = true;
            break;
        }
        charstrings_offset = next_charstrings;
        private_offset = next_private;
    }
    if !converged {
        return Err(Error::OffsetsDiverged(MAX_OFFSET_PASSES));
    }

    let top_dict = build_top_dict(font, charstrings_offset, private_dict.len(), private_offset);
    let top_dict_index = index::build(&[&top_dict]);

    let mut w = Writer::with_capacity(private_offset + private_dict.len());
    w.bytes(&HEADER);
    w.bytes(&name_index);
    w.bytes(&top_dict_index);
    w.bytes(&string_index);
    w.bytes(&gsubr_index);
    w.bytes(&charstrings_index);
    w.bytes(&private_dict);
    if !font.local_subrs.is_empty() {
        w.bytes(&index::build(&font.local_subrs));
    }
    Ok(w.finish())
}

fn build_top_dict(
    font: &Font,
    charstrings_offset: usize,
    private_size: usize,
    private_offset: usize,
) -> Vec<u8> {
    let mut w = Writer::new();
    dict::push_entry(&mut w, op::FONT_BBOX, &font.font_bbox);
    dict::push_entry(&mut w, op::CHARSTRINGS, &[charstrings_offset as i32]);
    dict::push_entry(&mut w, op::PRIVATE, &[private_size as i32, private_offset as i32]);
    w.finish()
}

/// The Subrs offset is relative to the Private DICT's own start and the
/// local subr INDEX sits right behind it, so the offset equals the DICT's
/// size. That size depends on the offset's encoding width: build with a
/// placeholder, remeasure, and settle.
fn build_private_dict(font: &Font) -> Result<Vec<u8>> {
    let encode = |subrs_offset: Option<usize>| {
        let mut w = Writer::new();
        dict::push_entry(&mut w, op::DEFAULT_WIDTH_X, &[font.default_width]);
        dict::push_entry(&mut w, op::NOMINAL_WIDTH_X, &[font.nominal_width]);
        if let Some(offset) = subrs_offset {
            dict::push_entry(&mut w, op::SUBRS, &[offset as i32]);
        }
        w.finish()
    };

    if font.local_subrs.is_empty() {
        return Ok(encode(None));
    }

    let mut offset = encode(Some(0)).len();
    for _ in 0..MAX_OFFSET_PASSES {
        let built = encode(Some(offset));
        if built.len() == offset {
            return Ok(built);
        }
        offset = built.len();
    }
    Err(Error::OffsetsDiverged(MAX_OFFSET_PASSES))
}

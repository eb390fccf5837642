//! maxp rebuilds for the two outline formats.
//!
//! CFF fonts carry version 0.5 (glyph count only); TrueType fonts carry
//! version 1.0 with point/contour maxima. write-fonts picks the version
//! from which optional fields are set.

use write_fonts::{dump_table, tables::maxp::Maxp};

use crate::error::Result;

/// Version 0.5 maxp (0x00005000) for a CFF-outline font.
pub fn cff(num_glyphs: u16) -> Result<Vec<u8>> {
    let maxp = Maxp {
        num_glyphs,
        max_points: None,
        max_contours: None,
        max_composite_points: None,
        max_composite_contours: None,
        max_zones: None,
        max_twilight_points: None,
        max_storage: None,
        max_function_defs: None,
        max_instruction_defs: None,
        max_stack_elements: None,
        max_size_of_instructions: None,
        max_component_elements: None,
        max_component_depth: None,
    };
    Ok(dump_table(&maxp)?)
}

/// Version 1.0 maxp (0x00010000) for a TrueType-outline font. Converted
/// glyphs are all simple, so the composite maxima are zero.
pub fn truetype(num_glyphs: u16, max_points: u16, max_contours: u16) -> Result<Vec<u8>> {
    let maxp = Maxp {
        num_glyphs,
        max_points: Some(max_points),
        max_contours: Some(max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };
    Ok(dump_table(&maxp)?)
}

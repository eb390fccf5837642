//! Collaborator traits the converter calls out to but does not implement.
//!
//! Both are optional: a converter without an instance generator simply
//! refuses `generate_instance`, and hint translation failures are logged
//! and skipped rather than aborting the conversion.

use read_fonts::types::Tag;

/// Anything a collaborator can fail with; the converter only reports it.
pub type CollabError = Box<dyn std::error::Error + Send + Sync>;

/// Materializes a static instance of a variable font before conversion.
pub trait InstanceGenerator: Send + Sync {
    /// Pin the axes in `location` (user-space values) and return the
    /// resulting static font binary.
    fn instantiate(&self, font_data: &[u8], location: &[(Tag, f32)]) -> Result<Vec<u8>, CollabError>;
}

/// Translates TrueType hinting into CFF stem hints.
pub trait HintTranslator: Send + Sync {
    /// Derive hint operators (`hstem`/`vstem`/`hintmask` bytes) for one
    /// glyph from its TrueType instructions. The returned bytes are spliced
    /// into the glyph's CharString between the width and the first moveto.
    fn truetype_to_cff(&self, glyph_id: u16, instructions: &[u8]) -> Result<Vec<u8>, CollabError>;
}

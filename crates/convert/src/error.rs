use std::result;

use read_fonts::{ReadError, types::Tag};
use write_fonts::{BuilderError, error as write_error};

use crate::source::{SourceFormat, TargetFormat};

/// Error types for outline conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to serialize table: {0}")]
    Serialize(#[from] write_error::Error),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("CFF error: {0}")]
    Cff(#[from] crosstype_cff::Error),

    #[error("required table '{0}' not found")]
    MissingTable(Tag),

    #[error("no outline tables found (neither glyf nor CFF/CFF2)")]
    UnknownFormat,

    #[error("cannot convert {from} to {to}; valid targets for {from}: {valid}")]
    UnsupportedConversion { from: SourceFormat, to: TargetFormat, valid: &'static str },

    #[error("glyph {0}: component nesting too deep (cyclic reference?)")]
    ComponentDepth(u16),

    #[error("glyph {glyph}: cannot serialize outline: {reason}")]
    GlyphPath { glyph: u16, reason: String },

    #[error("glyph {0}: unable to approximate cubic curves with quadratics")]
    QuadConversion(u16),

    #[error("head table is truncated")]
    MalformedHead,

    #[error("instance generation requested but no instance generator is configured")]
    NoInstanceGenerator,

    #[error("instance generation failed: {0}")]
    Instance(String),
}

pub type Result<T> = result::Result<T, Error>;

use std::result;

/// Error types for the subroutinizer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("glyph {glyph}: unscannable charstring byte {value:#04x} at offset {offset}")]
    InvalidCharstring { glyph: usize, offset: usize, value: u8 },

    #[error("glyph {glyph}: charstring truncated at offset {offset}")]
    TruncatedCharstring { glyph: usize, offset: usize },
}

pub type Result<T> = result::Result<T, Error>;

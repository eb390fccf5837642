use std::result;

use crate::interp::MAX_CALL_DEPTH;

/// Error types for CFF parsing, interpretation and assembly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected end of CFF data at byte {0}")]
    UnexpectedEof(usize),

    #[error("reserved charstring operator {op} at byte {offset}")]
    ReservedOperator { op: u8, offset: usize },

    #[error("charstring stack underflow at byte {0}")]
    StackUnderflow(usize),

    #[error("charstring stack overflow at byte {0}")]
    StackOverflow(usize),

    #[error("subroutine nesting deeper than {MAX_CALL_DEPTH}")]
    NestingLimit,

    #[error("subroutine index {0} out of range")]
    InvalidSubroutineIndex(i32),

    #[error("charstring ended without endchar")]
    MissingEndchar,

    #[error("unexpected data after endchar")]
    DataAfterEndchar,

    #[error("seac accent composition is not supported")]
    SeacUnsupported,

    #[error("CID-keyed CFF fonts are not supported")]
    CidKeyed,

    #[error("unsupported CharstringType {0}")]
    UnsupportedCharstringType(i32),

    #[error("invalid INDEX offset size {0}")]
    InvalidOffsetSize(u8),

    #[error("INDEX offsets are not monotonically non-decreasing")]
    NonMonotonicOffsets,

    #[error("missing {0} entry in Top DICT")]
    MissingDictEntry(&'static str),

    #[error("DICT operand is not an integer")]
    NonIntegerOperand,

    #[error("CFF offsets failed to converge after {0} passes")]
    OffsetsDiverged(usize),
}

pub type Result<T> = result::Result<T, Error>;

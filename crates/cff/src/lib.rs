//! # crosstype-cff
//!
//! CFF binary primitives shared by the conversion pipeline and the
//! subroutinizer: INDEX and DICT codecs, the Type 2 CharString number
//! encoding, a CharString interpreter and encoder, the subroutine bias
//! rule, a minimal container parser, and a whole-`CFF ` table assembler
//! with explicit offset fixed-point resolution.
//!
//! The ecosystem's write-path crates stop short of CFF, so this crate owns
//! the byte-level layout; the layouts match the Adobe CFF and Type 2
//! specifications bit for bit (header, INDEX framing, DICT operand widths,
//! biased subroutine addressing).

pub mod charstring;
pub mod dict;
mod error;
pub mod encoder;
pub mod index;
pub mod interp;
pub mod parse;
pub mod table;
pub mod writer;

pub use charstring::bias;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use interp::PathSink;

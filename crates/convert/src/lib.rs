//! # crosstype-convert
//!
//! Convert SFNT fonts between TrueType (`glyf`/`loca`) and OpenType
//! (`CFF `) outline formats.
//!
//! The pipeline extracts every glyph into a format-neutral [`Outline`],
//! converts curve geometry (exact quadratic-to-cubic elevation going to
//! CFF, bounded-error cubic-to-quadratic reduction going to TrueType),
//! rebuilds the outline tables from scratch, refreshes `head`/`maxp`, and
//! copies every other table through. CFF output can optionally be shrunk by the
//! subroutinizer.
//!
//! ## Example
//!
//! ```no_run
//! use crosstype_convert::{Converter, Options, TargetFormat};
//!
//! let ttf = std::fs::read("font.ttf").unwrap();
//! let converter = Converter::new(Options::new().optimize_cff(true));
//! let otf = converter.convert_to_font(&ttf, TargetFormat::Otf).unwrap();
//! std::fs::write("font.otf", otf).unwrap();
//! ```

pub mod collab;
mod convert;
mod error;
pub mod extract;
mod options;
pub mod outline;
pub mod source;
pub mod tables;

pub use collab::{HintTranslator, InstanceGenerator};
pub use convert::{Converter, Tables, convert};
pub use error::{Error, Result};
pub use options::Options;
pub use outline::{Bbox, Outline, PathCommand};
pub use source::{SourceFormat, TableSource, TargetFormat};

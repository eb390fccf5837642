//! Source-font abstraction and format detection.
//!
//! The converter only needs three questions answered about a source font:
//! does a table exist, what are its bytes, and which tags are present. The
//! [`TableSource`] trait captures exactly that, with [`FontRef`] as the
//! production implementation; tests can supply synthetic sources.

use std::fmt::{self, Display, Formatter};

use read_fonts::{FontRef, types::Tag};

pub const GLYF: Tag = Tag::new(b"glyf");
pub const LOCA: Tag = Tag::new(b"loca");
pub const CFF: Tag = Tag::new(b"CFF ");
pub const CFF2: Tag = Tag::new(b"CFF2");
pub const HEAD: Tag = Tag::new(b"head");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const FVAR: Tag = Tag::new(b"fvar");

/// Minimal read access to a font's tables.
pub trait TableSource {
    fn has_table(&self, tag: Tag) -> bool;
    fn table_data(&self, tag: Tag) -> Option<&[u8]>;
    /// Table tags in directory order.
    fn tags(&self) -> Vec<Tag>;
}

impl TableSource for FontRef<'_> {
    fn has_table(&self, tag: Tag) -> bool {
        self.table_data(tag).is_some()
    }

    fn table_data(&self, tag: Tag) -> Option<&[u8]> {
        FontRef::table_data(self, tag).map(|data| data.as_bytes())
    }

    fn tags(&self) -> Vec<Tag> {
        self.table_directory
            .table_records()
            .iter()
            .map(|record| record.tag())
            .collect()
    }
}

/// Outline format of a source font, detected by table presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `glyf`/`loca` quadratic outlines.
    TrueType,
    /// `CFF ` cubic outlines.
    OpenType,
    /// `CFF2` variable cubic outlines.
    Cff2,
}

impl SourceFormat {
    /// Detection precedence: `CFF2`, then `CFF `, then `glyf`.
    pub fn detect(source: &impl TableSource) -> Option<SourceFormat> {
        if source.has_table(CFF2) {
            Some(SourceFormat::Cff2)
        } else if source.has_table(CFF) {
            Some(SourceFormat::OpenType)
        } else if source.has_table(GLYF) {
            Some(SourceFormat::TrueType)
        } else {
            None
        }
    }

    /// Tables a conversion source must expose, beyond `head`/`hhea`/`maxp`.
    pub fn required_tables(self) -> &'static [Tag] {
        match self {
            SourceFormat::TrueType => &[LOCA, GLYF],
            SourceFormat::OpenType => &[CFF],
            SourceFormat::Cff2 => &[CFF2],
        }
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::TrueType => write!(f, "ttf"),
            SourceFormat::OpenType => write!(f, "otf"),
            SourceFormat::Cff2 => write!(f, "cff2"),
        }
    }
}

/// Conversion target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    /// TrueType outlines (`glyf`/`loca`).
    Ttf,
    /// OpenType CFF outlines (`CFF `).
    Otf,
}

impl Display for TargetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TargetFormat::Ttf => write!(f, "ttf"),
            TargetFormat::Otf => write!(f, "otf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct FakeSource(BTreeMap<Tag, Vec<u8>>);

    impl FakeSource {
        fn with(tags: &[Tag]) -> Self {
            Self(tags.iter().map(|t| (*t, Vec::new())).collect())
        }
    }

    impl TableSource for FakeSource {
        fn has_table(&self, tag: Tag) -> bool {
            self.0.contains_key(&tag)
        }
        fn table_data(&self, tag: Tag) -> Option<&[u8]> {
            self.0.get(&tag).map(Vec::as_slice)
        }
        fn tags(&self) -> Vec<Tag> {
            self.0.keys().copied().collect()
        }
    }

    #[test]
    fn detection_precedence() {
        assert_eq!(
            SourceFormat::detect(&FakeSource::with(&[GLYF, CFF, CFF2])),
            Some(SourceFormat::Cff2)
        );
        assert_eq!(
            SourceFormat::detect(&FakeSource::with(&[GLYF, CFF])),
            Some(SourceFormat::OpenType)
        );
        assert_eq!(
            SourceFormat::detect(&FakeSource::with(&[GLYF])),
            Some(SourceFormat::TrueType)
        );
        assert_eq!(SourceFormat::detect(&FakeSource::with(&[HEAD])), None);
    }
}

//! head table updates, done as raw byte patches.
//!
//! The fields the conversion touches sit at fixed offsets in the 54-byte
//! table: the font bbox at 36..44, indexToLocFormat at 50. The checksum
//! adjustment at 8 is zeroed; whoever assembles the final binary recomputes
//! it.

use crate::{
    error::{Error, Result},
    outline::Bbox,
};

const HEAD_LEN: usize = 54;
const CHECKSUM_ADJUSTMENT: usize = 8;
const BBOX: usize = 36;
const INDEX_TO_LOC_FORMAT: usize = 50;

/// Copy `head`, zero the checksum adjustment, refresh the bbox (when the
/// conversion recomputed one) and set indexToLocFormat.
pub fn update(head: &[u8], bbox: Option<Bbox>, loca_format: i16) -> Result<Vec<u8>> {
    if head.len() < HEAD_LEN {
        return Err(Error::MalformedHead);
    }
    let mut out = head.to_vec();
    out[CHECKSUM_ADJUSTMENT..CHECKSUM_ADJUSTMENT + 4].fill(0);
    if let Some(bbox) = bbox {
        for (i, value) in [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max].into_iter().enumerate() {
            out[BBOX + i * 2..BBOX + i * 2 + 2].copy_from_slice(&value.to_be_bytes());
        }
    }
    out[INDEX_TO_LOC_FORMAT..INDEX_TO_LOC_FORMAT + 2]
        .copy_from_slice(&loca_format.to_be_bytes());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patches_loc_format_at_offset_50() {
        let head = vec![0xAAu8; HEAD_LEN];
        let out = update(&head, None, 1).unwrap();
        assert_eq!(&out[50..52], &[0, 1]);
        assert_eq!(&out[8..12], &[0, 0, 0, 0]);
        // Bytes outside the patched fields survive.
        assert_eq!(out[49], 0xAA);
        assert_eq!(out[52], 0xAA);
    }

    #[test]
    fn patches_bbox() {
        let head = vec![0u8; HEAD_LEN];
        let bbox = Bbox { x_min: -10, y_min: -20, x_max: 700, y_max: 800 };
        let out = update(&head, Some(bbox), 0).unwrap();
        assert_eq!(&out[36..38], &(-10i16).to_be_bytes());
        assert_eq!(&out[42..44], &800i16.to_be_bytes());
    }

    #[test]
    fn truncated_head_is_an_error() {
        assert!(matches!(update(&[0u8; 40], None, 0), Err(Error::MalformedHead)));
    }
}

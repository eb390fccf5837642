//! CFF INDEX: a length-prefixed array of byte blobs.
//!
//! Layout: count (u16), offSize (u8, 1..=4), count+1 offsets of offSize bytes
//! each (1-based, monotonically non-decreasing, first always 1), then the
//! concatenated entry data. An empty INDEX is just the two count bytes.

use crate::{
    error::{Error, Result},
    writer::{Writer, offset_size},
};

/// Serialize `entries` as a CFF INDEX.
pub fn build<T: AsRef<[u8]>>(entries: &[T]) -> Vec<u8> {
    if entries.is_empty() {
        return vec![0, 0];
    }

    let data_len: usize = entries.iter().map(|e| e.as_ref().len()).sum();
    let off_size = offset_size(data_len + 1);

    let mut w = Writer::with_capacity(3 + (entries.len() + 1) * off_size as usize + data_len);
    w.u16(entries.len() as u16);
    w.u8(off_size);

    let mut offset = 1u32;
    w.uint(offset, off_size);
    for entry in entries {
        offset += entry.as_ref().len() as u32;
        w.uint(offset, off_size);
    }
    for entry in entries {
        w.bytes(entry.as_ref());
    }
    w.finish()
}

/// Size in bytes [`build`] would produce, without building.
pub fn size_of<T: AsRef<[u8]>>(entries: &[T]) -> usize {
    if entries.is_empty() {
        return 2;
    }
    let data_len: usize = entries.iter().map(|e| e.as_ref().len()).sum();
    let off_size = offset_size(data_len + 1) as usize;
    3 + (entries.len() + 1) * off_size + data_len
}

/// A parsed INDEX: borrowed entry slices plus the total encoded length.
#[derive(Debug, Clone)]
pub struct Index<'a> {
    pub entries: Vec<&'a [u8]>,
    /// Bytes the INDEX occupies in the source, including framing.
    pub encoded_len: usize,
}

impl<'a> Index<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&'a [u8]> {
        self.entries.get(i).copied()
    }
}

/// Parse the INDEX starting at `pos` inside `data`.
pub fn parse(data: &[u8], pos: usize) -> Result<Index<'_>> {
    let count_bytes = data.get(pos..pos + 2).ok_or(Error::UnexpectedEof(pos))?;
    let count = u16::from_be_bytes([count_bytes[0], count_bytes[1]]) as usize;
    if count == 0 {
        return Ok(Index { entries: Vec::new(), encoded_len: 2 });
    }

    let off_size = *data.get(pos + 2).ok_or(Error::UnexpectedEof(pos + 2))?;
    if !(1..=4).contains(&off_size) {
        return Err(Error::InvalidOffsetSize(off_size));
    }

    let offsets_start = pos + 3;
    let data_start = offsets_start + (count + 1) * off_size as usize;

    let mut offsets = Vec::with_capacity(count + 1);
    for i in 0..=count {
        let at = offsets_start + i * off_size as usize;
        let raw = data
            .get(at..at + off_size as usize)
            .ok_or(Error::UnexpectedEof(at))?;
        let mut v = 0u32;
        for b in raw {
            v = (v << 8) | *b as u32;
        }
        offsets.push(v);
    }

    if offsets[0] != 1 || offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(Error::NonMonotonicOffsets);
    }

    let mut entries = Vec::with_capacity(count);
    for pair in offsets.windows(2) {
        // Offsets are 1-based from the byte preceding the data block.
        let start = data_start + pair[0] as usize - 1;
        let end = data_start + pair[1] as usize - 1;
        entries.push(data.get(start..end).ok_or(Error::UnexpectedEof(start))?);
    }

    let encoded_len = data_start + offsets[count] as usize - 1 - pos;
    Ok(Index { entries, encoded_len })
}

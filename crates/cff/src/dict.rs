//! CFF DICT encoding: operand/operator byte pairs keyed by operator.
//!
//! Operators occupy 0..=21 with 12 as a two-byte escape; escaped operators
//! are keyed here as `0x0C00 | op2`. Integer operands use the shortest of the
//! 1/2/3/5-byte forms. Real operands (30, packed BCD) are parsed and skipped
//! but never written; nothing this toolkit emits needs them.

use crate::{
    error::{Error, Result},
    writer::Writer,
};

pub mod op {
    // Top DICT
    pub const FONT_BBOX: u16 = 5;
    pub const CHARSTRINGS: u16 = 17;
    pub const PRIVATE: u16 = 18;
    pub const CHARSTRING_TYPE: u16 = 0x0C06;
    pub const ROS: u16 = 0x0C1E;
    pub const FD_ARRAY: u16 = 0x0C24;
    pub const FD_SELECT: u16 = 0x0C25;

    // Private DICT
    pub const SUBRS: u16 = 19;
    pub const DEFAULT_WIDTH_X: u16 = 20;
    pub const NOMINAL_WIDTH_X: u16 = 21;
}

/// Append the shortest DICT integer encoding of `v`.
pub fn push_int(w: &mut Writer, v: i32) {
    match v {
        -107..=107 => w.u8((v + 139) as u8),
        108..=1131 => {
            let v = v - 108;
            w.u8((v >> 8) as u8 + 247);
            w.u8((v & 0xFF) as u8);
        }
        -1131..=-108 => {
            let v = -v - 108;
            w.u8((v >> 8) as u8 + 251);
            w.u8((v & 0xFF) as u8);
        }
        -32768..=32767 => {
            w.u8(28);
            w.bytes(&(v as i16).to_be_bytes());
        }
        _ => {
            w.u8(29);
            w.bytes(&v.to_be_bytes());
        }
    }
}

/// Append an operator key (one byte, or escape + one byte).
pub fn push_op(w: &mut Writer, operator: u16) {
    if operator > 0xFF {
        w.u8(12);
        w.u8((operator & 0xFF) as u8);
    } else {
        w.u8(operator as u8);
    }
}

/// One `operands... operator` entry.
pub fn push_entry(w: &mut Writer, operator: u16, operands: &[i32]) {
    for v in operands {
        push_int(w, *v);
    }
    push_op(w, operator);
}

/// A parsed DICT entry: operator key and numeric operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub operator: u16,
    pub operands: Vec<f64>,
}

impl Entry {
    pub fn int(&self, i: usize) -> Result<i32> {
        let v = *self.operands.get(i).ok_or(Error::NonIntegerOperand)?;
        if v.fract() != 0.0 {
            return Err(Error::NonIntegerOperand);
        }
        Ok(v as i32)
    }
}

/// Parse a complete DICT blob into its entries, in encounter order.
pub fn parse(data: &[u8]) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut operands: Vec<f64> = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let b0 = data[pos];
        match b0 {
            0..=11 | 13..=21 => {
                entries.push(Entry { operator: b0 as u16, operands: std::mem::take(&mut operands) });
                pos += 1;
            }
            12 => {
                let b1 = *data.get(pos + 1).ok_or(Error::UnexpectedEof(pos + 1))?;
                entries.push(Entry {
                    operator: 0x0C00 | b1 as u16,
                    operands: std::mem::take(&mut operands),
                });
                pos += 2;
            }
            28 => {
                let raw = data.get(pos + 1..pos + 3).ok_or(Error::UnexpectedEof(pos + 1))?;
                operands.push(i16::from_be_bytes([raw[0], raw[1]]) as f64);
                pos += 3;
            }
            29 => {
                let raw = data.get(pos + 1..pos + 5).ok_or(Error::UnexpectedEof(pos + 1))?;
                operands.push(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as f64);
                pos += 5;
            }
            30 => {
                let (value, consumed) = parse_real(&data[pos + 1..], pos + 1)?;
                operands.push(value);
                pos += 1 + consumed;
            }
            32..=246 => {
                operands.push(b0 as f64 - 139.0);
                pos += 1;
            }
            247..=250 => {
                let b1 = *data.get(pos + 1).ok_or(Error::UnexpectedEof(pos + 1))?;
                operands.push((b0 as f64 - 247.0) * 256.0 + b1 as f64 + 108.0);
                pos += 2;
            }
            251..=254 => {
                let b1 = *data.get(pos + 1).ok_or(Error::UnexpectedEof(pos + 1))?;
                operands.push(-(b0 as f64 - 251.0) * 256.0 - b1 as f64 - 108.0);
                pos += 2;
            }
            _ => return Err(Error::ReservedOperator { op: b0, offset: pos }),
        }
    }

    Ok(entries)
}

/// Find the first entry for `operator`.
pub fn find(entries: &[Entry], operator: u16) -> Option<&Entry> {
    entries.iter().find(|e| e.operator == operator)
}

/// Packed-BCD real number. Returns (value, bytes consumed).
fn parse_real(data: &[u8], at: usize) -> Result<(f64, usize)> {
    let mut text = String::new();
    for (i, byte) in data.iter().enumerate() {
        for nibble in [byte >> 4, byte & 0xF] {
            match nibble {
                0..=9 => text.push((b'0' + nibble) as char),
                0xA => text.push('.'),
                0xB => text.push('E'),
                0xC => text.push_str("E-"),
                0xE => text.push('-'),
                0xF => {
                    let value = text.parse().map_err(|_| Error::NonIntegerOperand)?;
                    return Ok((value, i + 1));
                }
                _ => return Err(Error::NonIntegerOperand),
            }
        }
    }
    Err(Error::UnexpectedEof(at + data.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(operator: u16, operands: &[i32]) -> Vec<u8> {
        let mut w = Writer::new();
        push_entry(&mut w, operator, operands);
        w.finish()
    }

    #[test]
    fn int_widths() {
        assert_eq!(encode(17, &[0]), vec![139, 17]);
        assert_eq!(encode(17, &[107]), vec![246, 17]);
        assert_eq!(encode(17, &[108]), vec![247, 0, 17]);
        assert_eq!(encode(17, &[-108]), vec![251, 0, 17]);
        assert_eq!(encode(17, &[1131]), vec![250, 255, 17]);
        assert_eq!(encode(17, &[5000]), vec![28, 0x13, 0x88, 17]);
        assert_eq!(encode(17, &[70000]), vec![29, 0, 1, 0x11, 0x70, 17]);
    }

    #[test]
    fn escaped_operator_round_trips() {
        let bytes = encode(op::CHARSTRING_TYPE, &[2]);
        assert_eq!(bytes, vec![141, 12, 6]);
        let parsed = parse(&bytes).unwrap();
        assert_eq!(parsed[0].operator, op::CHARSTRING_TYPE);
        assert_eq!(parsed[0].int(0).unwrap(), 2);
    }

    #[test]
    fn parse_recovers_values() {
        let mut w = Writer::new();
        push_entry(&mut w, op::PRIVATE, &[45, 12345]);
        push_entry(&mut w, op::CHARSTRINGS, &[-1131]);
        let entries = parse(&w.finish()).unwrap();
        assert_eq!(entries[0].int(0).unwrap(), 45);
        assert_eq!(entries[0].int(1).unwrap(), 12345);
        assert_eq!(entries[1].int(0).unwrap(), -1131);
    }

    #[test]
    fn parse_real_number() {
        // -2.25 encoded as 0xE2 0xA2 0x5F
        let entries = parse(&[30, 0xE2, 0xA2, 0x5F, 5]).unwrap();
        assert_eq!(entries[0].operands[0], -2.25);
        assert_eq!(entries[0].operator, 5);
    }
}

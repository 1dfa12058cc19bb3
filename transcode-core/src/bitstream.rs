//! Byte-stream framing helpers shared by the NAL-based codecs.
//!
//! Encoders emit Annex B streams (units separated by `00 00 01` or
//! `00 00 00 01` start codes); MP4/MOV samples carry the same units with a
//! big-endian length prefix instead.

use crate::error::{BitstreamError, Result};

/// Find the next start code in a byte slice.
///
/// Returns the offset of the start code and its length (3 or 4 bytes).
pub fn find_start_code(data: &[u8]) -> Option<(usize, usize)> {
    let len = data.len();
    if len < 3 {
        return None;
    }

    for i in 0..len - 2 {
        if data[i] == 0 && data[i + 1] == 0 {
            if data[i + 2] == 1 {
                return Some((i, 3));
            } else if i + 3 < len && data[i + 2] == 0 && data[i + 3] == 1 {
                return Some((i, 4));
            }
        }
    }

    None
}

/// Iterator over the units of an Annex B byte stream, start codes removed.
///
/// Bytes before the first start code are ignored, as are empty units and
/// trailing zero padding.
pub struct AnnexBUnits<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> AnnexBUnits<'a> {
    /// Iterate the units of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        let pos = find_start_code(data)
            .map(|(offset, len)| offset + len)
            .unwrap_or(data.len());
        Self { data, pos }
    }
}

impl<'a> Iterator for AnnexBUnits<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            let rest = &self.data[self.pos..];
            let (unit, advance) = match find_start_code(rest) {
                Some((offset, len)) => (&rest[..offset], offset + len),
                None => (rest, rest.len()),
            };
            self.pos += advance;

            let end = unit.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            if end > 0 {
                return Some(&unit[..end]);
            }
        }
        None
    }
}

/// Append `unit` to `out` behind a big-endian length prefix of `length_size` bytes.
pub fn write_length_prefixed(out: &mut Vec<u8>, unit: &[u8], length_size: u8) -> Result<()> {
    let max = match length_size {
        1 => u8::MAX as usize,
        2 => u16::MAX as usize,
        4 => u32::MAX as usize,
        _ => {
            return Err(BitstreamError::Other(format!(
                "invalid length prefix size: {length_size}"
            ))
            .into())
        }
    };
    if unit.len() > max {
        return Err(BitstreamError::UnitTooLarge {
            size: unit.len(),
            length_size,
        }
        .into());
    }

    let len = (unit.len() as u32).to_be_bytes();
    out.extend_from_slice(&len[4 - length_size as usize..]);
    out.extend_from_slice(unit);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_start_code() {
        assert_eq!(find_start_code(&[0, 0, 1, 0x67]), Some((0, 3)));
        assert_eq!(find_start_code(&[0xFF, 0, 0, 0, 1]), Some((1, 4)));
        assert_eq!(find_start_code(&[0, 0, 2]), None);
        assert_eq!(find_start_code(&[0, 0]), None);
    }

    #[test]
    fn test_annex_b_units() {
        let data = [
            0x00, 0x00, 0x00, 0x01, 0x67, 0x42, // SPS
            0x00, 0x00, 0x01, 0x68, 0xCE, // PPS
            0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x00, // IDR + trailing zero
        ];
        let units: Vec<_> = AnnexBUnits::new(&data).collect();
        assert_eq!(units, vec![&[0x67, 0x42][..], &[0x68, 0xCE], &[0x65, 0x88]]);
    }

    #[test]
    fn test_annex_b_units_without_start_code() {
        let data = [0x65, 0x88, 0x84];
        assert_eq!(AnnexBUnits::new(&data).count(), 0);
        assert_eq!(AnnexBUnits::new(&[]).count(), 0);
    }

    #[test]
    fn test_write_length_prefixed() {
        let mut out = Vec::new();
        write_length_prefixed(&mut out, &[0x65, 0x88, 0x84], 4).unwrap();
        assert_eq!(out, vec![0, 0, 0, 3, 0x65, 0x88, 0x84]);

        let mut short = Vec::new();
        write_length_prefixed(&mut short, &[0xAA], 2).unwrap();
        assert_eq!(short, vec![0, 1, 0xAA]);
    }

    #[test]
    fn test_write_length_prefixed_rejects_bad_sizes() {
        let mut out = Vec::new();
        assert!(write_length_prefixed(&mut out, &[1], 3).is_err());
        assert!(write_length_prefixed(&mut out, &[0u8; 300], 1).is_err());
    }
}

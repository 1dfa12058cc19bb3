//! H.264 NAL unit classification.

/// The NAL unit types the sample rewrite distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NalUnitType {
    /// Coded slice, IDR or not (types 1 to 5).
    Slice { idr: bool },
    /// Sequence parameter set (type 7).
    Sps,
    /// Picture parameter set (type 8).
    Pps,
    /// Anything else, carried through untouched.
    Other(u8),
}

impl NalUnitType {
    /// Create from the 5-bit `nal_unit_type` value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1..=4 => Self::Slice { idr: false },
            5 => Self::Slice { idr: true },
            7 => Self::Sps,
            8 => Self::Pps,
            n => Self::Other(n),
        }
    }

    /// Read the type from the first byte of a NAL unit.
    pub fn from_header(unit: &[u8]) -> Option<Self> {
        unit.first().map(|header| Self::from_u8(header & 0x1F))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nal_unit_type() {
        assert_eq!(NalUnitType::from_u8(7), NalUnitType::Sps);
        assert_eq!(NalUnitType::from_u8(8), NalUnitType::Pps);
        assert_eq!(NalUnitType::from_u8(5), NalUnitType::Slice { idr: true });
        assert_eq!(NalUnitType::from_u8(1), NalUnitType::Slice { idr: false });
        assert_eq!(NalUnitType::from_u8(9), NalUnitType::Other(9));
        assert_eq!(NalUnitType::from_u8(6), NalUnitType::Other(6));
    }

    #[test]
    fn test_from_header_masks_ref_idc() {
        // nal_ref_idc=3, nal_unit_type=7
        assert_eq!(NalUnitType::from_header(&[0x67, 0x42]), Some(NalUnitType::Sps));
        assert_eq!(NalUnitType::from_header(&[0x08]), Some(NalUnitType::Pps));
        assert_eq!(NalUnitType::from_header(&[]), None);
    }
}

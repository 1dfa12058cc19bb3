//! H.265/HEVC bitstream handling.

use super::h264::validate_length_size;
use crate::params::{annex_b_units, BitstreamSyntax};
use transcode_core::bitstream::write_length_prefixed;
use transcode_core::{ParameterSetKind, Result};

const VPS_NUT: u8 = 32;
const SPS_NUT: u8 = 33;
const PPS_NUT: u8 = 34;

/// NAL unit type from the two-byte HEVC NAL header.
pub fn nal_unit_type(unit: &[u8]) -> Option<u8> {
    // forbidden_zero_bit(1) nal_unit_type(6) nuh_layer_id(6) temporal_id(3)
    unit.first().map(|header| (header >> 1) & 0x3F)
}

/// Annex B in, length-prefixed out; VPS, SPS and PPS are parameter sets.
#[derive(Debug, Clone, Copy)]
pub struct HevcSyntax {
    length_size: u8,
}

impl Default for HevcSyntax {
    fn default() -> Self {
        Self {
            length_size: super::h264::DEFAULT_NAL_LENGTH_SIZE,
        }
    }
}

impl HevcSyntax {
    /// Create a syntax writing `length_size`-byte NAL length prefixes.
    pub fn new(length_size: u8) -> Result<Self> {
        Ok(Self {
            length_size: validate_length_size(length_size)?,
        })
    }

    /// NAL length prefix size.
    pub fn length_size(&self) -> u8 {
        self.length_size
    }
}

impl BitstreamSyntax for HevcSyntax {
    fn name(&self) -> &'static str {
        "hevc"
    }

    fn expected_kinds(&self) -> &'static [ParameterSetKind] {
        &ParameterSetKind::ALL
    }

    fn units<'a>(&self, payload: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        annex_b_units(payload)
    }

    fn parameter_set_kind(&self, unit: &[u8]) -> Option<ParameterSetKind> {
        match nal_unit_type(unit)? {
            VPS_NUT => Some(ParameterSetKind::Video),
            SPS_NUT => Some(ParameterSetKind::Sequence),
            PPS_NUT => Some(ParameterSetKind::Picture),
            _ => None,
        }
    }

    fn write_unit(&self, out: &mut Vec<u8>, unit: &[u8]) -> Result<()> {
        write_length_prefixed(out, unit, self.length_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSetRegistry;

    #[test]
    fn test_nal_unit_type() {
        assert_eq!(nal_unit_type(&[0x40, 0x01]), Some(VPS_NUT));
        assert_eq!(nal_unit_type(&[0x42, 0x01]), Some(SPS_NUT));
        assert_eq!(nal_unit_type(&[0x44, 0x01]), Some(PPS_NUT));
        // IDR_W_RADL
        assert_eq!(nal_unit_type(&[0x26, 0x01]), Some(19));
    }

    #[test]
    fn test_strips_vps_sps_pps() {
        let mut payload = Vec::new();
        for unit in [
            &[0x40u8, 0x01, 0x0C][..],
            &[0x42, 0x01, 0x01],
            &[0x44, 0x01, 0xC1],
            &[0x26, 0x01, 0xAF, 0x09],
        ] {
            payload.extend_from_slice(&[0, 0, 0, 1]);
            payload.extend_from_slice(unit);
        }

        let mut registry = ParameterSetRegistry::new(Box::new(HevcSyntax::default()));
        let out = registry.observe(&payload).unwrap();

        assert_eq!(out, vec![0, 0, 0, 4, 0x26, 0x01, 0xAF, 0x09]);
        let sets = registry.parameter_sets();
        assert_eq!(sets.get(ParameterSetKind::Video).len(), 1);
        assert_eq!(sets.get(ParameterSetKind::Sequence).len(), 1);
        assert_eq!(sets.get(ParameterSetKind::Picture).len(), 1);
    }
}

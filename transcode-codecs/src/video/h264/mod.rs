//! H.264/AVC bitstream handling.
//!
//! Encoders hand out Annex B access units; MP4/MOV samples carry the same NAL
//! units length-prefixed, with SPS and PPS moved into the avcC record.

mod nal;

pub use nal::NalUnitType;

use crate::params::{annex_b_units, BitstreamSyntax};
use transcode_core::bitstream::write_length_prefixed;
use transcode_core::{Error, ParameterSetKind, Result};

/// Default NAL length prefix size used in MP4 samples.
pub const DEFAULT_NAL_LENGTH_SIZE: u8 = 4;

/// Check that a NAL length prefix size is one MP4 allows.
pub(crate) fn validate_length_size(length_size: u8) -> Result<u8> {
    match length_size {
        1 | 2 | 4 => Ok(length_size),
        other => Err(Error::Config(format!(
            "NAL length size must be 1, 2 or 4, got {other}"
        ))),
    }
}

/// Annex B in, length-prefixed out; SPS and PPS are parameter sets.
#[derive(Debug, Clone, Copy)]
pub struct AvcSyntax {
    length_size: u8,
}

impl Default for AvcSyntax {
    fn default() -> Self {
        Self {
            length_size: DEFAULT_NAL_LENGTH_SIZE,
        }
    }
}

impl AvcSyntax {
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

impl BitstreamSyntax for AvcSyntax {
    fn name(&self) -> &'static str {
        "h264"
    }

    fn expected_kinds(&self) -> &'static [ParameterSetKind] {
        &[ParameterSetKind::Sequence, ParameterSetKind::Picture]
    }

    fn units<'a>(&self, payload: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        annex_b_units(payload)
    }

    fn parameter_set_kind(&self, unit: &[u8]) -> Option<ParameterSetKind> {
        match NalUnitType::from_header(unit)? {
            NalUnitType::Sps => Some(ParameterSetKind::Sequence),
            NalUnitType::Pps => Some(ParameterSetKind::Picture),
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

    const SPS: [u8; 4] = [0x67, 0x42, 0x00, 0x1E];
    const PPS: [u8; 3] = [0x68, 0xCE, 0x38];

    fn access_unit(slice: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        for unit in [&SPS[..], &PPS[..], slice] {
            data.extend_from_slice(&[0, 0, 0, 1]);
            data.extend_from_slice(unit);
        }
        data
    }

    #[test]
    fn test_strips_parameter_sets_and_length_prefixes() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::default()));
        let out = registry.observe(&access_unit(&[0x65, 0x88, 0x84])).unwrap();

        assert_eq!(out, vec![0, 0, 0, 3, 0x65, 0x88, 0x84]);
        let sets = registry.parameter_sets();
        assert_eq!(sets.get(ParameterSetKind::Sequence), &[SPS.to_vec()]);
        assert_eq!(sets.get(ParameterSetKind::Picture), &[PPS.to_vec()]);
        assert_eq!(registry.stripped(), 2);
        assert!(registry.missing_kinds().is_empty());
    }

    #[test]
    fn test_missing_kinds() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::default()));
        assert_eq!(
            registry.missing_kinds(),
            vec![ParameterSetKind::Sequence, ParameterSetKind::Picture]
        );
        registry.observe(&[0, 0, 0, 1, 0x67, 0x42, 0, 0, 1, 0x65, 0x10]).unwrap();
        assert_eq!(registry.missing_kinds(), vec![ParameterSetKind::Picture]);
    }

    #[test]
    fn test_repeated_parameter_sets_are_kept_once() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::default()));
        for _ in 0..10 {
            registry.observe(&access_unit(&[0x41, 0x9A])).unwrap();
        }
        assert_eq!(registry.parameter_sets().len(), 2);
        assert_eq!(registry.stripped(), 20);
    }

    #[test]
    fn test_first_seen_order() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::default()));
        let second_sps = [0x67, 0x64, 0x00, 0x28];
        let mut data = access_unit(&[0x65, 0x01]);
        data.extend_from_slice(&[0, 0, 1]);
        data.extend_from_slice(&second_sps);
        registry.observe(&data).unwrap();
        registry.observe(&access_unit(&[0x41, 0x02])).unwrap();

        let sps = registry.parameter_sets().get(ParameterSetKind::Sequence);
        assert_eq!(sps, &[SPS.to_vec(), second_sps.to_vec()]);
    }

    #[test]
    fn test_short_length_prefix() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::new(2).unwrap()));
        let out = registry.observe(&access_unit(&[0x65, 0x88])).unwrap();
        assert_eq!(out, vec![0, 2, 0x65, 0x88]);
    }

    #[test]
    fn test_invalid_length_size() {
        assert!(AvcSyntax::new(3).is_err());
    }

    #[test]
    fn test_length_prefixed_input_rejected() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::default()));
        assert!(registry.observe(&[0x65, 0x88, 0x84, 0x21]).is_err());
        assert!(registry.parameter_sets().is_empty());
    }

    #[test]
    fn test_original_payload_untouched() {
        let mut registry = ParameterSetRegistry::new(Box::new(AvcSyntax::default()));
        let payload = access_unit(&[0x65, 0x10]);
        let copy = payload.clone();
        registry.observe(&payload).unwrap();
        assert_eq!(payload, copy);
    }
}

//! Decoder configuration records.

use transcode_core::error::{ContainerError, Result};
use transcode_core::{ParameterSetKind, ParameterSets};

/// Baseline profile, no constraints, level 3.0.
const DEFAULT_AVC_PROFILE: [u8; 3] = [0x42, 0x00, 0x1E];

/// Main profile, Main compatibility, level 0 (unspecified).
const DEFAULT_HEVC_PROFILE: [u8; 12] = [
    0x01, 0x60, 0x00, 0x00, 0x00, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

fn length_size_minus_one(nal_length_size: u8) -> Result<u8> {
    match nal_length_size {
        1 | 2 | 4 => Ok(nal_length_size - 1),
        other => Err(ContainerError::TrackConfig(format!(
            "NAL length size must be 1, 2 or 4, got {other}"
        ))
        .into()),
    }
}

fn write_nal_with_length(out: &mut Vec<u8>, unit: &[u8]) -> Result<()> {
    let len = u16::try_from(unit.len()).map_err(|_| {
        ContainerError::TrackConfig(format!("parameter set of {} bytes", unit.len()))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(unit);
    Ok(())
}

/// Build an AVCDecoderConfigurationRecord (avcC payload).
///
/// Profile, compatibility and level come from the first SPS; without one
/// the record advertises Baseline level 3.0 and empty lists.
pub fn avc_decoder_configuration(sets: &ParameterSets, nal_length_size: u8) -> Result<Vec<u8>> {
    let length_size = length_size_minus_one(nal_length_size)?;
    let sps = sets.get(ParameterSetKind::Sequence);
    let pps = sets.get(ParameterSetKind::Picture);

    if sps.len() > 31 {
        return Err(ContainerError::TrackConfig(format!("{} SPS in avcC", sps.len())).into());
    }
    if pps.len() > 255 {
        return Err(ContainerError::TrackConfig(format!("{} PPS in avcC", pps.len())).into());
    }

    let profile = match sps.first() {
        Some(first) if first.len() >= 4 => [first[1], first[2], first[3]],
        _ => DEFAULT_AVC_PROFILE,
    };

    let mut avcc = vec![
        // configurationVersion
        1,
        // AVCProfileIndication
        profile[0],
        // profile_compatibility
        profile[1],
        // AVCLevelIndication
        profile[2],
        // reserved (6 bits) + lengthSizeMinusOne
        0xFC | length_size,
        // reserved (3 bits) + numOfSequenceParameterSets
        0xE0 | sps.len() as u8,
    ];
    for unit in sps {
        write_nal_with_length(&mut avcc, unit)?;
    }
    avcc.push(pps.len() as u8);
    for unit in pps {
        write_nal_with_length(&mut avcc, unit)?;
    }

    Ok(avcc)
}

/// Build an HEVCDecoderConfigurationRecord (hvcC payload).
///
/// Only the fields needed to locate the parameter sets are meaningful;
/// profile, tier and level are copied from the first SPS when it is long
/// enough, and one array is written per non-empty kind.
pub fn hevc_decoder_configuration(sets: &ParameterSets, nal_length_size: u8) -> Result<Vec<u8>> {
    let length_size = length_size_minus_one(nal_length_size)?;

    // Read straight from the SPS: NAL header (2), sps header (1), then
    // profile_tier_level. Emulation prevention bytes are not removed.
    let profile = match sets.get(ParameterSetKind::Sequence).first() {
        Some(sps) if sps.len() >= 15 => {
            let mut profile = [0u8; 12];
            profile[..11].copy_from_slice(&sps[3..14]);
            profile[11] = sps[14];
            profile
        }
        _ => DEFAULT_HEVC_PROFILE,
    };

    let mut hvcc = Vec::with_capacity(23 + sets.len() * 64);
    // configurationVersion
    hvcc.push(1);
    // profile_space, tier, profile_idc, compatibility flags, constraint flags
    hvcc.extend_from_slice(&profile[..11]);
    // general_level_idc
    hvcc.push(profile[11]);
    // min_spatial_segmentation_idc
    hvcc.extend_from_slice(&[0xF0, 0x00]);
    // parallelismType
    hvcc.push(0xFC);
    // chromaFormat 4:2:0
    hvcc.push(0xFD);
    // bitDepthLumaMinus8, bitDepthChromaMinus8
    hvcc.extend_from_slice(&[0xF8, 0xF8]);
    // avgFrameRate
    hvcc.extend_from_slice(&0u16.to_be_bytes());
    // constantFrameRate, numTemporalLayers, temporalIdNested, lengthSizeMinusOne
    hvcc.push(length_size);

    let arrays: Vec<(u8, &[Vec<u8>])> = [
        (32u8, ParameterSetKind::Video),
        (33, ParameterSetKind::Sequence),
        (34, ParameterSetKind::Picture),
    ]
    .into_iter()
    .map(|(nal_type, kind)| (nal_type, sets.get(kind)))
    .filter(|(_, units)| !units.is_empty())
    .collect();

    hvcc.push(arrays.len() as u8);
    for (nal_type, units) in arrays {
        let count = u16::try_from(units.len()).map_err(|_| {
            ContainerError::TrackConfig(format!("{} NAL units of type {nal_type}", units.len()))
        })?;
        // array_completeness + nal_unit_type
        hvcc.push(0x80 | nal_type);
        hvcc.extend_from_slice(&count.to_be_bytes());
        for unit in units {
            write_nal_with_length(&mut hvcc, unit)?;
        }
    }

    Ok(hvcc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avc_sets() -> ParameterSets {
        let mut sets = ParameterSets::new();
        sets.insert(ParameterSetKind::Sequence, &[0x67, 0x4D, 0x40, 0x1F, 0xAA]);
        sets.insert(ParameterSetKind::Picture, &[0x68, 0xEE, 0x3C]);
        sets
    }

    #[test]
    fn test_avcc_layout() {
        let avcc = avc_decoder_configuration(&avc_sets(), 4).unwrap();
        assert_eq!(
            avcc,
            vec![
                1, 0x4D, 0x40, 0x1F, 0xFF, 0xE1, // header
                0, 5, 0x67, 0x4D, 0x40, 0x1F, 0xAA, // SPS
                1, 0, 3, 0x68, 0xEE, 0x3C, // PPS
            ]
        );
    }

    #[test]
    fn test_avcc_empty_sets() {
        let avcc = avc_decoder_configuration(&ParameterSets::new(), 4).unwrap();
        assert_eq!(avcc, vec![1, 0x42, 0x00, 0x1E, 0xFF, 0xE0, 0]);
    }

    #[test]
    fn test_avcc_length_size() {
        let avcc = avc_decoder_configuration(&avc_sets(), 2).unwrap();
        assert_eq!(avcc[4], 0xFD);
        assert!(avc_decoder_configuration(&avc_sets(), 3).is_err());
    }

    #[test]
    fn test_avcc_multiple_sps() {
        let mut sets = avc_sets();
        sets.insert(ParameterSetKind::Sequence, &[0x67, 0x64, 0x00, 0x28]);
        let avcc = avc_decoder_configuration(&sets, 4).unwrap();
        // Profile from the first SPS.
        assert_eq!(avcc[1], 0x4D);
        assert_eq!(avcc[5], 0xE2);
    }

    #[test]
    fn test_hvcc_arrays() {
        let mut sets = ParameterSets::new();
        sets.insert(ParameterSetKind::Video, &[0x40, 0x01, 0x0C]);
        sets.insert(ParameterSetKind::Sequence, &[0x42, 0x01, 0x01]);
        sets.insert(ParameterSetKind::Picture, &[0x44, 0x01, 0xC1]);

        let hvcc = hevc_decoder_configuration(&sets, 4).unwrap();
        assert_eq!(hvcc[0], 1);
        assert_eq!(hvcc[21], 3);
        assert_eq!(hvcc[22], 3);
        assert_eq!(&hvcc[23..26], &[0xA0, 0, 1]);
        assert_eq!(&hvcc[26..31], &[0, 3, 0x40, 0x01, 0x0C]);
        assert_eq!(hvcc.len(), 23 + 3 * (3 + 2 + 3));
    }

    #[test]
    fn test_hvcc_profile_from_sps() {
        let mut sets = ParameterSets::new();
        let sps: Vec<u8> = (0..20).map(|i| i as u8 + 1).collect();
        sets.insert(ParameterSetKind::Sequence, &sps);

        let hvcc = hevc_decoder_configuration(&sets, 4).unwrap();
        assert_eq!(&hvcc[1..12], &sps[3..14]);
        assert_eq!(hvcc[12], sps[14]);
    }

    #[test]
    fn test_hvcc_empty_sets() {
        let hvcc = hevc_decoder_configuration(&ParameterSets::new(), 1).unwrap();
        assert_eq!(hvcc.len(), 23);
        assert_eq!(hvcc[21], 0);
        assert_eq!(hvcc[22], 0);
    }
}

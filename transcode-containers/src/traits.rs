//! Container collaborator traits.
//!
//! Box parsing and writing live outside the pipeline. A container is seen
//! through its tracks: an [`InputTrack`] hands out compressed samples, an
//! [`OutputTrack`] accepts them along with one [`SampleDescription`].

use crate::mp4::{avc_decoder_configuration, hevc_decoder_configuration};
use transcode_core::error::Result;
use transcode_core::{CodecId, CompressedPacket, OwnedPacket, ParameterSets, TrackKind};

/// Everything a container needs to describe the samples of one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDescription {
    /// Codec of the samples.
    pub codec: CodecId,
    /// Distinct parameter sets, in first-seen order.
    pub parameter_sets: ParameterSets,
    /// Codec-specific configuration reported by the encoder.
    pub extra_data: Option<Vec<u8>>,
    /// Size of the NAL length prefix in each sample.
    pub nal_length_size: u8,
    /// Picture size for video tracks.
    pub dimensions: Option<(u32, u32)>,
}

impl SampleDescription {
    /// Create an empty description for `codec`.
    pub fn new(codec: CodecId) -> Self {
        Self {
            codec,
            parameter_sets: ParameterSets::new(),
            extra_data: None,
            nal_length_size: 4,
            dimensions: None,
        }
    }

    /// Set the parameter sets.
    pub fn with_parameter_sets(mut self, sets: ParameterSets) -> Self {
        self.parameter_sets = sets;
        self
    }

    /// Set the codec extra data.
    pub fn with_extra_data(mut self, extra_data: Option<Vec<u8>>) -> Self {
        self.extra_data = extra_data;
        self
    }

    /// Set the NAL length prefix size.
    pub fn with_nal_length_size(mut self, size: u8) -> Self {
        self.nal_length_size = size;
        self
    }

    /// Set the picture size.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Bytes of the codec configuration box (avcC, hvcC, ...).
    ///
    /// H.264 and H.265 records are built from the parameter sets. Other
    /// codecs use the encoder's extra data as is.
    pub fn decoder_configuration(&self) -> Result<Option<Vec<u8>>> {
        match self.codec {
            CodecId::H264 => {
                avc_decoder_configuration(&self.parameter_sets, self.nal_length_size).map(Some)
            }
            CodecId::H265 => {
                hevc_decoder_configuration(&self.parameter_sets, self.nal_length_size).map(Some)
            }
            _ => Ok(self.extra_data.clone()),
        }
    }
}

/// Source of compressed samples for one track.
pub trait InputTrack: Send {
    /// Codec of the samples.
    fn codec(&self) -> CodecId;

    /// Ticks per second of the packet timestamps.
    fn timescale(&self) -> u32;

    /// Picture size recorded in the container, `None` for audio.
    fn declared_dimensions(&self) -> Option<(u32, u32)>;

    /// Next sample in decode order, or `None` at end of track.
    fn next_packet(&mut self) -> Result<Option<OwnedPacket>>;

    /// Whether the track supports random access.
    fn can_seek(&self) -> bool {
        false
    }
}

/// Sink for the compressed samples of one track.
pub trait OutputTrack: Send {
    /// Append one sample. Called once per frame, in input order.
    fn add_frame(&mut self, packet: &CompressedPacket<'_>) -> Result<()>;

    /// Attach the sample description. Called once, after the last frame.
    fn add_sample_description(&mut self, description: SampleDescription) -> Result<()>;
}

/// Demuxer trait for reading container formats.
pub trait Demuxer {
    /// Get container format name.
    fn format_name(&self) -> &str;

    /// Open the video track.
    fn video_track(&mut self) -> Result<Box<dyn InputTrack>>;

    /// Open the audio track, if the container has one.
    fn audio_track(&mut self) -> Result<Option<Box<dyn InputTrack>>>;
}

/// Muxer trait for writing container formats.
pub trait Muxer {
    /// Get container format name.
    fn format_name(&self) -> &str;

    /// Add a track of `kind` using `timescale` ticks per second.
    fn add_track(&mut self, kind: TrackKind, timescale: u32) -> Result<Box<dyn OutputTrack>>;

    /// Write the header. Called exactly once, after every track is finished.
    fn write_header(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use transcode_core::ParameterSetKind;

    #[test]
    fn test_sample_description_builder() {
        let desc = SampleDescription::new(CodecId::H264)
            .with_dimensions(64, 48)
            .with_nal_length_size(2);
        assert_eq!(desc.dimensions, Some((64, 48)));
        assert_eq!(desc.nal_length_size, 2);
        assert!(desc.parameter_sets.is_empty());
    }

    #[test]
    fn test_decoder_configuration_per_codec() {
        let mut sets = ParameterSets::new();
        sets.insert(ParameterSetKind::Sequence, &[0x67, 0x64, 0x00, 0x28]);
        let avc = SampleDescription::new(CodecId::H264).with_parameter_sets(sets);
        let record = avc.decoder_configuration().unwrap().unwrap();
        assert_eq!(&record[..4], &[1, 0x64, 0x00, 0x28]);

        let jpeg = SampleDescription::new(CodecId::Jpeg).with_extra_data(Some(vec![9, 9]));
        assert_eq!(jpeg.decoder_configuration().unwrap(), Some(vec![9, 9]));

        let pcm = SampleDescription::new(CodecId::Pcm);
        assert_eq!(pcm.decoder_configuration().unwrap(), None);
    }
}

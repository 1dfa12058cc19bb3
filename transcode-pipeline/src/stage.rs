//! Decode-to-encode stages run by a [`FramePump`](crate::FramePump).
//!
//! A stage turns one input packet into one encoded payload. The video stage
//! owns the pixel buffer pool, the filter chain and the negotiated color
//! space; the audio stage is a plain decode/encode pair.

use tracing::{debug, trace};
use transcode_codecs::{AudioDecoder, AudioEncoder, VideoDecoder, VideoEncoder};
use transcode_core::convert::{can_convert, convert};
use transcode_core::{CodecId, ColorSpace, CompressedPacket, PixelBufferPool, TrackKind};

use crate::config::{FrameBound, PumpConfig};
use crate::filter::FilterChain;
use crate::pump::PumpStats;
use crate::{PipelineError, Result};

/// Media-specific part of a pump.
pub trait FrameStage: Send {
    /// Media kind handled by this stage.
    fn kind(&self) -> TrackKind;

    /// Codec of the encoded output.
    fn codec(&self) -> CodecId;

    /// Decode, transform and encode one packet.
    ///
    /// Returns the encoded payload, valid until the next call. Failures come
    /// back as [`PipelineError::Decode`] or [`PipelineError::Encode`] tagged
    /// with `frame`.
    fn process(
        &mut self,
        packet: &CompressedPacket<'_>,
        frame: u64,
        stats: &mut PumpStats,
    ) -> Result<&[u8]>;

    /// Encoder configuration data for the sample description.
    fn extra_data(&self) -> Option<Vec<u8>>;

    /// Picture size of the encoded output, for video.
    fn output_dimensions(&self) -> Option<(u32, u32)> {
        None
    }
}

/// Pick the color space the encoder will be fed.
///
/// `planned` is used as is when the encoder accepts it; otherwise the first
/// accepted color space `planned` converts to.
pub fn negotiate_color_space(planned: ColorSpace, supported: &[ColorSpace]) -> Result<ColorSpace> {
    if supported.is_empty() {
        return Err(PipelineError::CapabilityMismatch(
            "encoder accepts no color space".into(),
        ));
    }
    if supported.contains(&planned) {
        return Ok(planned);
    }
    supported
        .iter()
        .copied()
        .find(|target| can_convert(planned, *target))
        .ok_or_else(|| {
            let names: Vec<String> = supported.iter().map(ToString::to_string).collect();
            PipelineError::CapabilityMismatch(format!(
                "{planned} converts to none of [{}]",
                names.join(", ")
            ))
        })
}

/// Video decode, filter, convert and encode.
pub struct VideoStage {
    decoder: Box<dyn VideoDecoder>,
    encoder: Box<dyn VideoEncoder>,
    filters: FilterChain,
    pool: PixelBufferPool,
    declared: (u32, u32),
    decode_space: ColorSpace,
    target_space: ColorSpace,
    frame_bound: FrameBound,
    output: Vec<u8>,
    last_dimensions: Option<(u32, u32)>,
}

impl VideoStage {
    /// Wire a decoder to an encoder, negotiating the color space up front.
    ///
    /// `declared` is the picture size recorded in the input container; the
    /// decoder target is allocated at that size.
    pub fn new(
        decoder: Box<dyn VideoDecoder>,
        encoder: Box<dyn VideoEncoder>,
        filters: FilterChain,
        declared: (u32, u32),
        config: &PumpConfig,
    ) -> Result<Self> {
        let (width, height) = declared;
        if width == 0 || height == 0 {
            return Err(PipelineError::Config(format!(
                "declared picture size {width}x{height} is empty"
            )));
        }

        let decode_space = decoder.output_color_space();
        let planned = filters.output_color_space(decode_space);
        let target_space = negotiate_color_space(planned, &encoder.supported_color_spaces())?;

        debug!(
            decoder = decoder.codec_info().name,
            encoder = encoder.codec_info().name,
            %decode_space,
            %target_space,
            filters = ?filters,
            frame_bound = %config.frame_bound,
            "video stage negotiated"
        );

        Ok(Self {
            decoder,
            encoder,
            filters,
            pool: PixelBufferPool::new(config.pool_max_idle),
            declared,
            decode_space,
            target_space,
            frame_bound: config.frame_bound,
            output: Vec::new(),
            last_dimensions: None,
        })
    }

    /// Color space handed to the encoder.
    pub fn target_color_space(&self) -> ColorSpace {
        self.target_space
    }

    /// The stage's buffer pool.
    pub fn pool(&self) -> &PixelBufferPool {
        &self.pool
    }

    /// Current size of the encoder output buffer.
    pub fn output_capacity(&self) -> usize {
        self.output.len()
    }

    fn ensure_output(&mut self, width: u32, height: u32) {
        let needed = self
            .frame_bound
            .bytes_for(width, height)
            .max(self.encoder.min_output_size(width, height));
        if self.output.len() < needed {
            debug!(width, height, bytes = needed, "growing encoder output buffer");
            self.output.resize(needed, 0);
        }
    }
}

impl FrameStage for VideoStage {
    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn codec(&self) -> CodecId {
        self.encoder.codec_id()
    }

    fn process(
        &mut self,
        packet: &CompressedPacket<'_>,
        frame: u64,
        stats: &mut PumpStats,
    ) -> Result<&[u8]> {
        let decode_err = |source| PipelineError::Decode {
            track: TrackKind::Video,
            frame,
            source,
        };
        let encode_err = |source| PipelineError::Encode {
            track: TrackKind::Video,
            frame,
            source,
        };

        let (width, height) = self.declared;
        let mut picture = self.pool.acquire(width, height, self.decode_space);
        if let Err(err) = self.decoder.decode(packet, &mut picture) {
            self.pool.release(picture);
            return Err(decode_err(err));
        }
        stats.frames_decoded += 1;

        let mut picture = self
            .filters
            .apply(picture, &mut self.pool)
            .map_err(decode_err)?;

        if picture.color_space() != self.target_space {
            let mut converted = self
                .pool
                .acquire(picture.width(), picture.height(), self.target_space);
            let result = convert(&picture, &mut converted);
            self.pool.release(picture);
            if let Err(err) = result {
                self.pool.release(converted);
                return Err(encode_err(err));
            }
            stats.color_conversions += 1;
            picture = converted;
        }

        let (width, height) = (picture.width(), picture.height());
        self.ensure_output(width, height);
        let result = self.encoder.encode(&picture, &mut self.output);
        self.pool.release(picture);

        let written = result.map_err(encode_err)?;
        if written > self.output.len() {
            return Err(encode_err(transcode_core::Error::BufferTooSmall {
                needed: written,
                available: self.output.len(),
            }));
        }
        stats.frames_encoded += 1;
        self.last_dimensions = Some((width, height));

        trace!(frame, width, height, bytes = written, "video frame encoded");
        Ok(&self.output[..written])
    }

    fn extra_data(&self) -> Option<Vec<u8>> {
        self.encoder.extra_data()
    }

    fn output_dimensions(&self) -> Option<(u32, u32)> {
        self.last_dimensions.or_else(|| {
            let (width, height) = self.declared;
            Some(self.filters.output_dimensions(width, height))
        })
    }
}

/// Audio decode and encode.
pub struct AudioStage {
    decoder: Box<dyn AudioDecoder>,
    encoder: Box<dyn AudioEncoder>,
    output: Vec<u8>,
}

impl AudioStage {
    /// Wire an audio decoder to an encoder.
    pub fn new(decoder: Box<dyn AudioDecoder>, encoder: Box<dyn AudioEncoder>) -> Self {
        debug!(
            decoder = decoder.codec_info().name,
            encoder = encoder.codec_info().name,
            "audio stage ready"
        );
        Self {
            decoder,
            encoder,
            output: Vec::new(),
        }
    }
}

impl FrameStage for AudioStage {
    fn kind(&self) -> TrackKind {
        TrackKind::Audio
    }

    fn codec(&self) -> CodecId {
        self.encoder.codec_id()
    }

    fn process(
        &mut self,
        packet: &CompressedPacket<'_>,
        frame: u64,
        stats: &mut PumpStats,
    ) -> Result<&[u8]> {
        let samples = self
            .decoder
            .decode(packet)
            .map_err(|source| PipelineError::Decode {
                track: TrackKind::Audio,
                frame,
                source,
            })?;
        stats.frames_decoded += 1;

        self.output = self
            .encoder
            .encode(&samples)
            .map_err(|source| PipelineError::Encode {
                track: TrackKind::Audio,
                frame,
                source,
            })?;
        stats.frames_encoded += 1;

        trace!(frame, samples = samples.frames(), bytes = self.output.len(), "audio frame encoded");
        Ok(&self.output)
    }

    fn extra_data(&self) -> Option<Vec<u8>> {
        self.encoder.extra_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_prefers_planned() {
        let supported = [ColorSpace::Rgb24, ColorSpace::Yuv420p];
        assert_eq!(
            negotiate_color_space(ColorSpace::Yuv420p, &supported).unwrap(),
            ColorSpace::Yuv420p
        );
    }

    #[test]
    fn test_negotiate_keeps_encoder_preference() {
        let supported = [ColorSpace::Nv12, ColorSpace::Yuv444p, ColorSpace::Yuv420p];
        assert_eq!(
            negotiate_color_space(ColorSpace::Rgb24, &supported).unwrap(),
            ColorSpace::Yuv444p
        );
    }

    #[test]
    fn test_negotiate_mismatch() {
        assert!(matches!(
            negotiate_color_space(ColorSpace::Yuv420p, &[ColorSpace::Nv12]),
            Err(PipelineError::CapabilityMismatch(_))
        ));
        assert!(matches!(
            negotiate_color_space(ColorSpace::Yuv420p, &[]),
            Err(PipelineError::CapabilityMismatch(_))
        ));
    }
}

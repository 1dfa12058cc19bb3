//! Codec collaborator traits.
//!
//! The pipeline treats codecs as external collaborators with a narrow
//! functional contract:
//!
//! - [`VideoDecoder`] / [`VideoEncoder`] - Video codec traits
//! - [`AudioDecoder`] / [`AudioEncoder`] - Audio codec traits
//! - [`VideoDecoderFactory`] - Picks the decoder variant for a [`Downscale`]
//!
//! # Buffer Reuse
//!
//! Video codecs never allocate picture or output storage themselves. The
//! decoder writes into a pooled [`PixelBuffer`] and the encoder writes into a
//! caller-provided byte slice, so a long stream runs on a fixed set of
//! allocations.
//!
//! ```ignore
//! let mut target = pool.acquire(width, height, decoder.output_color_space());
//! decoder.decode(&packet, &mut target)?;
//! let written = encoder.encode(&target, &mut output)?;
//! pool.release(target);
//! ```

use crate::variant::Downscale;
use transcode_core::{AudioBuffer, CodecId, ColorSpace, CompressedPacket, PixelBuffer, Result};

/// Information about a codec.
#[derive(Debug, Clone)]
pub struct CodecInfo {
    /// Codec name.
    pub name: &'static str,
    /// Long name/description.
    pub long_name: &'static str,
    /// Whether this codec supports encoding.
    pub can_encode: bool,
    /// Whether this codec supports decoding.
    pub can_decode: bool,
}

/// Common trait for video decoders.
pub trait VideoDecoder: Send {
    /// Get codec information.
    fn codec_info(&self) -> CodecInfo;

    /// Color space of the pictures this decoder produces.
    fn output_color_space(&self) -> ColorSpace;

    /// Decode one packet into `target`.
    ///
    /// `target` arrives with the input track's declared dimensions in
    /// [`output_color_space`](VideoDecoder::output_color_space). A decoder
    /// producing a smaller picture shrinks it with
    /// [`PixelBuffer::shrink_to`].
    fn decode(&mut self, packet: &CompressedPacket<'_>, target: &mut PixelBuffer) -> Result<()>;
}

/// Creates the decoder variant matching a downscale factor.
pub trait VideoDecoderFactory: Send {
    /// Build a decoder for `downscale`.
    fn create(&self, downscale: Downscale) -> Result<Box<dyn VideoDecoder>>;
}

impl<F> VideoDecoderFactory for F
where
    F: Fn(Downscale) -> Result<Box<dyn VideoDecoder>> + Send,
{
    fn create(&self, downscale: Downscale) -> Result<Box<dyn VideoDecoder>> {
        self(downscale)
    }
}

/// Common trait for video encoders.
///
/// Rate control, if any, is the encoder's own business.
pub trait VideoEncoder: Send {
    /// Get codec information.
    fn codec_info(&self) -> CodecInfo;

    /// Codec of the produced bitstream.
    fn codec_id(&self) -> CodecId;

    /// Accepted color spaces, most preferred first.
    fn supported_color_spaces(&self) -> Vec<ColorSpace>;

    /// Smallest output buffer the encoder needs for a picture of this size.
    fn min_output_size(&self, _width: u32, _height: u32) -> usize {
        0
    }

    /// Encode `frame` into `output`, returning the number of bytes written.
    ///
    /// Must fail with [`Error::BufferTooSmall`](transcode_core::Error::BufferTooSmall)
    /// rather than truncate.
    fn encode(&mut self, frame: &PixelBuffer, output: &mut [u8]) -> Result<usize>;

    /// Codec-specific configuration data for the sample description.
    fn extra_data(&self) -> Option<Vec<u8>> {
        None
    }
}

/// Common trait for audio decoders.
pub trait AudioDecoder: Send {
    /// Get codec information.
    fn codec_info(&self) -> CodecInfo;

    /// Decode a packet into PCM.
    fn decode(&mut self, packet: &CompressedPacket<'_>) -> Result<AudioBuffer>;
}

/// Common trait for audio encoders.
pub trait AudioEncoder: Send {
    /// Get codec information.
    fn codec_info(&self) -> CodecInfo;

    /// Codec of the produced bitstream.
    fn codec_id(&self) -> CodecId;

    /// Encode PCM into one packet payload.
    fn encode(&mut self, samples: &AudioBuffer) -> Result<Vec<u8>>;

    /// Codec-specific configuration data (e.g. AudioSpecificConfig for AAC).
    fn extra_data(&self) -> Option<Vec<u8>> {
        None
    }
}

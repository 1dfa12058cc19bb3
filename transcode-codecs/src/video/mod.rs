//! Video bitstream syntaxes.
//!
//! - [`h264`] - H.264/AVC NAL handling
//! - [`hevc`] - H.265/HEVC NAL handling

pub mod h264;
pub mod hevc;

pub use h264::{AvcSyntax, NalUnitType, DEFAULT_NAL_LENGTH_SIZE};
pub use hevc::HevcSyntax;

use crate::params::{BitstreamSyntax, OpaqueSyntax};
use transcode_core::{CodecId, Result};

/// Pick the bitstream syntax for an encoder's output codec.
///
/// Codecs without in-band parameter sets get [`OpaqueSyntax`].
pub fn syntax_for(codec: CodecId, nal_length_size: u8) -> Result<Box<dyn BitstreamSyntax>> {
    Ok(match codec {
        CodecId::H264 => Box::new(AvcSyntax::new(nal_length_size)?),
        CodecId::H265 => Box::new(HevcSyntax::new(nal_length_size)?),
        _ => Box::new(OpaqueSyntax),
    })
}

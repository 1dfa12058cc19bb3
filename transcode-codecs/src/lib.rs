//! # Transcode Codecs
//!
//! Codec contracts and bitstream handling for the Transcode library.
//!
//! Concrete codecs live outside this crate; the pipeline only sees them
//! through the traits defined here:
//!
//! - [`VideoDecoder`] / [`VideoEncoder`] - Video codec traits
//! - [`AudioDecoder`] / [`AudioEncoder`] - Audio codec traits
//! - [`VideoDecoderFactory`] - Decoder selection per [`Downscale`] variant
//!
//! ## Parameter Sets
//!
//! [`ParameterSetRegistry`] removes in-band SPS/PPS (and VPS for HEVC) from
//! encoded packets and keeps one copy of each for the container's sample
//! description. The framing rules come from a [`BitstreamSyntax`], picked per
//! codec by [`video::syntax_for`].

pub mod params;
pub mod traits;
pub mod variant;
pub mod video;

pub use params::{BitstreamSyntax, OpaqueSyntax, ParameterSetRegistry};
pub use traits::{
    AudioDecoder, AudioEncoder, CodecInfo, VideoDecoder, VideoDecoderFactory, VideoEncoder,
};
pub use variant::Downscale;
pub use video::{syntax_for, AvcSyntax, HevcSyntax};

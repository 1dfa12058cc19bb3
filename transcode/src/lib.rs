//! # Transcode
//!
//! A frame-by-frame transcoding pipeline: demux, decode, filter, convert,
//! encode and remux one video track (plus an optional audio track) with
//! bounded memory.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use transcode::{MemoryDemuxer, MemoryMuxer, TranscodeOptions, Transcoder};
//!
//! let mut transcoder = Transcoder::builder()
//!     .options(TranscodeOptions::new().downscale(2))
//!     .video_decoder(|downscale| make_decoder(downscale))
//!     .video_encoder(Box::new(my_encoder))
//!     .build(demuxer, muxer)?;
//! let stats = transcoder.run()?;
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several crates:
//! - `transcode-core`: Pixel buffers, packets, pooling and color conversion
//! - `transcode-codecs`: Codec traits, decode variants and bitstream syntaxes
//! - `transcode-containers`: Track traits, in-memory containers, MP4 records
//! - `transcode-pipeline`: Frame pumps, filters and cancellation
//!
//! This crate re-exports the most commonly used types and provides the
//! [`Transcoder`] that drives both pumps.

mod options;
mod transcoder;

// Re-export core types
pub use transcode_core::{
    error::{BitstreamError, CodecError, ContainerError, Error},
    AudioBuffer, CodecId, ColorSpace, CompressedPacket, OwnedPacket, PacketFlags,
    ParameterSetKind, ParameterSets, PixelBuffer, PixelBufferPool, TrackKind,
};

// Re-export codec types
pub use transcode_codecs::{
    AudioDecoder, AudioEncoder, CodecInfo, Downscale, VideoDecoder, VideoDecoderFactory,
    VideoEncoder,
};

// Re-export container types
pub use transcode_containers::{
    Demuxer, InputTrack, MemoryDemuxer, MemoryInputTrack, MemoryMuxer, Muxer, OutputTrack,
    SampleDescription,
};

// Re-export pipeline types
pub use transcode_pipeline::{
    CancellationToken, Filter, FilterChain, FrameBound, IdentityFilter, PipelineError, PumpStats,
    Result, ScaleFilter,
};

// High-level API
pub use options::TranscodeOptions;
pub use transcoder::{TranscodeStats, Transcoder, TranscoderBuilder};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string.
pub fn version() -> &'static str {
    VERSION
}

//! Container collaborators for the transcode pipeline.
//!
//! This crate defines how the pipeline talks to demuxers and muxers, builds
//! the MP4 decoder configuration records that carry parameter sets, and
//! provides in-memory containers for tests and embedders.

pub mod memory;
pub mod mp4;
pub mod traits;

pub use memory::{MemoryDemuxer, MemoryInputTrack, MemoryMuxer, MemoryOutputTrack, TrackRecord};
pub use mp4::{avc_decoder_configuration, hevc_decoder_configuration};
pub use traits::{Demuxer, InputTrack, Muxer, OutputTrack, SampleDescription};

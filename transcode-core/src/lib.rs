//! # Transcode Core
//!
//! Core types shared by every stage of the transcode pipeline:
//! - Error handling types
//! - Pixel buffers and color spaces
//! - Codec identifiers and track kinds
//! - Compressed packets and their track positions
//! - Pixel buffer pooling and color space conversion
//! - Annex B framing helpers and parameter-set collections

pub mod bitstream;
pub mod convert;
pub mod error;
pub mod format;
pub mod frame;
pub mod packet;
pub mod params;
pub mod pool;
pub mod sample;

pub use error::{Error, Result};
pub use format::{CodecId, TrackKind};
pub use frame::{ColorSpace, PixelBuffer};
pub use packet::{CompressedPacket, OwnedPacket, PacketFlags, TrackPosition};
pub use params::{ParameterSetKind, ParameterSets};
pub use pool::PixelBufferPool;
pub use sample::AudioBuffer;

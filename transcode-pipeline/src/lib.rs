//! Transcoding pipeline for the Transcode codec library.
//!
//! A [`FramePump`] moves one track from an input container to an output
//! container: decode, filter, negotiate color space, encode, strip parameter
//! sets, write. Video and audio each get their own pump with its own pool
//! and parameter-set registry; a shared [`CancellationToken`] lets one pump
//! stop the other between frames.

mod cancel;
mod config;
mod cursor;
mod error;
mod filter;
mod pump;
mod stage;

pub use cancel::CancellationToken;
pub use config::{FrameBound, PumpConfig};
pub use cursor::FrameCursor;
pub use error::{PipelineError, Result};
pub use filter::{Filter, FilterChain, IdentityFilter, ScaleFilter};
pub use pump::{FramePump, PumpStats, StepOutcome};
pub use stage::{negotiate_color_space, AudioStage, FrameStage, VideoStage};

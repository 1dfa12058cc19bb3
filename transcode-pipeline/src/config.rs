//! Pump configuration.

use std::fmt;
use transcode_codecs::video::DEFAULT_NAL_LENGTH_SIZE;
use transcode_core::pool::DEFAULT_MAX_IDLE;

use crate::{PipelineError, Result};

/// Size of the encoder output buffer as a ratio of the picture area.
///
/// Evaluated on each picture after decoding and filtering, so thumbnail
/// variants and scaling filters are covered without per-variant formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBound {
    numerator: u32,
    denominator: u32,
}

impl FrameBound {
    /// `width * height * 3 / 2`, the size of a raw 4:2:0 picture.
    pub const RAW_420: FrameBound = FrameBound {
        numerator: 3,
        denominator: 2,
    };

    /// `width * height / 2`, for pre-scaled decode paths.
    pub const HALF: FrameBound = FrameBound {
        numerator: 1,
        denominator: 2,
    };

    /// Create a bound of `numerator / denominator` bytes per pixel.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if numerator == 0 || denominator == 0 {
            return Err(PipelineError::Config(format!(
                "frame bound {numerator}/{denominator} must be positive"
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Bytes reserved for a picture of the given size.
    pub fn bytes_for(&self, width: u32, height: u32) -> usize {
        let area = width as u64 * height as u64;
        (area * self.numerator as u64).div_ceil(self.denominator as u64) as usize
    }
}

impl Default for FrameBound {
    fn default() -> Self {
        Self::RAW_420
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w*h*{}/{}", self.numerator, self.denominator)
    }
}

/// Per-pump settings.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Encoder output buffer sizing.
    pub frame_bound: FrameBound,
    /// Idle buffers kept per shape by the pump's pool.
    pub pool_max_idle: usize,
    /// Log progress every this many frames (0 disables).
    pub progress_interval: u64,
    /// NAL length prefix size for rewritten samples.
    pub nal_length_size: u8,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            frame_bound: FrameBound::default(),
            pool_max_idle: DEFAULT_MAX_IDLE,
            progress_interval: 100,
            nal_length_size: DEFAULT_NAL_LENGTH_SIZE,
        }
    }
}

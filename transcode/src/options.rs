//! Transcoding options and configuration.

use transcode_codecs::Downscale;
use transcode_core::pool::DEFAULT_MAX_IDLE;
use transcode_pipeline::{FrameBound, PipelineError, PumpConfig};

use crate::Result;

/// High-level transcoding options using builder pattern.
#[derive(Debug, Clone)]
pub struct TranscodeOptions {
    /// Decode downscale factor: 1, 2 or 4.
    pub downscale: u32,
    /// Encoder output buffer sizing.
    pub frame_bound: FrameBound,
    /// Idle pixel buffers kept per shape.
    pub pool_max_idle: usize,
    /// Run the video and audio pumps on separate threads.
    pub parallel_pumps: bool,
    /// Log progress every this many frames (0 disables).
    pub progress_interval: u64,
    /// NAL length prefix size in output samples.
    pub nal_length_size: u8,
    /// Transcode the audio track when the input has one.
    pub audio: bool,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscodeOptions {
    /// Create new transcoding options.
    #[must_use]
    pub fn new() -> Self {
        let pump = PumpConfig::default();
        Self {
            downscale: 1,
            frame_bound: pump.frame_bound,
            pool_max_idle: DEFAULT_MAX_IDLE,
            parallel_pumps: false,
            progress_interval: pump.progress_interval,
            nal_length_size: pump.nal_length_size,
            audio: true,
        }
    }

    /// Set the decode downscale factor.
    #[must_use]
    pub fn downscale(mut self, factor: u32) -> Self {
        self.downscale = factor;
        self
    }

    /// Set the encoder output buffer bound.
    #[must_use]
    pub fn frame_bound(mut self, bound: FrameBound) -> Self {
        self.frame_bound = bound;
        self
    }

    /// Set the idle buffer cap of each pump's pool.
    #[must_use]
    pub fn pool_max_idle(mut self, max_idle: usize) -> Self {
        self.pool_max_idle = max_idle;
        self
    }

    /// Run pumps on separate threads.
    #[must_use]
    pub fn parallel_pumps(mut self, enable: bool) -> Self {
        self.parallel_pumps = enable;
        self
    }

    /// Set the progress logging interval in frames.
    #[must_use]
    pub fn progress_interval(mut self, frames: u64) -> Self {
        self.progress_interval = frames;
        self
    }

    /// Set the NAL length prefix size.
    #[must_use]
    pub fn nal_length_size(mut self, size: u8) -> Self {
        self.nal_length_size = size;
        self
    }

    /// Enable or disable audio transcoding.
    #[must_use]
    pub fn audio(mut self, enable: bool) -> Self {
        self.audio = enable;
        self
    }

    /// Validate the options, returning the decode variant.
    pub fn validate(&self) -> Result<Downscale> {
        let downscale = Downscale::try_from(self.downscale)?;
        if !matches!(self.nal_length_size, 1 | 2 | 4) {
            return Err(PipelineError::Config(format!(
                "NAL length size must be 1, 2 or 4, got {}",
                self.nal_length_size
            )));
        }
        if self.pool_max_idle == 0 {
            return Err(PipelineError::Config(
                "pool must keep at least one idle buffer".into(),
            ));
        }
        Ok(downscale)
    }

    /// Settings handed to each pump.
    pub fn pump_config(&self) -> PumpConfig {
        PumpConfig {
            frame_bound: self.frame_bound,
            pool_max_idle: self.pool_max_idle,
            progress_interval: self.progress_interval,
            nal_length_size: self.nal_length_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = TranscodeOptions::new()
            .downscale(2)
            .frame_bound(FrameBound::HALF)
            .pool_max_idle(2)
            .parallel_pumps(true)
            .progress_interval(10)
            .nal_length_size(2)
            .audio(false);

        assert_eq!(options.validate().unwrap(), Downscale::Half);
        assert!(options.parallel_pumps);
        assert!(!options.audio);

        let pump = options.pump_config();
        assert_eq!(pump.frame_bound, FrameBound::HALF);
        assert_eq!(pump.pool_max_idle, 2);
        assert_eq!(pump.progress_interval, 10);
        assert_eq!(pump.nal_length_size, 2);
    }

    #[test]
    fn test_defaults_are_valid() {
        let options = TranscodeOptions::default();
        assert_eq!(options.validate().unwrap(), Downscale::Full);
        assert_eq!(options.frame_bound, FrameBound::RAW_420);
        assert!(options.audio);
    }

    #[test]
    fn test_downscale_validation() {
        for factor in [1, 2, 4] {
            assert!(TranscodeOptions::new().downscale(factor).validate().is_ok());
        }
        for factor in [0, 3, 8] {
            let err = TranscodeOptions::new().downscale(factor).validate().unwrap_err();
            assert!(matches!(err, PipelineError::Config(_)), "factor {factor}");
        }
    }

    #[test]
    fn test_invalid_nal_length_and_pool() {
        assert!(TranscodeOptions::new().nal_length_size(3).validate().is_err());
        assert!(TranscodeOptions::new().pool_max_idle(0).validate().is_err());
    }
}

//! The frame pump: one track from input packet to output sample.
//!
//! A pump pulls packets from an [`InputTrack`], runs them through its
//! [`FrameStage`], strips in-band parameter sets with a
//! [`ParameterSetRegistry`] and writes the result to an [`OutputTrack`].
//! Frames are processed strictly one at a time and in input order.
//!
//! ```ignore
//! let mut pump = FramePump::new(input, output, stage, &config, cancel)?;
//! let result = pump.run();
//! pump.finish()?; // always hand over the sample description
//! result?;
//! ```

use tracing::{debug, info, trace, warn};
use transcode_codecs::{syntax_for, ParameterSetRegistry};
use transcode_containers::{InputTrack, OutputTrack, SampleDescription};
use transcode_core::TrackKind;

use crate::cancel::CancellationToken;
use crate::config::PumpConfig;
use crate::cursor::FrameCursor;
use crate::stage::FrameStage;
use crate::{PipelineError, Result};

/// Outcome of a single [`FramePump::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame was written; more may follow.
    Continue,
    /// The input is exhausted.
    EndOfStream,
}

/// Counters for one pump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Packets successfully decoded.
    pub frames_decoded: u64,
    /// Frames successfully encoded.
    pub frames_encoded: u64,
    /// Samples written to the output track.
    pub frames_written: u64,
    /// Payload bytes written to the output track.
    pub bytes_written: u64,
    /// In-band parameter-set units removed.
    pub parameter_sets_stripped: u64,
    /// Color space conversions performed.
    pub color_conversions: u64,
}

/// Drives one track to completion.
pub struct FramePump<S: FrameStage> {
    input: Box<dyn InputTrack>,
    output: Box<dyn OutputTrack>,
    stage: S,
    registry: ParameterSetRegistry,
    cursor: FrameCursor,
    cancel: CancellationToken,
    stats: PumpStats,
    progress_interval: u64,
    nal_length_size: u8,
    finished: bool,
}

impl<S: FrameStage> FramePump<S> {
    /// Create a pump. The bitstream syntax follows the stage's output codec.
    pub fn new(
        input: Box<dyn InputTrack>,
        output: Box<dyn OutputTrack>,
        stage: S,
        config: &PumpConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let syntax = syntax_for(stage.codec(), config.nal_length_size)?;
        let registry = ParameterSetRegistry::new(syntax);
        debug!(
            track = %stage.kind(),
            codec = %stage.codec(),
            syntax = registry.syntax_name(),
            "frame pump created"
        );

        Ok(Self {
            input,
            output,
            stage,
            registry,
            cursor: FrameCursor::new(),
            cancel,
            stats: PumpStats::default(),
            progress_interval: config.progress_interval,
            nal_length_size: config.nal_length_size,
            finished: false,
        })
    }

    /// Media kind of this pump.
    pub fn kind(&self) -> TrackKind {
        self.stage.kind()
    }

    /// Counters so far.
    pub fn stats(&self) -> PumpStats {
        self.stats
    }

    /// Current frame position.
    pub fn cursor(&self) -> FrameCursor {
        self.cursor
    }

    /// The pump's stage.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Parameter sets collected so far.
    pub fn registry(&self) -> &ParameterSetRegistry {
        &self.registry
    }

    /// Process at most one frame.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if self.cursor.is_end_of_stream() {
            return Ok(StepOutcome::EndOfStream);
        }
        let track = self.stage.kind();
        if self.cancel.is_cancelled() {
            let reason = self.cancel.reason().unwrap_or_else(|| "cancelled".into());
            warn!(%track, frame = self.cursor.index(), %reason, "pump cancelled");
            return Err(PipelineError::Cancelled(reason));
        }

        let Some(packet) = self
            .input
            .next_packet()
            .map_err(PipelineError::container(track))?
        else {
            self.cursor.mark_end_of_stream();
            debug!(%track, frames = self.cursor.index(), "end of stream");
            return Ok(StepOutcome::EndOfStream);
        };

        let frame = self.cursor.index();
        let encoded = self.stage.process(&packet, frame, &mut self.stats)?;

        let stripped_before = self.registry.stripped();
        let payload = self
            .registry
            .observe(encoded)
            .map_err(|source| PipelineError::Encode {
                track,
                frame,
                source,
            })?;
        self.stats.parameter_sets_stripped += self.registry.stripped() - stripped_before;

        let sample = packet.with_payload(payload);
        self.output
            .add_frame(&sample)
            .map_err(PipelineError::container(track))?;

        self.stats.frames_written += 1;
        self.stats.bytes_written += sample.size() as u64;
        self.cursor.advance();
        trace!(%track, frame, pts = sample.pts, bytes = sample.size(), "frame written");

        if self.progress_interval > 0 && self.cursor.index() % self.progress_interval == 0 {
            info!(
                %track,
                frames = self.stats.frames_written,
                bytes = self.stats.bytes_written,
                "progress"
            );
        }

        Ok(StepOutcome::Continue)
    }

    /// Step until end of stream or the first error.
    pub fn run(&mut self) -> Result<PumpStats> {
        info!(track = %self.stage.kind(), "pump started");
        while self.step()? == StepOutcome::Continue {}
        info!(
            track = %self.stage.kind(),
            frames = self.stats.frames_written,
            bytes = self.stats.bytes_written,
            "pump finished"
        );
        Ok(self.stats)
    }

    /// Hand the sample description to the output track.
    ///
    /// Idempotent; only the first call reaches the track. Safe to call
    /// after a failed or cancelled run.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let track = self.stage.kind();
        for kind in self.registry.missing_kinds() {
            warn!(%track, %kind, "no parameter set of this kind was seen");
        }

        let mut description = SampleDescription::new(self.stage.codec())
            .with_parameter_sets(self.registry.parameter_sets().clone())
            .with_extra_data(self.stage.extra_data())
            .with_nal_length_size(self.nal_length_size);
        if let Some((width, height)) = self.stage.output_dimensions() {
            description = description.with_dimensions(width, height);
        }

        debug!(
            %track,
            parameter_sets = description.parameter_sets.len(),
            can_seek = self.input.can_seek(),
            "writing sample description"
        );
        self.output
            .add_sample_description(description)
            .map_err(PipelineError::container(track))
    }
}

impl<S: FrameStage> std::fmt::Debug for FramePump<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePump")
            .field("track", &self.stage.kind())
            .field("cursor", &self.cursor)
            .field("stats", &self.stats)
            .field("registry", &self.registry)
            .field("finished", &self.finished)
            .finish()
    }
}

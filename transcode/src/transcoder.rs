//! High-level transcoder API.
//!
//! A [`Transcoder`] wires a [`Demuxer`] to a [`Muxer`] through one
//! [`FramePump`] per track and runs them in four stages:
//!
//! 1. [`init_decode`](Transcoder::init_decode) opens the input tracks and
//!    creates the video decoder variant for the configured downscale.
//! 2. [`init_encode`](Transcoder::init_encode) opens the output tracks and
//!    negotiates each stage.
//! 3. [`run_pumps`](Transcoder::run_pumps) drives every pump to end of
//!    stream, sequentially or on scoped threads.
//! 4. [`finish_encode`](Transcoder::finish_encode) hands each track its
//!    sample description and writes the container header once.
//!
//! [`run`](Transcoder::run) performs all four and always finalizes the
//! output once the pumps exist, even when a pump failed.

use tracing::{debug, error, info};
use transcode_codecs::{
    AudioDecoder, AudioEncoder, Downscale, VideoDecoder, VideoDecoderFactory, VideoEncoder,
};
use transcode_containers::{Demuxer, InputTrack, Muxer};
use transcode_core::TrackKind;
use transcode_pipeline::{
    AudioStage, CancellationToken, Filter, FilterChain, FramePump, FrameStage, PipelineError,
    PumpStats, VideoStage,
};

use crate::options::TranscodeOptions;
use crate::Result;

/// Transcoding statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeStats {
    /// Video pump counters.
    pub video: PumpStats,
    /// Audio pump counters, when an audio track was transcoded.
    pub audio: Option<PumpStats>,
    /// Whether the container header was written.
    pub header_written: bool,
}

impl TranscodeStats {
    /// Samples written across all tracks.
    pub fn frames_written(&self) -> u64 {
        self.video.frames_written + self.audio.map_or(0, |audio| audio.frames_written)
    }

    /// Payload bytes written across all tracks.
    pub fn bytes_written(&self) -> u64 {
        self.video.bytes_written + self.audio.map_or(0, |audio| audio.bytes_written)
    }
}

/// Lifecycle position of a [`Transcoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Created,
    DecodeReady,
    EncodeReady,
    Finished,
}

/// Builder for [`Transcoder`].
#[derive(Default)]
pub struct TranscoderBuilder {
    options: TranscodeOptions,
    video_decoder: Option<Box<dyn VideoDecoderFactory>>,
    video_encoder: Option<Box<dyn VideoEncoder>>,
    audio_codecs: Option<(Box<dyn AudioDecoder>, Box<dyn AudioEncoder>)>,
    filters: FilterChain,
    cancel: Option<CancellationToken>,
}

impl TranscoderBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transcoding options.
    #[must_use]
    pub fn options(mut self, options: TranscodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the factory choosing the video decoder variant.
    #[must_use]
    pub fn video_decoder<F>(mut self, factory: F) -> Self
    where
        F: VideoDecoderFactory + 'static,
    {
        self.video_decoder = Some(Box::new(factory));
        self
    }

    /// Set the video encoder.
    #[must_use]
    pub fn video_encoder(mut self, encoder: Box<dyn VideoEncoder>) -> Self {
        self.video_encoder = Some(encoder);
        self
    }

    /// Set the audio decoder and encoder.
    #[must_use]
    pub fn audio_codecs(
        mut self,
        decoder: Box<dyn AudioDecoder>,
        encoder: Box<dyn AudioEncoder>,
    ) -> Self {
        self.audio_codecs = Some((decoder, encoder));
        self
    }

    /// Append a video filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.add(Box::new(filter));
        self
    }

    /// Share an externally owned cancellation token.
    #[must_use]
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration and bind the containers.
    ///
    /// Fails with [`PipelineError::Config`] before touching either container.
    pub fn build<D: Demuxer, M: Muxer>(self, demuxer: D, muxer: M) -> Result<Transcoder<D, M>> {
        let downscale = self.options.validate()?;
        let video_decoder = self
            .video_decoder
            .ok_or_else(|| PipelineError::Config("no video decoder configured".into()))?;
        let video_encoder = self
            .video_encoder
            .ok_or_else(|| PipelineError::Config("no video encoder configured".into()))?;

        Ok(Transcoder {
            demuxer,
            muxer,
            options: self.options,
            downscale,
            video_factory: video_decoder,
            video_encoder: Some(video_encoder),
            audio_codecs: self.audio_codecs,
            filters: Some(self.filters),
            cancel: self.cancel.unwrap_or_default(),
            video_input: None,
            audio_input: None,
            decoder: None,
            video_pump: None,
            audio_pump: None,
            stats: TranscodeStats::default(),
            stage: Stage::Created,
        })
    }
}

/// High-level transcoder that orchestrates the transcoding process.
pub struct Transcoder<D: Demuxer, M: Muxer> {
    demuxer: D,
    muxer: M,
    options: TranscodeOptions,
    downscale: Downscale,
    video_factory: Box<dyn VideoDecoderFactory>,
    video_encoder: Option<Box<dyn VideoEncoder>>,
    audio_codecs: Option<(Box<dyn AudioDecoder>, Box<dyn AudioEncoder>)>,
    filters: Option<FilterChain>,
    cancel: CancellationToken,
    video_input: Option<Box<dyn InputTrack>>,
    audio_input: Option<Box<dyn InputTrack>>,
    decoder: Option<Box<dyn VideoDecoder>>,
    video_pump: Option<FramePump<VideoStage>>,
    audio_pump: Option<FramePump<AudioStage>>,
    stats: TranscodeStats,
    stage: Stage,
}

impl<D: Demuxer, M: Muxer> Transcoder<D, M> {
    /// Start building a transcoder.
    pub fn builder() -> TranscoderBuilder {
        TranscoderBuilder::new()
    }

    /// Get the options.
    pub fn options(&self) -> &TranscodeOptions {
        &self.options
    }

    /// Decode variant in use.
    pub fn downscale(&self) -> Downscale {
        self.downscale
    }

    /// Token shared by all pumps.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &TranscodeStats {
        &self.stats
    }

    /// The input container.
    pub fn demuxer(&self) -> &D {
        &self.demuxer
    }

    /// The output container.
    pub fn muxer(&self) -> &M {
        &self.muxer
    }

    fn expect_stage(&self, expected: Stage, operation: &str) -> Result<()> {
        if self.stage != expected {
            return Err(PipelineError::Config(format!(
                "{operation} called in stage {:?}, expected {expected:?}",
                self.stage
            )));
        }
        Ok(())
    }

    /// Open the input tracks and create the video decoder.
    pub fn init_decode(&mut self) -> Result<()> {
        self.expect_stage(Stage::Created, "init_decode")?;

        let video = self
            .demuxer
            .video_track()
            .map_err(|source| PipelineError::Container {
                track: TrackKind::Video,
                source,
            })?;
        if video.declared_dimensions().is_none() {
            return Err(PipelineError::Config(
                "video track declares no picture size".into(),
            ));
        }
        let decoder = self.video_factory.create(self.downscale)?;
        info!(
            format = self.demuxer.format_name(),
            codec = %video.codec(),
            decoder = decoder.codec_info().name,
            downscale = %self.downscale,
            "video input opened"
        );

        if self.options.audio && self.audio_codecs.is_some() {
            self.audio_input = self
                .demuxer
                .audio_track()
                .map_err(|source| PipelineError::Container {
                    track: TrackKind::Audio,
                    source,
                })?;
            match &self.audio_input {
                Some(audio) => info!(codec = %audio.codec(), "audio input opened"),
                None => debug!("input has no audio track"),
            }
        } else {
            debug!(enabled = self.options.audio, "audio not transcoded");
        }

        self.video_input = Some(video);
        self.decoder = Some(decoder);
        self.stage = Stage::DecodeReady;
        Ok(())
    }

    /// Open the output tracks and build the pumps.
    pub fn init_encode(&mut self) -> Result<()> {
        self.expect_stage(Stage::DecodeReady, "init_encode")?;
        let config = self.options.pump_config();

        let (Some(input), Some(decoder), Some(encoder), Some(filters)) = (
            self.video_input.take(),
            self.decoder.take(),
            self.video_encoder.take(),
            self.filters.take(),
        ) else {
            return Err(PipelineError::Config("video pipeline already consumed".into()));
        };

        // Negotiate every stage before the container sees a track.
        let declared = input.declared_dimensions().unwrap_or((0, 0));
        let video_stage = VideoStage::new(decoder, encoder, filters, declared, &config)?;
        let audio = match (self.audio_input.take(), self.audio_codecs.take()) {
            (Some(input), Some((decoder, encoder))) => Some((input, AudioStage::new(decoder, encoder))),
            _ => None,
        };

        let output = self
            .muxer
            .add_track(TrackKind::Video, input.timescale())
            .map_err(|source| PipelineError::Container {
                track: TrackKind::Video,
                source,
            })?;
        self.video_pump = Some(FramePump::new(
            input,
            output,
            video_stage,
            &config,
            self.cancel.clone(),
        )?);

        if let Some((input, stage)) = audio {
            let output = self
                .muxer
                .add_track(TrackKind::Audio, input.timescale())
                .map_err(|source| PipelineError::Container {
                    track: TrackKind::Audio,
                    source,
                })?;
            self.audio_pump = Some(FramePump::new(
                input,
                output,
                stage,
                &config,
                self.cancel.clone(),
            )?);
        }

        info!(
            format = self.muxer.format_name(),
            audio = self.audio_pump.is_some(),
            "output tracks opened"
        );
        self.stage = Stage::EncodeReady;
        Ok(())
    }

    /// Drive every pump to end of stream.
    ///
    /// A pump that fails cancels the others; the first fatal error wins.
    pub fn run_pumps(&mut self) -> Result<()> {
        self.expect_stage(Stage::EncodeReady, "run_pumps")?;
        let cancel = self.cancel.clone();
        let video = self
            .video_pump
            .as_mut()
            .ok_or_else(|| PipelineError::Config("video pump missing".into()))?;
        let audio = self.audio_pump.as_mut();

        let (video_result, audio_result) = if self.options.parallel_pumps && audio.is_some() {
            debug!("running pumps in parallel");
            let cancel = &cancel;
            std::thread::scope(|scope| {
                let audio_handle = audio.map(|pump| scope.spawn(move || drive(pump, cancel)));
                let video_result = drive(video, cancel);
                let audio_result = audio_handle.map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                });
                (video_result, audio_result)
            })
        } else {
            let video_result = drive(video, &cancel);
            let audio_result = audio.map(|pump| drive(pump, &cancel));
            (video_result, audio_result)
        };

        self.collect_stats();
        first_error(video_result, audio_result)
    }

    /// Hand each output track its sample description and write the header.
    ///
    /// Every step is attempted; the first error is returned.
    pub fn finish_encode(&mut self) -> Result<()> {
        if self.stage == Stage::Finished {
            return Ok(());
        }
        self.expect_stage(Stage::EncodeReady, "finish_encode")?;
        self.stage = Stage::Finished;

        let video = self.video_pump.as_mut().map_or(Ok(()), FramePump::finish);
        let audio = self.audio_pump.as_mut().map_or(Ok(()), FramePump::finish);
        let header = self
            .muxer
            .write_header()
            .map_err(PipelineError::Core);
        self.stats.header_written = header.is_ok();
        self.collect_stats();

        info!(
            frames = self.stats.frames_written(),
            bytes = self.stats.bytes_written(),
            header = self.stats.header_written,
            "output finalized"
        );
        video.and(audio).and(header)
    }

    /// Run all stages, returning the final statistics.
    pub fn run(&mut self) -> Result<TranscodeStats> {
        self.init_decode()?;
        self.init_encode()?;

        let pumped = self.run_pumps();
        if let Err(err) = &pumped {
            error!(error = %err, "transcode failed, finalizing output");
        }
        let finished = self.finish_encode();

        pumped?;
        finished?;
        Ok(self.stats.clone())
    }

    fn collect_stats(&mut self) {
        if let Some(pump) = &self.video_pump {
            self.stats.video = pump.stats();
        }
        self.stats.audio = self.audio_pump.as_ref().map(FramePump::stats);
    }
}

impl<D: Demuxer, M: Muxer> std::fmt::Debug for Transcoder<D, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcoder")
            .field("input", &self.demuxer.format_name())
            .field("output", &self.muxer.format_name())
            .field("options", &self.options)
            .field("stage", &self.stage)
            .field("video_pump", &self.video_pump)
            .field("audio_pump", &self.audio_pump)
            .finish()
    }
}

/// Run a pump, cancelling its siblings when it fails.
fn drive<S: FrameStage>(pump: &mut FramePump<S>, cancel: &CancellationToken) -> Result<PumpStats> {
    let result = pump.run();
    if let Err(err) = &result {
        if !matches!(err, PipelineError::Cancelled(_)) {
            cancel.cancel(format!("{} pump failed: {err}", pump.kind()));
        }
    }
    result
}

/// The first error that is not a cancellation it caused, else any error.
fn first_error(
    video: Result<PumpStats>,
    audio: Option<Result<PumpStats>>,
) -> Result<()> {
    let audio = audio.unwrap_or(Ok(PumpStats::default()));
    match (video, audio) {
        (Ok(_), Ok(_)) => Ok(()),
        (Err(PipelineError::Cancelled(_)), Err(err)) if !matches!(err, PipelineError::Cancelled(_)) => {
            Err(err)
        }
        (Err(err), _) | (Ok(_), Err(err)) => Err(err),
    }
}

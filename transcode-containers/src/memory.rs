//! In-memory containers.
//!
//! [`MemoryDemuxer`] serves pre-built packets; [`MemoryMuxer`] records what
//! the pipeline writes. The muxer is a cheap handle: clone it before giving
//! it away and inspect the recorded tracks afterwards.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;
use transcode_core::error::{ContainerError, Result};
use transcode_core::{CodecId, CompressedPacket, OwnedPacket, TrackKind};

use crate::traits::{Demuxer, InputTrack, Muxer, OutputTrack, SampleDescription};

/// Input track backed by a queue of packets.
#[derive(Debug, Clone)]
pub struct MemoryInputTrack {
    codec: CodecId,
    timescale: u32,
    dimensions: Option<(u32, u32)>,
    seekable: bool,
    packets: VecDeque<OwnedPacket>,
}

impl MemoryInputTrack {
    /// Create an empty video track.
    pub fn video(codec: CodecId, timescale: u32, width: u32, height: u32) -> Self {
        Self {
            codec,
            timescale,
            dimensions: Some((width, height)),
            seekable: true,
            packets: VecDeque::new(),
        }
    }

    /// Create an empty audio track.
    pub fn audio(codec: CodecId, timescale: u32) -> Self {
        Self {
            codec,
            timescale,
            dimensions: None,
            seekable: true,
            packets: VecDeque::new(),
        }
    }

    /// Set whether the track reports random access support.
    pub fn with_seek(mut self, seekable: bool) -> Self {
        self.seekable = seekable;
        self
    }

    /// Append packets to the queue.
    pub fn with_packets(mut self, packets: impl IntoIterator<Item = OwnedPacket>) -> Self {
        self.packets.extend(packets);
        self
    }

    /// Append one packet to the queue.
    pub fn push(&mut self, packet: OwnedPacket) {
        self.packets.push_back(packet);
    }

    /// Packets not yet read.
    pub fn remaining(&self) -> usize {
        self.packets.len()
    }
}

impl InputTrack for MemoryInputTrack {
    fn codec(&self) -> CodecId {
        self.codec
    }

    fn timescale(&self) -> u32 {
        self.timescale
    }

    fn declared_dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    fn next_packet(&mut self) -> Result<Option<OwnedPacket>> {
        Ok(self.packets.pop_front())
    }

    fn can_seek(&self) -> bool {
        self.seekable
    }
}

/// Demuxer holding one optional track per kind.
#[derive(Debug, Default)]
pub struct MemoryDemuxer {
    video: Option<MemoryInputTrack>,
    audio: Option<MemoryInputTrack>,
}

impl MemoryDemuxer {
    /// Create a demuxer with a video track.
    pub fn new(video: MemoryInputTrack) -> Self {
        Self {
            video: Some(video),
            audio: None,
        }
    }

    /// Add an audio track.
    pub fn with_audio(mut self, audio: MemoryInputTrack) -> Self {
        self.audio = Some(audio);
        self
    }
}

impl Demuxer for MemoryDemuxer {
    fn format_name(&self) -> &str {
        "memory"
    }

    fn video_track(&mut self) -> Result<Box<dyn InputTrack>> {
        let track = self
            .video
            .take()
            .ok_or_else(|| ContainerError::TrackNotFound("video".into()))?;
        Ok(Box::new(track))
    }

    fn audio_track(&mut self) -> Result<Option<Box<dyn InputTrack>>> {
        Ok(self
            .audio
            .take()
            .map(|track| Box::new(track) as Box<dyn InputTrack>))
    }
}

/// Everything written to one output track.
#[derive(Debug, Clone)]
pub struct TrackRecord {
    /// Media kind the track was created with.
    pub kind: TrackKind,
    /// Timescale the track was created with.
    pub timescale: u32,
    /// Samples in write order.
    pub frames: Vec<OwnedPacket>,
    /// Sample descriptions in write order.
    pub descriptions: Vec<SampleDescription>,
}

/// Output track appending into a shared [`TrackRecord`].
#[derive(Debug, Clone)]
pub struct MemoryOutputTrack {
    record: Arc<Mutex<TrackRecord>>,
}

impl MemoryOutputTrack {
    /// Create a standalone track.
    pub fn new(kind: TrackKind, timescale: u32) -> Self {
        Self {
            record: Arc::new(Mutex::new(TrackRecord {
                kind,
                timescale,
                frames: Vec::new(),
                descriptions: Vec::new(),
            })),
        }
    }

    /// Copy of everything written so far.
    pub fn record(&self) -> TrackRecord {
        self.record.lock().clone()
    }
}

impl OutputTrack for MemoryOutputTrack {
    fn add_frame(&mut self, packet: &CompressedPacket<'_>) -> Result<()> {
        let mut record = self.record.lock();
        if !record.descriptions.is_empty() {
            return Err(ContainerError::Finalized.into());
        }
        record.frames.push(packet.clone().into_owned());
        Ok(())
    }

    fn add_sample_description(&mut self, description: SampleDescription) -> Result<()> {
        let mut record = self.record.lock();
        if !record.descriptions.is_empty() {
            return Err(ContainerError::Finalized.into());
        }
        debug!(
            kind = %record.kind,
            codec = %description.codec,
            frames = record.frames.len(),
            "sample description added"
        );
        record.descriptions.push(description);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MuxerState {
    tracks: Vec<MemoryOutputTrack>,
    header_writes: usize,
}

/// Muxer recording tracks and header writes in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMuxer {
    state: Arc<Mutex<MuxerState>>,
}

impl MemoryMuxer {
    /// Create an empty muxer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every track, in creation order.
    pub fn tracks(&self) -> Vec<TrackRecord> {
        self.state.lock().tracks.iter().map(|t| t.record()).collect()
    }

    /// Snapshot of the first track of `kind`.
    pub fn track(&self, kind: TrackKind) -> Option<TrackRecord> {
        self.tracks().into_iter().find(|t| t.kind == kind)
    }

    /// Number of times the header was written.
    pub fn header_writes(&self) -> usize {
        self.state.lock().header_writes
    }
}

impl Muxer for MemoryMuxer {
    fn format_name(&self) -> &str {
        "memory"
    }

    fn add_track(&mut self, kind: TrackKind, timescale: u32) -> Result<Box<dyn OutputTrack>> {
        let mut state = self.state.lock();
        if state.header_writes > 0 {
            return Err(ContainerError::Finalized.into());
        }
        let track = MemoryOutputTrack::new(kind, timescale);
        state.tracks.push(track.clone());
        Ok(Box::new(track))
    }

    fn write_header(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        if state.header_writes > 0 {
            return Err(ContainerError::Finalized.into());
        }
        state.header_writes += 1;
        debug!(tracks = state.tracks.len(), "header written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transcode_core::Error;

    #[test]
    fn test_input_track_drains_in_order() {
        let mut track = MemoryInputTrack::video(CodecId::Jpeg, 600, 64, 64).with_packets(
            (0..3).map(|i| CompressedPacket::new(vec![i as u8]).with_timestamps(i * 20, i * 20)),
        );

        assert_eq!(track.declared_dimensions(), Some((64, 64)));
        for pts in [0, 20, 40] {
            assert_eq!(track.next_packet().unwrap().unwrap().pts, pts);
        }
        assert!(track.next_packet().unwrap().is_none());
    }

    #[test]
    fn test_demuxer_hands_out_tracks_once() {
        let mut demuxer = MemoryDemuxer::new(MemoryInputTrack::video(CodecId::Jpeg, 600, 8, 8));
        assert!(demuxer.video_track().is_ok());
        assert!(matches!(
            demuxer.video_track(),
            Err(Error::Container(ContainerError::TrackNotFound(_)))
        ));
        assert!(demuxer.audio_track().unwrap().is_none());
    }

    #[test]
    fn test_output_track_rejects_frames_after_description() {
        let mut track = MemoryOutputTrack::new(TrackKind::Video, 600);
        track.add_frame(&CompressedPacket::new(vec![1])).unwrap();
        track
            .add_sample_description(SampleDescription::new(CodecId::H264))
            .unwrap();

        assert!(track.add_frame(&CompressedPacket::new(vec![2])).is_err());
        assert!(track
            .add_sample_description(SampleDescription::new(CodecId::H264))
            .is_err());
        assert_eq!(track.record().frames.len(), 1);
    }

    #[test]
    fn test_muxer_records_tracks() {
        let muxer = MemoryMuxer::new();
        let mut handle = muxer.clone();

        let mut video = handle.add_track(TrackKind::Video, 600).unwrap();
        video.add_frame(&CompressedPacket::new(vec![0xAB])).unwrap();
        handle.write_header().unwrap();

        assert_eq!(muxer.header_writes(), 1);
        let record = muxer.track(TrackKind::Video).unwrap();
        assert_eq!(record.timescale, 600);
        assert_eq!(record.frames[0].data(), &[0xAB]);
        assert!(muxer.track(TrackKind::Audio).is_none());

        assert!(handle.write_header().is_err());
        assert!(handle.add_track(TrackKind::Audio, 48000).is_err());
    }
}

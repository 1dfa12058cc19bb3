//! Compressed packets travelling between containers and codecs.

use bitflags::bitflags;
use std::borrow::Cow;
use std::fmt;

bitflags! {
    /// Flags for packet properties.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PacketFlags: u32 {
        /// This packet contains a keyframe.
        const KEYFRAME = 0x0001;
    }
}

/// Where a packet came from in its source track.
///
/// Carried by value so output timing can be rebuilt without holding on to the
/// demuxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TrackPosition {
    /// Track identifier inside the source container.
    pub track_id: u32,
    /// Zero-based sample number within the track.
    pub sample_index: u64,
}

impl TrackPosition {
    /// Create a new track position.
    pub fn new(track_id: u32, sample_index: u64) -> Self {
        Self {
            track_id,
            sample_index,
        }
    }
}

/// An encoded media packet.
///
/// Timestamps are expressed in the owning track's timescale. The payload is
/// never modified in place: rewriting goes through [`with_payload`], which
/// keeps timing, flags and position and leaves the original untouched.
///
/// [`with_payload`]: CompressedPacket::with_payload
#[derive(Clone)]
pub struct CompressedPacket<'a> {
    data: Cow<'a, [u8]>,
    /// Presentation timestamp.
    pub pts: i64,
    /// Decode timestamp.
    pub dts: i64,
    /// Duration of the packet.
    pub duration: i64,
    /// Packet flags.
    pub flags: PacketFlags,
    /// Origin of the packet in the input track.
    pub position: TrackPosition,
}

impl<'a> CompressedPacket<'a> {
    /// Create a new packet with owned data.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Cow::Owned(data),
            pts: 0,
            dts: 0,
            duration: 0,
            flags: PacketFlags::empty(),
            position: TrackPosition::default(),
        }
    }

    /// Create a new packet referencing external data.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            data: Cow::Borrowed(data),
            pts: 0,
            dts: 0,
            duration: 0,
            flags: PacketFlags::empty(),
            position: TrackPosition::default(),
        }
    }

    /// Get the packet data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the size of the packet data.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this packet is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if this is a keyframe packet.
    pub fn is_keyframe(&self) -> bool {
        self.flags.contains(PacketFlags::KEYFRAME)
    }

    /// Set the keyframe flag.
    pub fn set_keyframe(&mut self, keyframe: bool) {
        self.flags.set(PacketFlags::KEYFRAME, keyframe);
    }

    /// A packet carrying `data` with this packet's timing, flags and position.
    pub fn with_payload(&self, data: Vec<u8>) -> CompressedPacket<'static> {
        CompressedPacket {
            data: Cow::Owned(data),
            pts: self.pts,
            dts: self.dts,
            duration: self.duration,
            flags: self.flags,
            position: self.position,
        }
    }

    /// Make the packet own its data.
    pub fn into_owned(self) -> CompressedPacket<'static> {
        CompressedPacket {
            data: Cow::Owned(self.data.into_owned()),
            pts: self.pts,
            dts: self.dts,
            duration: self.duration,
            flags: self.flags,
            position: self.position,
        }
    }

    /// Set presentation and decode timestamps.
    pub fn with_timestamps(mut self, pts: i64, dts: i64) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    /// Set the duration.
    pub fn with_duration(mut self, duration: i64) -> Self {
        self.duration = duration;
        self
    }

    /// Set the flags.
    pub fn with_flags(mut self, flags: PacketFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the source position.
    pub fn with_position(mut self, position: TrackPosition) -> Self {
        self.position = position;
        self
    }
}

impl<'a> fmt::Debug for CompressedPacket<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressedPacket")
            .field("size", &self.size())
            .field("pts", &self.pts)
            .field("dts", &self.dts)
            .field("duration", &self.duration)
            .field("flags", &self.flags)
            .field("position", &self.position)
            .finish()
    }
}

/// An owned packet suitable for storage and crossing threads.
pub type OwnedPacket = CompressedPacket<'static>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_creation() {
        let packet = CompressedPacket::new(vec![0u8; 100]);
        assert_eq!(packet.size(), 100);
        assert!(!packet.is_empty());
    }

    #[test]
    fn test_packet_keyframe() {
        let mut packet = CompressedPacket::new(Vec::new());
        assert!(!packet.is_keyframe());
        packet.set_keyframe(true);
        assert!(packet.is_keyframe());
        packet.set_keyframe(false);
        assert!(!packet.is_keyframe());
    }

    #[test]
    fn test_with_payload_keeps_metadata_and_original() {
        let source = [1u8, 2, 3, 4];
        let packet = CompressedPacket::from_slice(&source)
            .with_timestamps(33, 30)
            .with_duration(33)
            .with_flags(PacketFlags::KEYFRAME)
            .with_position(TrackPosition::new(1, 7));

        let rewritten = packet.with_payload(vec![9, 9]);
        assert_eq!(rewritten.data(), &[9, 9]);
        assert_eq!(rewritten.pts, 33);
        assert_eq!(rewritten.dts, 30);
        assert_eq!(rewritten.duration, 33);
        assert!(rewritten.is_keyframe());
        assert_eq!(rewritten.position, TrackPosition::new(1, 7));
        assert_eq!(packet.data(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_packet_into_owned() {
        let data = [1u8, 2, 3];
        let owned: OwnedPacket = CompressedPacket::from_slice(&data).into_owned();
        assert_eq!(owned.data(), &[1, 2, 3]);
    }
}

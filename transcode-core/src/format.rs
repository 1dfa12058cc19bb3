//! Codec identifiers.

use std::fmt;

/// Media kind of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Video track.
    Video,
    /// Audio track.
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Codec identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// H.264/AVC.
    H264,
    /// H.265/HEVC.
    H265,
    /// Motion JPEG.
    Jpeg,
    /// AAC.
    Aac,
    /// Uncompressed PCM.
    Pcm,
}

impl CodecId {
    /// Media kind carried by this codec.
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::H264 | Self::H265 | Self::Jpeg => TrackKind::Video,
            Self::Aac | Self::Pcm => TrackKind::Audio,
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H264 => write!(f, "H.264/AVC"),
            Self::H265 => write!(f, "H.265/HEVC"),
            Self::Jpeg => write!(f, "Motion JPEG"),
            Self::Aac => write!(f, "AAC"),
            Self::Pcm => write!(f, "PCM"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_kind() {
        assert_eq!(CodecId::Jpeg.kind(), TrackKind::Video);
        assert_eq!(CodecId::Aac.kind(), TrackKind::Audio);
    }
}

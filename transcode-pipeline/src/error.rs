//! Pipeline error types.

use thiserror::Error;
use transcode_core::error::Error as CoreError;
use transcode_core::TrackKind;

/// Pipeline error type.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration, detected before any I/O.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Decoder (or filter) failed on a frame.
    #[error("Decode error on {track} frame {frame}: {source}")]
    Decode {
        track: TrackKind,
        frame: u64,
        #[source]
        source: CoreError,
    },

    /// Encoder failed on a frame, including output overflow.
    #[error("Encode error on {track} frame {frame}: {source}")]
    Encode {
        track: TrackKind,
        frame: u64,
        #[source]
        source: CoreError,
    },

    /// Decoder output cannot be brought into a layout the encoder accepts.
    #[error("Capability mismatch: {0}")]
    CapabilityMismatch(String),

    /// Reading from or writing to a container track failed.
    #[error("Container error on {track} track: {source}")]
    Container {
        track: TrackKind,
        #[source]
        source: CoreError,
    },

    /// The pump was cancelled between frames.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// Core error outside any frame.
    #[error("Core error: {0}")]
    Core(CoreError),
}

impl PipelineError {
    /// Whether this error aborted a pump in the middle of a frame.
    pub fn is_fatal_frame_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Encode { .. })
    }

    /// Track the error belongs to, when known.
    pub fn track(&self) -> Option<TrackKind> {
        match self {
            Self::Decode { track, .. } | Self::Encode { track, .. } | Self::Container { track, .. } => {
                Some(*track)
            }
            _ => None,
        }
    }

    /// Index of the failing frame, when the error is frame-scoped.
    pub fn frame(&self) -> Option<u64> {
        match self {
            Self::Decode { frame, .. } | Self::Encode { frame, .. } => Some(*frame),
            _ => None,
        }
    }

    pub(crate) fn container(track: TrackKind) -> impl FnOnce(CoreError) -> Self {
        move |source| Self::Container { track, source }
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config(msg) => Self::Config(msg),
            CoreError::CapabilityMismatch(msg) => Self::CapabilityMismatch(msg),
            CoreError::Cancelled => Self::Cancelled("cancelled".into()),
            other => Self::Core(other),
        }
    }
}

/// Pipeline result type.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_category() {
        let err: PipelineError = CoreError::Config("bad".into()).into();
        assert!(matches!(err, PipelineError::Config(_)));

        let err: PipelineError = CoreError::CapabilityMismatch("nv12".into()).into();
        assert!(matches!(err, PipelineError::CapabilityMismatch(_)));

        let err: PipelineError = CoreError::Unsupported("x".into()).into();
        assert!(matches!(err, PipelineError::Core(_)));
    }

    #[test]
    fn test_frame_error_accessors() {
        let err = PipelineError::Encode {
            track: TrackKind::Video,
            frame: 7,
            source: CoreError::BufferTooSmall {
                needed: 10,
                available: 5,
            },
        };
        assert!(err.is_fatal_frame_error());
        assert_eq!(err.track(), Some(TrackKind::Video));
        assert_eq!(err.frame(), Some(7));
        assert!(err.to_string().contains("frame 7"));

        let err = PipelineError::Cancelled("stop".into());
        assert!(!err.is_fatal_frame_error());
        assert_eq!(err.track(), None);
    }
}

//! Error types for the transcode pipeline.
//!
//! Every crate in the workspace converts into [`Error`] at its boundary, so a
//! collaborator implementation (decoder, encoder, track) only needs to speak
//! this one type.

use thiserror::Error;

/// Main error type for the transcode pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Container errors (demuxing/muxing).
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Codec errors (encoding/decoding).
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Bitstream parsing errors.
    #[error("Bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unsupported feature or format.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Buffer too small for operation.
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Two collaborators cannot agree on a pixel layout.
    #[error("Capability mismatch: {0}")]
    CapabilityMismatch(String),
}

/// Container errors.
#[derive(Error, Debug)]
pub enum ContainerError {
    /// Track not present in the container.
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Track configuration error.
    #[error("Track configuration error: {0}")]
    TrackConfig(String),

    /// The container was already finalized.
    #[error("Container already finalized")]
    Finalized,

    /// Generic container error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for ContainerError {
    fn from(s: String) -> Self {
        ContainerError::Other(s)
    }
}

impl From<&str> for ContainerError {
    fn from(s: &str) -> Self {
        ContainerError::Other(s.to_string())
    }
}

/// Codec errors.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Bitstream corruption detected.
    #[error("Bitstream corruption at offset {offset}")]
    BitstreamCorruption { offset: u64 },

    /// Generic codec error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for CodecError {
    fn from(s: String) -> Self {
        CodecError::Other(s)
    }
}

impl From<&str> for CodecError {
    fn from(s: &str) -> Self {
        CodecError::Other(s.to_string())
    }
}

/// Bitstream parsing errors.
#[derive(Error, Debug)]
pub enum BitstreamError {
    /// Invalid start code.
    #[error("Invalid start code at offset {offset}")]
    InvalidStartCode { offset: u64 },

    /// A unit is too large for the chosen length prefix.
    #[error("Unit of {size} bytes does not fit a {length_size}-byte length prefix")]
    UnitTooLarge { size: usize, length_size: u8 },

    /// Generic bitstream error message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for BitstreamError {
    fn from(s: String) -> Self {
        BitstreamError::Other(s)
    }
}

impl From<&str> for BitstreamError {
    fn from(s: &str) -> Self {
        BitstreamError::Other(s.to_string())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid_param(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    /// Check if this error came from an undersized output buffer.
    #[must_use]
    pub fn is_buffer_too_small(&self) -> bool {
        matches!(self, Error::BufferTooSmall { .. })
    }
}

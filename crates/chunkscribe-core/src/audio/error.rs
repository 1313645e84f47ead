//! Audio-specific error types

use std::fmt;

/// Errors that can occur during audio decode, probe, and extraction
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// No decoder could parse the container
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    /// Container decoded but the format is unusable
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Extracted payload exceeds the per-request byte ceiling
    #[error("Chunk payload would be {bytes} bytes, over the {limit} byte limit")]
    PayloadTooLarge { bytes: u64, limit: u64 },

    /// Requested time range lies outside the file
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// I/O error during audio operations
    #[error("Audio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Create a decode failure error
    pub fn decode_failed(msg: impl fmt::Display) -> Self {
        Self::DecodeFailed(msg.to_string())
    }
}

// Allow converting from hound errors
impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => AudioError::Io(io),
            hound::Error::FormatError(msg) => AudioError::DecodeFailed(msg.to_string()),
            hound::Error::Unsupported => {
                AudioError::UnsupportedFormat("unsupported WAV encoding".to_string())
            }
            other => AudioError::DecodeFailed(other.to_string()),
        }
    }
}

//! Unified error types for chunkscribe-core
//!
//! # Error Hierarchy
//!
//! ```text
//! ChunkscribeError
//!   ├── Audio(AudioError)      - Decode, probe, extraction errors
//!   ├── Service(ServiceError)  - Transcription service transport errors
//!   ├── Config(String)         - Planner/config validation errors
//!   ├── Cancelled              - Cooperative abort
//!   └── Io(std::io::Error)     - Generic I/O errors
//! ```

pub use crate::audio::AudioError;
pub use crate::provider::ServiceError;

/// Top-level error type for chunkscribe-core operations
#[derive(Debug, thiserror::Error)]
pub enum ChunkscribeError {
    /// Audio-related errors (decode, probe, extraction)
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Transcription service transport errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cooperative cancellation
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChunkscribeError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Convenience result type using ChunkscribeError
pub type Result<T> = std::result::Result<T, ChunkscribeError>;

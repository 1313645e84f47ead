//! Transcription service transport errors
//!
//! `ServiceError` is deliberately a small tagged union: the dispatcher
//! classifies these into retryable/fatal kinds, and that classification
//! must stay a pure function of the variant and status code.

/// Errors from one round-trip to the transcription service
#[derive(Debug, Clone, thiserror::Error)]
pub enum ServiceError {
    /// The per-attempt deadline elapsed
    #[error("Request timed out")]
    Timeout,

    /// Connection, DNS, or other transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },

    /// The service answered 2xx but the body was not parseable
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_connect() {
            ServiceError::Network(format!("Connection failed: {err}"))
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

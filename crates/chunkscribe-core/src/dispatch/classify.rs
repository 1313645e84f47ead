//! Service error classification
//!
//! A pure function from a transport error to an `ErrorKind`: identical
//! inputs always yield the identical kind and retryability. The
//! dispatcher's retry loop and abort decisions key entirely off this.

use serde::Serialize;

use crate::provider::ServiceError;

/// Classified failure category for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Per-request deadline exceeded
    Timeout,
    /// Connection or DNS failure
    Network,
    /// HTTP 429
    RateLimit,
    /// HTTP 500/502/503/504
    ServerError,
    /// HTTP 401/403; aborts the whole plan
    Auth,
    /// HTTP 400 complaining about the submitted audio
    InvalidAudio,
    /// Local decode/extraction failure (never produced by `classify`)
    Decode,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Whether waiting and repeating the same request bytes can help
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Network | ErrorKind::RateLimit | ErrorKind::ServerError
        )
    }

    /// Whether this failure invalidates every remaining chunk
    pub fn aborts_plan(self) -> bool {
        self == ErrorKind::Auth
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::RateLimit => "rate limit",
            ErrorKind::ServerError => "server error",
            ErrorKind::Auth => "auth",
            ErrorKind::InvalidAudio => "invalid audio",
            ErrorKind::Decode => "decode",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classify a service transport error
pub fn classify(error: &ServiceError) -> ErrorKind {
    match error {
        ServiceError::Timeout => ErrorKind::Timeout,
        ServiceError::Network(_) => ErrorKind::Network,
        ServiceError::InvalidResponse(_) => ErrorKind::Unknown,
        ServiceError::Http { status, message } => match status {
            429 => ErrorKind::RateLimit,
            500 | 502 | 503 | 504 => ErrorKind::ServerError,
            401 | 403 => ErrorKind::Auth,
            400 if mentions_audio(message) => ErrorKind::InvalidAudio,
            _ => ErrorKind::Unknown,
        },
    }
}

fn mentions_audio(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("audio") || lower.contains("file") || lower.contains("format")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> ServiceError {
        ServiceError::Http {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_transport_kinds() {
        assert_eq!(classify(&ServiceError::Timeout), ErrorKind::Timeout);
        assert_eq!(
            classify(&ServiceError::Network("dns".into())),
            ErrorKind::Network
        );
        assert_eq!(
            classify(&ServiceError::InvalidResponse("not json".into())),
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_status_table() {
        assert_eq!(classify(&http(429, "slow down")), ErrorKind::RateLimit);
        for status in [500, 502, 503, 504] {
            assert_eq!(classify(&http(status, "oops")), ErrorKind::ServerError);
        }
        assert_eq!(classify(&http(401, "no")), ErrorKind::Auth);
        assert_eq!(classify(&http(403, "no")), ErrorKind::Auth);
        assert_eq!(classify(&http(501, "nope")), ErrorKind::Unknown);
    }

    #[test]
    fn test_bad_request_audio_detection() {
        assert_eq!(
            classify(&http(400, "Invalid file format.")),
            ErrorKind::InvalidAudio
        );
        assert_eq!(
            classify(&http(400, "could not decode AUDIO stream")),
            ErrorKind::InvalidAudio
        );
        assert_eq!(
            classify(&http(400, "missing model parameter")),
            ErrorKind::Unknown
        );
        assert_eq!(classify(&http(404, "gone")), ErrorKind::Unknown);
    }

    #[test]
    fn test_retryability() {
        for kind in [
            ErrorKind::Timeout,
            ErrorKind::Network,
            ErrorKind::RateLimit,
            ErrorKind::ServerError,
        ] {
            assert!(kind.is_retryable());
        }
        for kind in [
            ErrorKind::Auth,
            ErrorKind::InvalidAudio,
            ErrorKind::Decode,
            ErrorKind::Unknown,
        ] {
            assert!(!kind.is_retryable());
        }
        assert!(ErrorKind::Auth.aborts_plan());
        assert!(!ErrorKind::ServerError.aborts_plan());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let inputs = [
            ServiceError::Timeout,
            ServiceError::Network("refused".into()),
            http(429, "x"),
            http(503, "x"),
            http(400, "bad audio"),
        ];
        for input in &inputs {
            assert_eq!(classify(input), classify(input));
        }
    }
}

//! Transcription service client
//!
//! Providers implement the `TranscriptionBackend` trait: one multipart
//! round-trip per chunk payload, returning verbose JSON with word-level
//! timestamps. The dispatcher owns retries and error classification;
//! backends only report typed transport errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::audio::AudioPayload;

mod base;
pub mod error;
mod groq;

pub use error::ServiceError;
pub use groq::GroqProvider;

/// Minimum plausible API key length (advisory check)
const MIN_API_KEY_LEN: usize = 20;

/// Expected API key prefix (advisory check)
const API_KEY_PREFIX: &str = "gsk_";

/// Request data for one chunk's transcription round-trip
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub audio_data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub model: String,
    pub language: Option<String>,
}

impl TranscriptionRequest {
    /// Build a request from an extracted payload
    pub fn from_payload(payload: AudioPayload, model: &str, language: Option<&str>) -> Self {
        Self {
            audio_data: payload.data,
            filename: payload.filename,
            mime_type: payload.mime_type,
            model: model.to_string(),
            language: language.map(String::from),
        }
    }
}

/// One word with chunk-relative timings, as the service reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    #[serde(rename = "word")]
    pub text: String,
    /// Seconds from the start of the submitted payload
    pub start: f64,
    pub end: f64,
}

/// A transcript segment; only used to recover nested word timings
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Vec<WordTiming>,
}

/// Verbose transcription response: text plus word timings
#[derive(Debug, Clone, Deserialize)]
pub struct VerboseTranscript {
    pub text: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub words: Vec<WordTiming>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// Trait for transcription providers
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    /// Unique identifier for this provider (e.g., "groq")
    fn name(&self) -> &'static str;

    /// Submit one payload and return the verbose transcript
    async fn transcribe(
        &self,
        client: &reqwest::Client,
        api_key: &str,
        request: TranscriptionRequest,
    ) -> Result<VerboseTranscript, ServiceError>;
}

/// Advisory API key format check.
///
/// The authoritative check is the service's response; this only catches
/// obvious paste mistakes early. Groq keys start with `gsk_`.
pub fn validate_api_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("API key is empty".to_string());
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(format!(
            "Invalid key format. Keys start with '{API_KEY_PREFIX}'"
        ));
    }
    if key.len() < MIN_API_KEY_LEN {
        return Err("API key is too short".to_string());
    }
    Ok(())
}

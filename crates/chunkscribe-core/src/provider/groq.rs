//! Groq Whisper transcription provider
//!
//! Groq offers an OpenAI-compatible API running Whisper models on their
//! custom LPU hardware, with verbose JSON word timestamps.

use async_trait::async_trait;

use super::base::openai_compatible_transcribe;
use super::error::ServiceError;
use super::{TranscriptionBackend, TranscriptionRequest, VerboseTranscript};

const API_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

/// Groq Whisper transcription provider
#[derive(Debug, Default, Clone)]
pub struct GroqProvider;

#[async_trait]
impl TranscriptionBackend for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn transcribe(
        &self,
        client: &reqwest::Client,
        api_key: &str,
        request: TranscriptionRequest,
    ) -> Result<VerboseTranscript, ServiceError> {
        openai_compatible_transcribe(client, API_URL, api_key, request).await
    }
}

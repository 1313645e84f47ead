//! Shared implementation for OpenAI-compatible transcription APIs.
//!
//! Providers in this family take a multipart form upload with `model`
//! and `file` fields, authorize via `Bearer` token, and return verbose
//! JSON with word-level timestamps when asked:
//! - `response_format = verbose_json`
//! - `timestamp_granularities[] = word`

use super::super::error::ServiceError;
use super::super::{TranscriptionRequest, VerboseTranscript};

/// Transcribe audio using an OpenAI-compatible API.
///
/// # Parameters
/// - `client`: Shared reqwest client for connection pooling
/// - `api_url`: The API endpoint URL
/// - `api_key`: Bearer token for authentication
/// - `request`: Audio bytes, model, and options
pub(crate) async fn openai_compatible_transcribe(
    client: &reqwest::Client,
    api_url: &str,
    api_key: &str,
    request: TranscriptionRequest,
) -> Result<VerboseTranscript, ServiceError> {
    let mut form = reqwest::multipart::Form::new()
        .text("model", request.model.clone())
        .text("response_format", "verbose_json")
        .text("timestamp_granularities[]", "word")
        .part(
            "file",
            reqwest::multipart::Part::bytes(request.audio_data.clone())
                .file_name(request.filename.clone())
                .mime_str(&request.mime_type)
                .map_err(|e| ServiceError::Network(format!("Invalid mime type: {e}")))?,
        );

    if let Some(lang) = request.language.clone() {
        form = form.text("language", lang);
    }

    let response = client
        .post(api_url)
        .header("Authorization", format!("Bearer {api_key}"))
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Http {
            status: status.as_u16(),
            message: error_message_from_body(&body),
        });
    }

    let body = response.text().await?;
    let mut transcript: VerboseTranscript = serde_json::from_str(&body)
        .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

    // whisper.cpp-style servers nest words inside segments and leave
    // the top level empty; normalize to top-level words
    if transcript.words.is_empty() {
        transcript.words = transcript
            .segments
            .iter()
            .flat_map(|s| s.words.iter().cloned())
            .collect();
    }

    Ok(transcript)
}

/// Pull the human-readable message out of an error body.
///
/// Service errors carry a JSON body whose `error.message` is preferred
/// for display; anything else falls back to the raw body.
pub(crate) fn error_message_from_body(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_nested_message() {
        let body = r#"{"error":{"message":"Invalid file format.","type":"invalid_request_error"}}"#;
        assert_eq!(error_message_from_body(body), "Invalid file format.");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(error_message_from_body("upstream exploded"), "upstream exploded");
        assert_eq!(error_message_from_body("  "), "Unknown error");
    }

    #[test]
    fn test_verbose_json_parses_words() {
        let body = r#"{
            "text": "hello world",
            "duration": 1.5,
            "language": "english",
            "words": [
                {"word": "hello", "start": 0.0, "end": 0.6},
                {"word": "world", "start": 0.7, "end": 1.4}
            ]
        }"#;
        let transcript: VerboseTranscript = serde_json::from_str(body).unwrap();
        assert_eq!(transcript.text, "hello world");
        assert_eq!(transcript.words.len(), 2);
        assert_eq!(transcript.words[0].text, "hello");
        assert_eq!(transcript.duration, Some(1.5));
        assert_eq!(transcript.language.as_deref(), Some("english"));
    }

    #[test]
    fn test_words_flattened_from_segments() {
        let body = r#"{
            "text": "hello world",
            "segments": [
                {"start": 0.0, "end": 1.5, "text": "hello world", "words": [
                    {"word": "hello", "start": 0.0, "end": 0.6},
                    {"word": "world", "start": 0.7, "end": 1.4}
                ]}
            ]
        }"#;
        let mut transcript: VerboseTranscript = serde_json::from_str(body).unwrap();
        if transcript.words.is_empty() {
            transcript.words = transcript
                .segments
                .iter()
                .flat_map(|s| s.words.iter().cloned())
                .collect();
        }
        assert_eq!(transcript.words.len(), 2);
    }

    #[test]
    fn test_missing_words_defaults_empty() {
        let transcript: VerboseTranscript =
            serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(transcript.words.is_empty());
        assert_eq!(transcript.duration, None);
    }
}

//! Configuration surface for a transcription run
//!
//! One flat record enumerates every tunable the pipeline consumes:
//! planner geometry, silence detection, payload limits, timeouts, retry
//! behavior, and pacing. Defaults are defined as constants so the CLI
//! and tests reference the same values.

use serde::{Deserialize, Serialize};

use crate::dispatch::RetryPolicy;
use crate::error::{ChunkscribeError, Result};

/// Default target logical chunk size (seconds)
pub const DEFAULT_CHUNK_LENGTH_SECS: f64 = 600.0;

/// Default per-side extension into the neighboring chunk (seconds)
pub const DEFAULT_OVERLAP_SECS: f64 = 10.0;

/// Default probe search half-width around each ideal cut (seconds)
pub const DEFAULT_SILENCE_WINDOW_SECS: f64 = 30.0;

/// A 50 ms analysis frame is "silent" when its RMS is below this
pub const DEFAULT_RMS_THRESHOLD: f32 = 0.01;

/// Minimum run length for a frame sequence to count as a silence (ms)
pub const DEFAULT_MIN_SILENCE_DURATION_MS: f64 = 300.0;

/// Default per-payload byte ceiling (25 MiB)
pub const DEFAULT_MAX_CHUNK_BYTES: u64 = 25 * 1024 * 1024;

/// Default single-attempt timeout (ms)
pub const DEFAULT_PER_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Default quiescent pause between chunks (ms)
pub const DEFAULT_INTER_CHUNK_DELAY_MS: u64 = 500;

/// Default transcription model
pub const DEFAULT_MODEL: &str = "whisper-large-v3";

/// Configuration for a full transcription run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeConfig {
    /// Target logical chunk size in seconds
    pub chunk_length_seconds: f64,
    /// Per-side extension into the neighboring chunk, in seconds (0 disables overlap)
    pub overlap_seconds: f64,
    /// Probe search half-width around each ideal cut, in seconds
    pub silence_window_seconds: f64,
    /// RMS threshold below which an analysis frame counts as silent
    pub rms_threshold: f32,
    /// Minimum silence run length in milliseconds
    pub min_silence_duration_ms: f64,
    /// Per-payload byte ceiling
    pub max_chunk_bytes: u64,
    /// Single-attempt timeout in milliseconds
    pub per_request_timeout_ms: u64,
    /// Quiescent pause between chunks in milliseconds
    pub inter_chunk_delay_ms: u64,
    /// Retry behavior for retryable service errors
    pub retry: RetryPolicy,
    /// Model name sent to the transcription service
    pub model: String,
    /// Optional language hint (ISO-639-1 code, e.g. "en", "de")
    pub language: Option<String>,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            chunk_length_seconds: DEFAULT_CHUNK_LENGTH_SECS,
            overlap_seconds: DEFAULT_OVERLAP_SECS,
            silence_window_seconds: DEFAULT_SILENCE_WINDOW_SECS,
            rms_threshold: DEFAULT_RMS_THRESHOLD,
            min_silence_duration_ms: DEFAULT_MIN_SILENCE_DURATION_MS,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            per_request_timeout_ms: DEFAULT_PER_REQUEST_TIMEOUT_MS,
            inter_chunk_delay_ms: DEFAULT_INTER_CHUNK_DELAY_MS,
            retry: RetryPolicy::default(),
            model: DEFAULT_MODEL.to_string(),
            language: None,
        }
    }
}

impl TranscribeConfig {
    /// Validate the configuration, rejecting values the planner cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.chunk_length_seconds > 0.0) {
            return Err(ChunkscribeError::config(format!(
                "chunk_length_seconds must be positive, got {}",
                self.chunk_length_seconds
            )));
        }
        if self.overlap_seconds < 0.0 {
            return Err(ChunkscribeError::config(format!(
                "overlap_seconds must not be negative, got {}",
                self.overlap_seconds
            )));
        }
        if !(self.silence_window_seconds > 0.0) {
            return Err(ChunkscribeError::config(format!(
                "silence_window_seconds must be positive, got {}",
                self.silence_window_seconds
            )));
        }
        if !(self.rms_threshold > 0.0) {
            return Err(ChunkscribeError::config(format!(
                "rms_threshold must be positive, got {}",
                self.rms_threshold
            )));
        }
        if self.min_silence_duration_ms < 0.0 {
            return Err(ChunkscribeError::config(format!(
                "min_silence_duration_ms must not be negative, got {}",
                self.min_silence_duration_ms
            )));
        }
        if self.retry.multiplier < 1.0 {
            return Err(ChunkscribeError::config(format!(
                "retry.multiplier must be at least 1, got {}",
                self.retry.multiplier
            )));
        }
        if self.model.is_empty() {
            return Err(ChunkscribeError::config("model must not be empty"));
        }
        Ok(())
    }
}

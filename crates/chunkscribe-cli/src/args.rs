use clap::{Parser, ValueHint};
use std::path::PathBuf;

use chunkscribe_core::TranscribeConfig;

/// Transcribe long audio recordings by chunking them at silences,
/// sending each chunk to the transcription service, and merging the
/// word-timed results back into one transcript.
#[derive(Parser)]
#[command(name = "chunkscribe", version, about)]
pub struct Cli {
    /// WAV file to transcribe
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Language hint (ISO-639-1 code, e.g., "en", "de"); auto-detect when omitted
    #[arg(short, long)]
    pub language: Option<String>,

    /// Model name sent to the transcription service
    #[arg(short, long)]
    pub model: Option<String>,

    /// Target logical chunk length in seconds
    #[arg(long, value_name = "SECS")]
    pub chunk_length: Option<f64>,

    /// Per-side overlap into neighboring chunks in seconds (0 disables)
    #[arg(long, value_name = "SECS")]
    pub overlap: Option<f64>,

    /// API key (defaults to the GROQ_API_KEY environment variable)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Print the chunk plan and exit without contacting the service
    #[arg(long)]
    pub plan_only: bool,

    /// Emit the transcript, words, and diagnostics as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration, applying CLI overrides to defaults
    pub fn to_config(&self) -> TranscribeConfig {
        let mut config = TranscribeConfig::default();
        if let Some(chunk_length) = self.chunk_length {
            config.chunk_length_seconds = chunk_length;
        }
        if let Some(overlap) = self.overlap {
            config.overlap_seconds = overlap;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        config.language = self.language.clone();
        config
    }
}

//! CLI error display with helpful hints and actionable messages

use chunkscribe_core::{AudioError, ChunkscribeError, ServiceError};

/// Display an error to stderr with contextual hints for resolution
pub fn display_error(err: &anyhow::Error) {
    match err.downcast_ref::<ChunkscribeError>() {
        Some(ChunkscribeError::Audio(AudioError::DecodeFailed(msg))) => {
            eprintln!("Error: Failed to decode audio file");
            eprintln!("{}", msg);
            eprintln!();
            eprintln!("Hint: chunkscribe reads WAV files. Convert other formats first:");
            eprintln!("  ffmpeg -i input.mp3 output.wav");
        }

        Some(ChunkscribeError::Audio(AudioError::UnsupportedFormat(msg))) => {
            eprintln!("Error: Unsupported audio format");
            eprintln!("{}", msg);
            eprintln!();
            eprintln!("Hint: Re-encode as 16-bit PCM WAV:");
            eprintln!("  ffmpeg -i input.wav -c:a pcm_s16le output.wav");
        }

        Some(ChunkscribeError::Audio(AudioError::PayloadTooLarge { bytes, limit })) => {
            eprintln!("Error: A chunk payload would be too large for the service");
            eprintln!("{} bytes (limit {})", bytes, limit);
            eprintln!();
            eprintln!("Hint: Use a shorter chunk length:");
            eprintln!("  chunkscribe --chunk-length 300 <file>");
        }

        Some(ChunkscribeError::Config(msg)) => {
            eprintln!("Error: Configuration error");
            eprintln!("{}", msg);
            eprintln!();
            eprintln!("Hint: Run with --help to see valid option ranges");
        }

        Some(ChunkscribeError::Service(ServiceError::Http { status, message }))
            if *status == 401 || *status == 403 =>
        {
            eprintln!("Error: Authentication failed ({})", status);
            eprintln!("{}", message);
            eprintln!();
            eprintln!("Hint: Check your API key at:");
            eprintln!("  https://console.groq.com/keys");
        }

        Some(ChunkscribeError::Service(err)) => {
            eprintln!("Error: Transcription service error");
            eprintln!("{}", err);
            eprintln!();
            eprintln!("Hint: Common causes:");
            eprintln!("  - Network connectivity issues");
            eprintln!("  - API service temporarily unavailable");
        }

        Some(ChunkscribeError::Cancelled) => {
            eprintln!("Cancelled.");
        }

        _ => {
            eprintln!("Error: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("Caused by: {}", cause);
            }
        }
    }
}

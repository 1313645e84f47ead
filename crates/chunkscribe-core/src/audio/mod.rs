//! Audio decode, probe, and extraction
//!
//! # Architecture
//!
//! ```text
//! WavSource (seekable, windowed decode)
//!   ├── WavProbe     - duration, silences, waveform summary
//!   └── WavExtractor - chunk payload re-encode
//! ```
//!
//! The planner and dispatcher depend only on the `AudioProbe` and
//! `ChunkExtractor` traits; the WAV-backed implementations are the
//! default concrete decoders.

pub mod error;
pub mod extractor;
pub mod probe;
pub mod source;

pub use error::AudioError;
pub use extractor::{AudioPayload, ChunkExtractor, WavExtractor};
pub use probe::{AudioProbe, Silence, WavProbe};
pub use source::WavSource;

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    /// Write a 16-bit PCM WAV into the temp dir with a unique name
    pub fn write_temp_wav(tag: &str, sample_rate: u32, channels: u16, samples: &[i16]) -> PathBuf {
        let unique_id = format!(
            "{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos(),
        );
        let path = std::env::temp_dir().join(format!("chunkscribe_{tag}_{unique_id}.wav"));

        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
        path
    }
}

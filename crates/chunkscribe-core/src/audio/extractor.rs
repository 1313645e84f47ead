//! Chunk extraction: decode a chunk's actual range into a payload
//!
//! Each extraction decodes the sample range `[floor(actual_start * sr),
//! ceil(actual_end * sr))` and re-emits it as 16-bit linear PCM WAV, so
//! the payload is self-contained and free of codec frame-boundary
//! artifacts. A fresh decoder is opened per extraction and released
//! before returning, on success and failure paths alike.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::error::AudioError;
use super::source::WavSource;
use crate::plan::Chunk;

/// WAV container overhead added on top of the raw sample data
const WAV_HEADER_BYTES: u64 = 44;

/// A self-contained audio payload ready for upload
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// Produces a payload for a chunk's actual range
pub trait ChunkExtractor {
    fn extract(&mut self, chunk: &Chunk) -> Result<AudioPayload, AudioError>;
}

/// Extractor that re-encodes WAV sample ranges as 16-bit PCM
pub struct WavExtractor {
    path: PathBuf,
    max_bytes: u64,
}

impl WavExtractor {
    pub fn new(path: impl AsRef<Path>, max_bytes: u64) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_bytes,
        }
    }
}

impl ChunkExtractor for WavExtractor {
    fn extract(&mut self, chunk: &Chunk) -> Result<AudioPayload, AudioError> {
        let mut source = WavSource::open(&self.path)?;
        let sr = f64::from(source.sample_rate());
        let channels = source.channels();

        let start_frame = ((chunk.actual_start * sr).floor() as u32).min(source.total_frames());
        let end_frame = ((chunk.actual_end * sr).ceil() as u32).min(source.total_frames());
        if end_frame <= start_frame {
            return Err(AudioError::InvalidRange(format!(
                "chunk {} covers no samples ({:.3}s..{:.3}s)",
                chunk.index, chunk.actual_start, chunk.actual_end
            )));
        }

        // Size check before decoding, so oversized chunks fail cheaply
        let estimated =
            u64::from(end_frame - start_frame) * u64::from(channels) * 2 + WAV_HEADER_BYTES;
        if estimated > self.max_bytes {
            return Err(AudioError::PayloadTooLarge {
                bytes: estimated,
                limit: self.max_bytes,
            });
        }

        let samples = source.read_frames(start_frame, end_frame)?;

        let spec = hound::WavSpec {
            channels,
            sample_rate: source.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::with_capacity(estimated as usize));
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in samples {
                writer.write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
            }
            writer.finalize()?;
        }
        let data = cursor.into_inner();

        crate::verbose!(
            "Extracted chunk {} ({:.1}s, {:.1} KB)",
            chunk.index,
            chunk.actual_len(),
            data.len() as f64 / 1024.0
        );

        Ok(AudioPayload {
            data,
            filename: format!("chunk_{:03}.wav", chunk.index),
            mime_type: "audio/wav".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::test_support::write_temp_wav;
    use crate::plan::CutKind;

    fn chunk(actual_start: f64, actual_end: f64) -> Chunk {
        Chunk {
            index: 0,
            logical_start: actual_start,
            logical_end: actual_end,
            actual_start,
            actual_end,
            cut_kind: CutKind::End,
        }
    }

    #[test]
    fn test_payload_covers_exact_sample_range() {
        let sr = 16_000u32;
        let path = write_temp_wav("extract_range", sr, 1, &vec![4_000i16; sr as usize * 4]);
        let mut extractor = WavExtractor::new(&path, 25 * 1024 * 1024);

        let payload = extractor.extract(&chunk(1.0, 2.5)).unwrap();
        assert_eq!(payload.mime_type, "audio/wav");
        assert_eq!(payload.filename, "chunk_000.wav");

        // Decode the payload back and count samples: exactly 1.5s worth
        let reader = hound::WavReader::new(Cursor::new(payload.data)).unwrap();
        assert_eq!(reader.spec().sample_rate, sr);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.duration(), (1.5 * sr as f64) as u32);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_range_clamped_to_file_end() {
        let sr = 8_000u32;
        let path = write_temp_wav("extract_clamp", sr, 1, &vec![1_000i16; sr as usize * 2]);
        let mut extractor = WavExtractor::new(&path, 25 * 1024 * 1024);

        let payload = extractor.extract(&chunk(1.0, 5.0)).unwrap();
        let reader = hound::WavReader::new(Cursor::new(payload.data)).unwrap();
        assert_eq!(reader.duration(), sr);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_oversized_chunk_is_rejected_before_decode() {
        let sr = 16_000u32;
        let path = write_temp_wav("extract_too_big", sr, 1, &vec![1_000i16; sr as usize * 2]);
        // 2s of 16-bit mono is 64KB; cap at 1KB
        let mut extractor = WavExtractor::new(&path, 1024);

        match extractor.extract(&chunk(0.0, 2.0)) {
            Err(AudioError::PayloadTooLarge { bytes, limit }) => {
                assert!(bytes > limit);
                assert_eq!(limit, 1024);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_empty_range_is_rejected() {
        let sr = 8_000u32;
        let path = write_temp_wav("extract_empty", sr, 1, &vec![1_000i16; sr as usize]);
        let mut extractor = WavExtractor::new(&path, 25 * 1024 * 1024);

        assert!(matches!(
            extractor.extract(&chunk(0.5, 0.5)),
            Err(AudioError::InvalidRange(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_stereo_payload_keeps_channel_count() {
        let sr = 8_000u32;
        let mut samples = Vec::new();
        for _ in 0..sr as usize {
            samples.push(3_000i16);
            samples.push(-3_000i16);
        }
        let path = write_temp_wav("extract_stereo", sr, 2, &samples);
        let mut extractor = WavExtractor::new(&path, 25 * 1024 * 1024);

        let payload = extractor.extract(&chunk(0.0, 1.0)).unwrap();
        let reader = hound::WavReader::new(Cursor::new(payload.data)).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.duration(), sr);

        let _ = std::fs::remove_file(&path);
    }
}

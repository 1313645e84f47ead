//! Seekable WAV file source
//!
//! Wraps a `hound` reader so the probe and extractor can decode small
//! time windows without pulling the whole file into memory. Peak memory
//! for any operation is O(window), not O(file).

use std::io::BufReader;
use std::path::Path;

use super::error::AudioError;

/// A WAV file opened for windowed decoding
pub struct WavSource {
    reader: hound::WavReader<BufReader<std::fs::File>>,
    spec: hound::WavSpec,
    total_frames: u32,
}

impl WavSource {
    /// Open a WAV file for reading
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let reader = hound::WavReader::open(path)
            .map_err(|e| AudioError::decode_failed(format!("{}: {e}", path.display())))?;
        let spec = reader.spec();
        let total_frames = reader.duration();
        if spec.sample_rate == 0 || spec.channels == 0 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{} channels at {} Hz",
                spec.channels, spec.sample_rate
            )));
        }
        Ok(Self {
            reader,
            spec,
            total_frames,
        })
    }

    /// Samples per second, per channel
    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    /// Interleaved channel count
    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    /// Total playable duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        f64::from(self.total_frames) / f64::from(self.spec.sample_rate)
    }

    /// Total number of inter-channel frames
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Decode the frame range `[start_frame, end_frame)` as interleaved
    /// f32 samples normalized to [-1, 1]. The range is clamped to the file.
    pub fn read_frames(
        &mut self,
        start_frame: u32,
        end_frame: u32,
    ) -> Result<Vec<f32>, AudioError> {
        let start = start_frame.min(self.total_frames);
        let end = end_frame.min(self.total_frames);
        if end <= start {
            return Ok(Vec::new());
        }

        self.reader
            .seek(start)
            .map_err(|e| AudioError::decode_failed(format!("seek failed: {e}")))?;

        let wanted = (end - start) as usize * self.spec.channels as usize;
        let mut samples = Vec::with_capacity(wanted);

        match self.spec.sample_format {
            hound::SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(wanted) {
                    samples.push(sample?);
                }
            }
            hound::SampleFormat::Int => {
                let scale = (1i64 << (self.spec.bits_per_sample - 1)) as f32;
                for sample in self.reader.samples::<i32>().take(wanted) {
                    samples.push(sample? as f32 / scale);
                }
            }
        }

        Ok(samples)
    }

    /// Decode the time window `[start, end)` (seconds) downmixed to mono
    /// by averaging channels. The window is clamped to the file.
    pub fn read_window_mono(&mut self, start: f64, end: f64) -> Result<Vec<f32>, AudioError> {
        let sr = f64::from(self.spec.sample_rate);
        let start_frame = (start.max(0.0) * sr).floor() as u32;
        let end_frame = (end.max(0.0) * sr).ceil() as u32;
        let interleaved = self.read_frames(start_frame, end_frame)?;

        let channels = self.spec.channels as usize;
        if channels == 1 {
            return Ok(interleaved);
        }

        let mono = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
        Ok(mono)
    }
}

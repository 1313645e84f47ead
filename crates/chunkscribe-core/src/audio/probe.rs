//! Audio probing: duration, silence regions, waveform summary
//!
//! All operations are pure with respect to the file bytes and decode
//! only the time window they are asked about. The planner consumes
//! probes through the `AudioProbe` trait so it can be tested with
//! scripted silences.

use super::error::AudioError;
use super::source::WavSource;

/// RMS analysis frame length in milliseconds
const ANALYSIS_FRAME_MS: f64 = 50.0;

/// Files longer than this use the sampled waveform strategy (seconds)
const WAVEFORM_SAMPLED_THRESHOLD_SECS: f64 = 600.0;

/// Snippet length decoded per waveform point in sampled mode (seconds)
const WAVEFORM_SNIPPET_SECS: f64 = 0.5;

/// A detected quiet region inside an analyzed window
///
/// Times are absolute file positions in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Silence {
    pub start: f64,
    pub end: f64,
    pub duration_ms: f64,
    pub midpoint: f64,
}

/// Probe operations the chunk planner relies on
pub trait AudioProbe {
    /// Total playable duration in seconds
    fn duration(&mut self) -> Result<f64, AudioError>;

    /// Detect silences inside the window centered on `center`
    ///
    /// Only the window `[max(0, center - window/2), min(duration,
    /// center + window/2)]` is decoded. RMS is computed over fixed 50 ms
    /// non-overlapping frames; a contiguous run of frames strictly below
    /// `rms_threshold` becomes a `Silence` when its span reaches
    /// `min_silence_ms`.
    fn silences_in_window(
        &mut self,
        center: f64,
        window_seconds: f64,
        rms_threshold: f32,
        min_silence_ms: f64,
    ) -> Result<Vec<Silence>, AudioError>;

    /// Peak-amplitude summary with `num_points` entries in [0, 1]
    fn waveform(&mut self, num_points: usize) -> Result<Vec<f32>, AudioError>;
}

/// WAV-backed probe
pub struct WavProbe {
    source: WavSource,
}

impl WavProbe {
    /// Open a WAV file for probing
    pub fn open(path: &std::path::Path) -> Result<Self, AudioError> {
        Ok(Self {
            source: WavSource::open(path)?,
        })
    }

    /// Wrap an already-open source
    pub fn from_source(source: WavSource) -> Self {
        Self { source }
    }
}

impl AudioProbe for WavProbe {
    fn duration(&mut self) -> Result<f64, AudioError> {
        Ok(self.source.duration_seconds())
    }

    fn silences_in_window(
        &mut self,
        center: f64,
        window_seconds: f64,
        rms_threshold: f32,
        min_silence_ms: f64,
    ) -> Result<Vec<Silence>, AudioError> {
        let duration = self.source.duration_seconds();
        let window_start = (center - window_seconds / 2.0).max(0.0);
        let window_end = (center + window_seconds / 2.0).min(duration);
        if window_end <= window_start {
            return Ok(Vec::new());
        }

        let samples = self.source.read_window_mono(window_start, window_end)?;
        let frame_len = (self.source.sample_rate() as f64 * ANALYSIS_FRAME_MS / 1000.0) as usize;
        if frame_len == 0 {
            return Ok(Vec::new());
        }

        let frame_secs = ANALYSIS_FRAME_MS / 1000.0;
        let mut silences = Vec::new();
        let mut run_start: Option<usize> = None;

        let mut flush = |run_start: &mut Option<usize>, frame_index: usize| {
            if let Some(first) = run_start.take() {
                let start = window_start + first as f64 * frame_secs;
                let end = window_start + frame_index as f64 * frame_secs;
                let duration_ms = (end - start) * 1000.0;
                if duration_ms >= min_silence_ms {
                    silences.push(Silence {
                        start,
                        end,
                        duration_ms,
                        midpoint: (start + end) / 2.0,
                    });
                }
            }
        };

        let mut frame_count = 0;
        for (i, frame) in samples.chunks_exact(frame_len).enumerate() {
            frame_count = i + 1;
            let rms = root_mean_square(frame);
            if rms < rms_threshold {
                run_start.get_or_insert(i);
            } else {
                flush(&mut run_start, i);
            }
        }
        flush(&mut run_start, frame_count);

        Ok(silences)
    }

    fn waveform(&mut self, num_points: usize) -> Result<Vec<f32>, AudioError> {
        if num_points == 0 {
            return Ok(Vec::new());
        }

        let total_frames = self.source.total_frames() as u64;
        let duration = self.source.duration_seconds();
        let sampled = duration > WAVEFORM_SAMPLED_THRESHOLD_SECS;
        let snippet_frames =
            (WAVEFORM_SNIPPET_SECS * f64::from(self.source.sample_rate())) as u64;

        let mut points = Vec::with_capacity(num_points);
        for i in 0..num_points {
            let bucket_start = total_frames * i as u64 / num_points as u64;
            let bucket_end = total_frames * (i as u64 + 1) / num_points as u64;
            // Long files: decode a fixed snippet per point instead of the
            // whole bucket, keeping peak memory O(snippet)
            let read_end = if sampled {
                bucket_end.min(bucket_start + snippet_frames)
            } else {
                bucket_end
            };
            let samples = self
                .source
                .read_frames(bucket_start as u32, read_end as u32)?;
            let peak = samples
                .iter()
                .fold(0.0f32, |acc, s| acc.max(s.abs()))
                .min(1.0);
            points.push(peak);
        }

        Ok(points)
    }
}

fn root_mean_square(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum: f32 = frame.iter().map(|s| s * s).sum();
    (sum / frame.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::test_support::write_temp_wav;

    const SR: u32 = 16_000;
    const TONE: i16 = 8_000;

    fn tone_silence_tone(tone_secs: usize, gap_secs: f64) -> Vec<i16> {
        let mut samples = Vec::new();
        samples.extend(vec![TONE; SR as usize * tone_secs]);
        samples.extend(vec![0i16; (f64::from(SR) * gap_secs) as usize]);
        samples.extend(vec![TONE; SR as usize * tone_secs]);
        samples
    }

    #[test]
    fn test_duration() {
        let path = write_temp_wav("probe_duration", SR, 1, &vec![0i16; SR as usize * 3]);
        let mut probe = WavProbe::open(&path).unwrap();
        assert!((probe.duration().unwrap() - 3.0).abs() < 1e-9);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_detects_silence_gap() {
        // 2s tone, 1s silence, 2s tone
        let path = write_temp_wav("probe_gap", SR, 1, &tone_silence_tone(2, 1.0));
        let mut probe = WavProbe::open(&path).unwrap();
        let silences = probe.silences_in_window(2.5, 5.0, 0.01, 300.0).unwrap();

        assert_eq!(silences.len(), 1);
        let silence = &silences[0];
        assert!((silence.start - 2.0).abs() < 0.06, "start {}", silence.start);
        assert!((silence.end - 3.0).abs() < 0.06, "end {}", silence.end);
        assert!(silence.duration_ms >= 900.0);
        assert!((silence.midpoint - 2.5).abs() < 0.06);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_short_gap_below_minimum_is_ignored() {
        // 100ms gap, 300ms minimum
        let path = write_temp_wav("probe_short_gap", SR, 1, &tone_silence_tone(1, 0.1));
        let mut probe = WavProbe::open(&path).unwrap();
        let silences = probe.silences_in_window(1.0, 2.0, 0.01, 300.0).unwrap();
        assert!(silences.is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_silence_times_are_absolute() {
        // Gap sits at [4.0, 4.5]; window starts well after 0
        let mut samples = vec![TONE; SR as usize * 4];
        samples.extend(vec![0i16; SR as usize / 2]);
        samples.extend(vec![TONE; SR as usize * 2]);
        let path = write_temp_wav("probe_absolute", SR, 1, &samples);
        let mut probe = WavProbe::open(&path).unwrap();
        let silences = probe.silences_in_window(4.25, 3.0, 0.01, 300.0).unwrap();

        assert_eq!(silences.len(), 1);
        assert!((silences[0].start - 4.0).abs() < 0.06);
        assert!((silences[0].end - 4.5).abs() < 0.06);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_silence_run_ending_at_window_edge() {
        // File ends in silence; the trailing run must still be flushed
        let mut samples = vec![TONE; SR as usize];
        samples.extend(vec![0i16; SR as usize]);
        let path = write_temp_wav("probe_trailing", SR, 1, &samples);
        let mut probe = WavProbe::open(&path).unwrap();
        let silences = probe.silences_in_window(1.0, 2.0, 0.01, 300.0).unwrap();

        assert_eq!(silences.len(), 1);
        assert!((silences[0].end - 2.0).abs() < 0.06);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_waveform_len_and_bounds() {
        let path = write_temp_wav("probe_waveform", SR, 1, &tone_silence_tone(1, 1.0));
        let mut probe = WavProbe::open(&path).unwrap();
        let points = probe.waveform(12).unwrap();

        assert_eq!(points.len(), 12);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(p)));
        // Tone sections should register clearly above the silent middle
        assert!(points[0] > 0.2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_waveform_zero_points() {
        let path = write_temp_wav("probe_waveform_zero", SR, 1, &vec![TONE; SR as usize]);
        let mut probe = WavProbe::open(&path).unwrap();
        assert!(probe.waveform(0).unwrap().is_empty());
        let _ = std::fs::remove_file(&path);
    }
}

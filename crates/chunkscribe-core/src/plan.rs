//! Silence-guided chunk planning
//!
//! Converts (duration, config) into an ordered list of chunks whose
//! logical boundaries tile the file exactly and whose actual boundaries
//! extend into both neighbors by the configured overlap. Cut points are
//! chosen inside quiet regions when the probe finds any, so no word is
//! severed at a boundary.
//!
//! Two passes:
//! 1. Walk the file in `chunk_length_seconds` steps, asking the probe
//!    for silences around each ideal cut and scoring the candidates.
//! 2. Materialize chunks for each adjacent cut pair, extending the
//!    actual range by `overlap_seconds` on interior sides.

use serde::Serialize;

use crate::audio::{AudioProbe, Silence};
use crate::config::TranscribeConfig;
use crate::error::{ChunkscribeError, Result};

/// How a chunk's trailing logical boundary was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CutKind {
    /// Interior cut placed at a detected silence midpoint
    Silence,
    /// Interior cut placed exactly at the ideal position (no silence found)
    Exact,
    /// The terminal edge of the file
    End,
}

/// An immutable plan record: one chunk of the file
///
/// Logical boundaries tile the file without gaps; actual boundaries are
/// a superset of the logical span and define the extraction range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    /// 0-based, dense, strictly increasing across the plan
    pub index: usize,
    /// Start of the logical span (seconds)
    pub logical_start: f64,
    /// End of the logical span (seconds)
    pub logical_end: f64,
    /// Start of the extraction span; `actual_start <= logical_start`
    pub actual_start: f64,
    /// End of the extraction span; `actual_end >= logical_end`
    pub actual_end: f64,
    /// How the trailing logical boundary was chosen
    pub cut_kind: CutKind,
}

impl Chunk {
    /// Seconds of audio before `logical_start` included in the extraction
    pub fn leading_overlap(&self) -> f64 {
        self.logical_start - self.actual_start
    }

    /// Seconds of audio after `logical_end` included in the extraction
    pub fn trailing_overlap(&self) -> f64 {
        self.actual_end - self.logical_end
    }

    /// Length of the logical span in seconds
    pub fn logical_len(&self) -> f64 {
        self.logical_end - self.logical_start
    }

    /// Length of the extraction span in seconds
    pub fn actual_len(&self) -> f64 {
        self.actual_end - self.actual_start
    }
}

/// Ideal cuts landing within this distance of the file end are
/// absorbed into the final chunk instead of producing a sliver
const TERMINAL_GUARD_SECS: f64 = 1.0;

/// Plan chunks for the probed file
///
/// Probe failures while searching a window degrade to an exact cut for
/// that window only; planning itself never retries and never aborts for
/// a silence-detection error. `progress` receives a monotonic
/// percentage in [0, 100].
pub fn plan(
    probe: &mut dyn AudioProbe,
    config: &TranscribeConfig,
    progress: Option<&dyn Fn(f64)>,
) -> Result<Vec<Chunk>> {
    config.validate()?;

    let duration = probe.duration()?;
    if !(duration > 0.0) {
        return Err(ChunkscribeError::config(format!(
            "file has no playable duration ({duration} s)"
        )));
    }

    let report = |pct: f64| {
        if let Some(sink) = progress {
            sink(pct.clamp(0.0, 100.0));
        }
    };
    report(0.0);

    // Pass 1: locate interior cut points
    let mut cuts: Vec<(f64, CutKind)> = Vec::new();
    let mut last_cut = 0.0;
    loop {
        let ideal = (last_cut + config.chunk_length_seconds).min(duration);
        if ideal >= duration - TERMINAL_GUARD_SECS {
            break;
        }

        // Probe errors for this window degrade to "no silences found"
        let silences = probe
            .silences_in_window(
                ideal,
                config.silence_window_seconds,
                config.rms_threshold,
                config.min_silence_duration_ms,
            )
            .unwrap_or_else(|err| {
                crate::verbose!("Silence probe failed near {ideal:.1}s, cutting exact: {err}");
                Vec::new()
            });

        let (cut, kind) = match best_silence(&silences, ideal, last_cut, duration) {
            Some(silence) => (silence.midpoint, CutKind::Silence),
            None => (ideal, CutKind::Exact),
        };
        cuts.push((cut, kind));
        last_cut = cut;

        // Pass 1 reports the 0-50% range, pass 2 the rest
        report(50.0 * last_cut / duration);
    }
    report(50.0);

    // Pass 2: materialize chunks with overlap
    let chunk_count = cuts.len() + 1;
    let mut chunks = Vec::with_capacity(chunk_count);
    let mut logical_start = 0.0;
    for index in 0..chunk_count {
        let (logical_end, cut_kind) = cuts.get(index).copied().unwrap_or((duration, CutKind::End));

        let actual_start = if index == 0 {
            0.0
        } else {
            (logical_start - config.overlap_seconds).max(0.0)
        };
        let actual_end = if index == chunk_count - 1 {
            duration
        } else {
            (logical_end + config.overlap_seconds).min(duration)
        };

        chunks.push(Chunk {
            index,
            logical_start,
            logical_end,
            actual_start,
            actual_end,
            cut_kind,
        });
        logical_start = logical_end;

        report(50.0 + 50.0 * (index + 1) as f64 / chunk_count as f64);
    }

    Ok(chunks)
}

/// Score candidates and pick the best silence for a cut near `ideal`
///
/// Score: silence length in ms, penalized by 100x the midpoint's
/// distance from the ideal cut in seconds. Strict comparison; on ties
/// the earlier candidate wins. Cuts must advance, so candidates at or
/// behind the previous cut (or at the file edge) are skipped.
fn best_silence<'a>(
    silences: &'a [Silence],
    ideal: f64,
    last_cut: f64,
    duration: f64,
) -> Option<&'a Silence> {
    let mut best: Option<(&Silence, f64)> = None;
    for silence in silences {
        if silence.midpoint <= last_cut || silence.midpoint >= duration {
            continue;
        }
        let score = silence.duration_ms - (silence.midpoint - ideal).abs() * 100.0;
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((silence, score));
        }
    }
    best.map(|(silence, _)| silence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioError;

    /// Probe with a fixed duration and a scripted silence list; windows
    /// report whichever scripted silences they overlap.
    struct MockProbe {
        duration: f64,
        silences: Vec<Silence>,
        fail_windows: bool,
    }

    impl MockProbe {
        fn new(duration: f64, silences: Vec<Silence>) -> Self {
            Self {
                duration,
                silences,
                fail_windows: false,
            }
        }

        fn silent_span(start: f64, end: f64) -> Silence {
            Silence {
                start,
                end,
                duration_ms: (end - start) * 1000.0,
                midpoint: (start + end) / 2.0,
            }
        }
    }

    impl AudioProbe for MockProbe {
        fn duration(&mut self) -> std::result::Result<f64, AudioError> {
            Ok(self.duration)
        }

        fn silences_in_window(
            &mut self,
            center: f64,
            window_seconds: f64,
            _rms_threshold: f32,
            _min_silence_ms: f64,
        ) -> std::result::Result<Vec<Silence>, AudioError> {
            if self.fail_windows {
                return Err(AudioError::decode_failed("scripted probe failure"));
            }
            let lo = (center - window_seconds / 2.0).max(0.0);
            let hi = (center + window_seconds / 2.0).min(self.duration);
            Ok(self
                .silences
                .iter()
                .filter(|s| s.end > lo && s.start < hi)
                .cloned()
                .collect())
        }

        fn waveform(&mut self, num_points: usize) -> std::result::Result<Vec<f32>, AudioError> {
            Ok(vec![0.0; num_points])
        }
    }

    fn config(chunk_length: f64, overlap: f64) -> TranscribeConfig {
        TranscribeConfig {
            chunk_length_seconds: chunk_length,
            overlap_seconds: overlap,
            ..Default::default()
        }
    }

    fn assert_plan_invariants(chunks: &[Chunk], duration: f64) {
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].logical_start, 0.0);
        assert_eq!(chunks.last().unwrap().logical_end, duration);
        assert_eq!(chunks[0].leading_overlap(), 0.0);
        assert_eq!(chunks.last().unwrap().trailing_overlap(), 0.0);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(chunk.logical_end > chunk.logical_start);
            assert!(chunk.actual_start >= 0.0 && chunk.actual_start <= chunk.logical_start);
            assert!(chunk.actual_end >= chunk.logical_end && chunk.actual_end <= duration);
            if i > 0 {
                assert_eq!(chunk.logical_start, chunks[i - 1].logical_end);
            }
        }
    }

    #[test]
    fn test_three_chunk_plan_with_silences() {
        // 30-minute file; silences whose midpoints land at 600.9 and 1199.9
        let mut probe = MockProbe::new(
            1800.0,
            vec![
                MockProbe::silent_span(600.3, 601.5),
                MockProbe::silent_span(1199.3, 1200.5),
            ],
        );
        let chunks = plan(&mut probe, &config(600.0, 10.0), None).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_plan_invariants(&chunks, 1800.0);

        assert!((chunks[0].logical_end - 600.9).abs() < 1e-9);
        assert!((chunks[1].logical_end - 1199.9).abs() < 1e-9);
        assert_eq!(chunks[0].cut_kind, CutKind::Silence);
        assert_eq!(chunks[1].cut_kind, CutKind::Silence);
        assert_eq!(chunks[2].cut_kind, CutKind::End);

        assert_eq!(chunks[0].actual_start, 0.0);
        assert!((chunks[0].actual_end - 610.9).abs() < 1e-9);
        assert!((chunks[1].actual_start - 590.9).abs() < 1e-9);
        assert!((chunks[1].actual_end - 1209.9).abs() < 1e-9);
        assert!((chunks[2].actual_start - 1189.9).abs() < 1e-9);
        assert_eq!(chunks[2].actual_end, 1800.0);
    }

    #[test]
    fn test_no_silence_falls_back_to_exact_cuts() {
        let mut probe = MockProbe::new(1800.0, Vec::new());
        let chunks = plan(&mut probe, &config(600.0, 10.0), None).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_plan_invariants(&chunks, 1800.0);
        assert_eq!(chunks[0].logical_end, 600.0);
        assert_eq!(chunks[1].logical_end, 1200.0);
        assert_eq!(chunks[0].cut_kind, CutKind::Exact);
        assert_eq!(chunks[1].cut_kind, CutKind::Exact);
        assert_eq!(chunks[2].cut_kind, CutKind::End);
    }

    #[test]
    fn test_short_file_is_one_chunk() {
        let mut probe = MockProbe::new(120.0, Vec::new());
        let chunks = plan(&mut probe, &config(600.0, 10.0), None).unwrap();

        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert_eq!(chunk.logical_start, 0.0);
        assert_eq!(chunk.logical_end, 120.0);
        assert_eq!(chunk.leading_overlap(), 0.0);
        assert_eq!(chunk.trailing_overlap(), 0.0);
        assert_eq!(chunk.cut_kind, CutKind::End);
    }

    #[test]
    fn test_probe_failure_degrades_to_exact_cut() {
        let mut probe = MockProbe::new(1800.0, Vec::new());
        probe.fail_windows = true;
        let chunks = plan(&mut probe, &config(600.0, 10.0), None).unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(
            chunks[..2]
                .iter()
                .all(|c| c.cut_kind == CutKind::Exact)
        );
    }

    #[test]
    fn test_longer_silence_wins_ties_to_earlier() {
        let mut probe = MockProbe::new(1200.0, Vec::new());
        probe.silences = vec![
            MockProbe::silent_span(595.0, 595.6),
            MockProbe::silent_span(604.4, 605.6),
        ];
        let chunks = plan(&mut probe, &config(600.0, 0.0), None).unwrap();
        // 1200ms - |605 - 600| * 100 = 700 beats 600ms - 470 = 130
        assert!((chunks[0].logical_end - 605.0).abs() < 1e-9);

        // Identical spans mirrored around the ideal: scores tie exactly,
        // earlier candidate wins
        let mut probe = MockProbe::new(1200.0, Vec::new());
        probe.silences = vec![
            MockProbe::silent_span(595.0, 596.0),
            MockProbe::silent_span(604.0, 605.0),
        ];
        let chunks = plan(&mut probe, &config(600.0, 0.0), None).unwrap();
        assert!((chunks[0].logical_end - 595.5).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_zero_disables_extension() {
        let mut probe = MockProbe::new(1800.0, Vec::new());
        let chunks = plan(&mut probe, &config(600.0, 0.0), None).unwrap();
        for chunk in &chunks {
            assert_eq!(chunk.actual_start, chunk.logical_start);
            assert_eq!(chunk.actual_end, chunk.logical_end);
        }
    }

    #[test]
    fn test_overlap_clamped_to_file_edges() {
        // Overlap larger than the first logical span must not go below 0
        let mut probe = MockProbe::new(30.0, Vec::new());
        let chunks = plan(&mut probe, &config(10.0, 15.0), None).unwrap();
        assert_plan_invariants(&chunks, 30.0);
    }

    #[test]
    fn test_progress_is_monotonic_and_completes() {
        let reported = std::cell::RefCell::new(Vec::new());
        let sink = |pct: f64| reported.borrow_mut().push(pct);

        let mut probe = MockProbe::new(3600.0, Vec::new());
        plan(&mut probe, &config(600.0, 10.0), Some(&sink)).unwrap();

        let reported = reported.into_inner();
        assert!(!reported.is_empty());
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert!(reported.iter().all(|p| (0.0..=100.0).contains(p)));
        assert_eq!(*reported.last().unwrap(), 100.0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut probe = MockProbe::new(1800.0, Vec::new());
        let result = plan(&mut probe, &config(0.0, 10.0), None);
        assert!(matches!(result, Err(ChunkscribeError::Config(_))));
    }

    #[test]
    fn test_cut_near_file_end_is_absorbed() {
        // Ideal cut lands within 1s of the end: no interior cut emitted
        let mut probe = MockProbe::new(600.5, Vec::new());
        let chunks = plan(&mut probe, &config(600.0, 10.0), None).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].cut_kind, CutKind::End);
    }
}

//! Transcript merging with timestamp-anchored deduplication
//!
//! Adjacent chunks share an overlap region, so boundary words appear in
//! both chunks' transcripts. The merger resolves each overlap by
//! keeping whichever chunk's words are more central to their own chunk:
//! the service had more context on both sides of those words, so their
//! transcription is the more trustworthy one.
//!
//! Word order within a chunk is preserved exactly as the service
//! returned it. The merger never sorts globally by timestamp; services
//! occasionally return slightly out-of-order word timings, and a global
//! sort would interleave words from different phrases.

use serde::Serialize;

use crate::dispatch::ChunkResult;
use crate::plan::Chunk;

/// Slack applied when slicing overlap word sets (seconds)
const OVERLAP_SLICE_TOLERANCE_SECS: f64 = 0.1;

/// Fraction of tokens compared on each side in the text-only fallback
const FALLBACK_WINDOW_FRACTION: f64 = 0.3;

/// Minimum matching run length before the fallback strips tokens
const FALLBACK_MIN_RUN: usize = 2;

/// One merged word with absolute file times
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedWord {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Counters describing what the merge did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeDiagnostics {
    /// Adjacent pairs whose word ranges actually overlapped
    pub overlaps_merged: usize,
    /// Total words discarded from non-authoritative overlap sets
    pub words_dropped: usize,
}

/// The merged transcript: text, absolute-timed words, diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct MergedTranscript {
    pub text: String,
    pub words: Vec<MergedWord>,
    pub diagnostics: MergeDiagnostics,
}

struct LiftedWord {
    text: String,
    abs_start: f64,
    abs_end: f64,
    centrality: f64,
}

struct LiftedChunk {
    words: Vec<LiftedWord>,
    /// Kept range `[keep_start, keep_end)` after overlap resolution
    keep_start: usize,
    keep_end: usize,
}

/// Merge per-chunk results into one transcript.
///
/// Only `Success` results with word timings participate in the
/// timestamped merge; if none exist, the text-only fallback runs over
/// whatever `Success` texts are present. Any subset of succeeded chunks
/// is tolerated.
pub fn merge(results: &[ChunkResult]) -> MergedTranscript {
    let mut lifted = lift(results);
    if lifted.is_empty() {
        return merge_text_only(results);
    }

    let mut diagnostics = MergeDiagnostics::default();

    // Resolve overlap between each adjacent pair in plan order
    for i in 0..lifted.len().saturating_sub(1) {
        let (earlier, later) = {
            let (head, tail) = lifted.split_at_mut(i + 1);
            (&mut head[i], &mut tail[0])
        };

        let Some(last_kept) = earlier.words[earlier.keep_start..earlier.keep_end].last() else {
            continue;
        };
        let Some(first_kept) = later.words[later.keep_start..later.keep_end].first() else {
            continue;
        };

        let ov_start = first_kept.abs_start;
        let ov_end = last_kept.abs_end;
        if ov_end <= ov_start {
            continue;
        }
        diagnostics.overlaps_merged += 1;

        // Earlier chunk's suffix inside the overlap region. A single
        // long boundary word can start before the window even though
        // its end produced the overlap; fall back to that literal word
        // so the pair is still resolved and no duplicate slips through.
        let tail_len = earlier.words[earlier.keep_start..earlier.keep_end]
            .iter()
            .rev()
            .take_while(|w| w.abs_start >= ov_start - OVERLAP_SLICE_TOLERANCE_SECS)
            .count()
            .max(1);
        // Later chunk's prefix inside the overlap region; never empty,
        // since the first kept word is what defined ov_start
        let head_len = later.words[later.keep_start..later.keep_end]
            .iter()
            .take_while(|w| w.abs_start <= ov_end + OVERLAP_SLICE_TOLERANCE_SECS)
            .count()
            .max(1);

        let tail_mean =
            mean_centrality(&earlier.words[earlier.keep_end - tail_len..earlier.keep_end]);
        let head_mean =
            mean_centrality(&later.words[later.keep_start..later.keep_start + head_len]);

        // Ties go to the later chunk
        if tail_mean > head_mean {
            later.keep_start += head_len;
            diagnostics.words_dropped += head_len;
        } else {
            earlier.keep_end -= tail_len;
            diagnostics.words_dropped += tail_len;
        }
    }

    // Concatenate kept sub-ranges in plan order
    let mut words = Vec::new();
    for chunk in &lifted {
        for word in &chunk.words[chunk.keep_start..chunk.keep_end] {
            words.push(MergedWord {
                text: word.text.clone(),
                start: word.abs_start,
                end: word.abs_end,
            });
        }
    }

    let text = words
        .iter()
        .map(|w| w.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    MergedTranscript {
        text,
        words,
        diagnostics,
    }
}

/// Lift successful results to absolute times with centrality scores
fn lift(results: &[ChunkResult]) -> Vec<LiftedChunk> {
    results
        .iter()
        .filter_map(|result| match result {
            ChunkResult::Success { chunk, words, .. } if !words.is_empty() => {
                let lifted: Vec<LiftedWord> = words
                    .iter()
                    .map(|word| {
                        let abs_start = chunk.actual_start + word.start;
                        let abs_end = chunk.actual_start + word.end;
                        LiftedWord {
                            text: word.text.clone(),
                            abs_start,
                            abs_end,
                            centrality: centrality(chunk, abs_start, abs_end),
                        }
                    })
                    .collect();
                let keep_end = lifted.len();
                Some(LiftedChunk {
                    words: lifted,
                    keep_start: 0,
                    keep_end,
                })
            }
            _ => None,
        })
        .collect()
}

/// Distance to the nearest logical boundary, normalized to the chunk
/// half-length. Negative when the word lies in the overlap outside the
/// logical region, which correctly penalizes it.
fn centrality(chunk: &Chunk, abs_start: f64, abs_end: f64) -> f64 {
    let from_leading = abs_start - chunk.logical_start;
    let from_trailing = chunk.logical_end - abs_end;
    from_leading.min(from_trailing) / (chunk.logical_len() / 2.0)
}

fn mean_centrality(words: &[LiftedWord]) -> f64 {
    words.iter().map(|w| w.centrality).sum::<f64>() / words.len() as f64
}

/// Text-only merge for results without word timings.
///
/// Walks the results in plan order, looking for a token run shared by
/// the tail of the accumulated text and the head of the next chunk's
/// text. Comparison is case-folded and punctuation-stripped; the
/// emitted text is never normalized.
fn merge_text_only(results: &[ChunkResult]) -> MergedTranscript {
    let mut merged = String::new();
    for result in results {
        let ChunkResult::Success { text, .. } = result else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if merged.is_empty() {
            merged.push_str(text);
            continue;
        }
        let deduped = strip_overlapping_head(&merged, text);
        if deduped.is_empty() {
            continue;
        }
        merged.push(' ');
        merged.push_str(&deduped);
    }

    MergedTranscript {
        text: merged,
        words: Vec::new(),
        diagnostics: MergeDiagnostics::default(),
    }
}

/// Remove the head of `incoming` that repeats the tail of `merged`.
///
/// Searches the last 30% of `merged`'s tokens against the first 30% of
/// `incoming`'s; the longest matching run, if at least two tokens,
/// determines how many tokens to strip from the incoming head.
fn strip_overlapping_head(merged: &str, incoming: &str) -> String {
    let merged_tokens: Vec<&str> = merged.split_whitespace().collect();
    let incoming_tokens: Vec<&str> = incoming.split_whitespace().collect();
    if merged_tokens.is_empty() || incoming_tokens.is_empty() {
        return incoming.to_string();
    }

    let tail_len = window_len(merged_tokens.len());
    let head_len = window_len(incoming_tokens.len());
    let tail = &merged_tokens[merged_tokens.len() - tail_len..];
    let head = &incoming_tokens[..head_len];

    let mut best_run = 0;
    for start in 0..tail.len() {
        let mut run = 0;
        while start + run < tail.len()
            && run < head.len()
            && tokens_match(tail[start + run], head[run])
        {
            run += 1;
        }
        best_run = best_run.max(run);
    }

    if best_run >= FALLBACK_MIN_RUN {
        incoming_tokens[best_run..].join(" ")
    } else {
        incoming.to_string()
    }
}

fn window_len(total: usize) -> usize {
    ((total as f64 * FALLBACK_WINDOW_FRACTION).ceil() as usize).clamp(1, total)
}

/// Case-folded, punctuation-stripped comparison; used only for
/// matching, never for the emitted text
fn tokens_match(a: &str, b: &str) -> bool {
    let a = normalize_token(a);
    !a.is_empty() && a == normalize_token(b)
}

fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .flat_map(char::to_lowercase)
        .collect()
}

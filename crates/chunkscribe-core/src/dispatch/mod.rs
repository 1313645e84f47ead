//! Transcription dispatcher
//!
//! Drives the per-chunk lifecycle for a plan: extract, submit, classify
//! failures, back off, retry. Chunks are processed strictly in index
//! order; the service's per-key concurrency limit makes parallel
//! submissions pointless, and sequential processing keeps lifecycle
//! ordering and abort semantics simple.
//!
//! Per-chunk state machine:
//!
//! ```text
//!   Pending ──start──▶ InFlight ──ok──▶ Succeeded
//!               │          │
//!               │          └──transport error──▶ (classify)
//!               │                  retryable ──▶ Backoff ──▶ InFlight
//!               │                  fatal ──────▶ Failed
//!               └──cancel (before extract) ────▶ Cancelled
//! ```
//!
//! Suspension points are exactly three: awaiting extraction, awaiting
//! the service response, and sleeping during backoff. The cancellation
//! token is polled at each of them.

mod classify;
mod retry;

pub use classify::{ErrorKind, classify};
pub use retry::RetryPolicy;

use std::time::Duration;

use serde::Serialize;

use crate::audio::ChunkExtractor;
use crate::cancel::CancelToken;
use crate::config::TranscribeConfig;
use crate::error::Result;
use crate::plan::Chunk;
use crate::provider::{
    ServiceError, TranscriptionBackend, TranscriptionRequest, VerboseTranscript, WordTiming,
};

/// Cancellation is polled at least this often during any wait
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll interval while a request is in flight
const INFLIGHT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of one chunk's round-trip
#[derive(Debug, Clone)]
pub enum ChunkResult {
    Success {
        chunk: Chunk,
        text: String,
        /// Word timings relative to the chunk's actual start
        words: Vec<WordTiming>,
        detected_language: Option<String>,
        reported_duration: Option<f64>,
    },
    Failure {
        chunk: Chunk,
        kind: ErrorKind,
        message: String,
    },
    Cancelled {
        chunk: Chunk,
    },
}

impl ChunkResult {
    /// The plan record this result belongs to
    pub fn chunk(&self) -> &Chunk {
        match self {
            ChunkResult::Success { chunk, .. }
            | ChunkResult::Failure { chunk, .. }
            | ChunkResult::Cancelled { chunk } => chunk,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChunkResult::Success { .. })
    }
}

/// Terminal state of a whole plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Every chunk succeeded
    Completed,
    /// At least one chunk failed or was never invoked
    PartiallyCompleted,
    /// Cancellation stopped the plan
    Cancelled,
}

/// Results plus the plan's terminal state
#[derive(Debug)]
pub struct PlanOutcome {
    pub results: Vec<ChunkResult>,
    pub status: PlanStatus,
}

impl PlanOutcome {
    /// Count of chunks that produced a transcript
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

/// Lifecycle hooks invoked at state-machine transitions
///
/// Hooks carry no return value that affects control flow; cancellation
/// goes through the `CancelToken` instead.
pub trait DispatchHooks {
    fn on_chunk_start(&self, _chunk: &Chunk, _index: usize) {}
    fn on_chunk_complete(&self, _chunk: &Chunk, _index: usize, _result: &ChunkResult) {}
    fn on_chunk_error(&self, _chunk: &Chunk, _index: usize, _kind: ErrorKind, _message: &str) {}
    fn on_retry(
        &self,
        _chunk: &Chunk,
        _index: usize,
        _attempt: u32,
        _max_attempts: u32,
        _delay_ms: u64,
        _kind: ErrorKind,
    ) {
    }
}

/// Hooks that ignore every event
pub struct NoopHooks;

impl DispatchHooks for NoopHooks {}

enum AttemptOutcome {
    Success(VerboseTranscript),
    Failure(ErrorKind, String),
    Cancelled,
}

/// Transcribe every chunk of a plan, in index order.
///
/// Retryable service errors are absorbed by the per-chunk retry loop;
/// other failures are recorded and processing continues, except `Auth`
/// which aborts the remaining chunks without invoking them. On
/// cancellation the results accumulated so far are returned with status
/// `Cancelled` — partial results are valid.
pub async fn transcribe_all(
    chunks: &[Chunk],
    extractor: &mut dyn ChunkExtractor,
    backend: &dyn TranscriptionBackend,
    api_key: &str,
    config: &TranscribeConfig,
    hooks: &dyn DispatchHooks,
    cancel: &CancelToken,
) -> Result<PlanOutcome> {
    let timeout = Duration::from_millis(config.per_request_timeout_ms);
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Network(format!("Failed to create HTTP client: {e}")))?;

    let mut results = Vec::with_capacity(chunks.len());
    let mut any_failed = false;
    let mut cancelled = false;

    'chunks: for chunk in chunks {
        // Quiescent pause between chunks suppresses burst rate-limit hits
        if chunk.index > 0
            && config.inter_chunk_delay_ms > 0
            && !cancellable_sleep(Duration::from_millis(config.inter_chunk_delay_ms), cancel).await
        {
            results.push(ChunkResult::Cancelled {
                chunk: chunk.clone(),
            });
            cancelled = true;
            break;
        }

        if cancel.is_cancelled() {
            results.push(ChunkResult::Cancelled {
                chunk: chunk.clone(),
            });
            cancelled = true;
            break;
        }

        hooks.on_chunk_start(chunk, chunk.index);

        let payload = match extractor.extract(chunk) {
            Ok(payload) => payload,
            Err(err) => {
                // The bytes cannot change between attempts, so extraction
                // failures are never retried
                let message = err.to_string();
                hooks.on_chunk_error(chunk, chunk.index, ErrorKind::Decode, &message);
                results.push(ChunkResult::Failure {
                    chunk: chunk.clone(),
                    kind: ErrorKind::Decode,
                    message,
                });
                any_failed = true;
                continue;
            }
        };

        let request =
            TranscriptionRequest::from_payload(payload, &config.model, config.language.as_deref());

        let mut attempt_outcome = AttemptOutcome::Cancelled;
        for attempt in 0..=config.retry.max_attempts {
            if cancel.is_cancelled() {
                attempt_outcome = AttemptOutcome::Cancelled;
                break;
            }

            match submit(&client, backend, api_key, request.clone(), timeout, cancel).await {
                None => {
                    attempt_outcome = AttemptOutcome::Cancelled;
                    break;
                }
                Some(Ok(transcript)) => {
                    attempt_outcome = AttemptOutcome::Success(transcript);
                    break;
                }
                Some(Err(err)) => {
                    let kind = classify(&err);
                    let message = err.to_string();
                    if kind.is_retryable() && attempt < config.retry.max_attempts {
                        let delay = config.retry.delay_for_attempt(attempt);
                        hooks.on_retry(
                            chunk,
                            chunk.index,
                            attempt + 1,
                            config.retry.max_attempts,
                            delay.as_millis() as u64,
                            kind,
                        );
                        crate::verbose!(
                            "Chunk {} attempt {} failed ({kind}), retrying in {}ms",
                            chunk.index,
                            attempt + 1,
                            delay.as_millis()
                        );
                        if !cancellable_sleep(delay, cancel).await {
                            attempt_outcome = AttemptOutcome::Cancelled;
                            break;
                        }
                    } else {
                        attempt_outcome = AttemptOutcome::Failure(kind, message);
                        break;
                    }
                }
            }
        }

        match attempt_outcome {
            AttemptOutcome::Success(transcript) => {
                let result = ChunkResult::Success {
                    chunk: chunk.clone(),
                    text: transcript.text,
                    words: transcript.words,
                    detected_language: transcript.language,
                    reported_duration: transcript.duration,
                };
                hooks.on_chunk_complete(chunk, chunk.index, &result);
                results.push(result);
            }
            AttemptOutcome::Failure(kind, message) => {
                hooks.on_chunk_error(chunk, chunk.index, kind, &message);
                results.push(ChunkResult::Failure {
                    chunk: chunk.clone(),
                    kind,
                    message,
                });
                any_failed = true;
                if kind.aborts_plan() {
                    crate::warn!(
                        "Authentication failed on chunk {}; skipping remaining chunks",
                        chunk.index
                    );
                    break 'chunks;
                }
            }
            AttemptOutcome::Cancelled => {
                results.push(ChunkResult::Cancelled {
                    chunk: chunk.clone(),
                });
                cancelled = true;
                break 'chunks;
            }
        }
    }

    let status = if cancelled {
        PlanStatus::Cancelled
    } else if any_failed || results.len() < chunks.len() {
        PlanStatus::PartiallyCompleted
    } else {
        PlanStatus::Completed
    };

    Ok(PlanOutcome { results, status })
}

/// One submission with a hard deadline and active cancellation.
///
/// Returns `None` when cancelled; dropping the in-flight future aborts
/// the underlying request rather than orphaning it.
async fn submit(
    client: &reqwest::Client,
    backend: &dyn TranscriptionBackend,
    api_key: &str,
    request: TranscriptionRequest,
    timeout: Duration,
    cancel: &CancelToken,
) -> Option<std::result::Result<VerboseTranscript, ServiceError>> {
    tokio::select! {
        outcome = tokio::time::timeout(timeout, backend.transcribe(client, api_key, request)) => {
            Some(match outcome {
                Ok(result) => result,
                Err(_elapsed) => Err(ServiceError::Timeout),
            })
        }
        _ = watch_cancel(cancel) => None,
    }
}

/// Resolves once cancellation is requested
async fn watch_cancel(cancel: &CancelToken) {
    while !cancel.is_cancelled() {
        tokio::time::sleep(INFLIGHT_POLL_INTERVAL).await;
    }
}

/// Sleep for `total`, polling the token at least every 500 ms.
///
/// Returns false when the sleep was interrupted by cancellation.
async fn cancellable_sleep(total: Duration, cancel: &CancelToken) -> bool {
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if cancel.is_cancelled() {
            return false;
        }
        let step = remaining.min(CANCEL_POLL_INTERVAL);
        tokio::time::sleep(step).await;
        remaining -= step;
    }
    !cancel.is_cancelled()
}

//! Lifecycle progress reporting for the terminal

use chunkscribe_core::{Chunk, ChunkResult, DispatchHooks, ErrorKind};

/// Prints per-chunk lifecycle events to stderr
pub struct CliHooks {
    total: usize,
}

impl CliHooks {
    pub fn new(total: usize) -> Self {
        Self { total }
    }
}

impl DispatchHooks for CliHooks {
    fn on_chunk_start(&self, chunk: &Chunk, index: usize) {
        chunkscribe_core::info!(
            "Transcribing chunk {}/{} ({:.1}s - {:.1}s)",
            index + 1,
            self.total,
            chunk.actual_start,
            chunk.actual_end
        );
    }

    fn on_chunk_complete(&self, _chunk: &Chunk, index: usize, result: &ChunkResult) {
        if let ChunkResult::Success { words, .. } = result {
            chunkscribe_core::verbose!(
                "Chunk {}/{} done ({} words)",
                index + 1,
                self.total,
                words.len()
            );
        }
    }

    fn on_chunk_error(&self, _chunk: &Chunk, index: usize, kind: ErrorKind, message: &str) {
        chunkscribe_core::error!(
            "Chunk {}/{} failed ({kind}): {message}",
            index + 1,
            self.total
        );
    }

    fn on_retry(
        &self,
        _chunk: &Chunk,
        index: usize,
        attempt: u32,
        max_attempts: u32,
        delay_ms: u64,
        kind: ErrorKind,
    ) {
        chunkscribe_core::warn!(
            "Chunk {}/{}: {kind}, retry {attempt}/{max_attempts} in {delay_ms}ms",
            index + 1,
            self.total
        );
    }
}

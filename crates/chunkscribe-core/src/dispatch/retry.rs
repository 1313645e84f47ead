//! Retry policy with exponential backoff for transient service errors.
//!
//! Retryable kinds (timeouts, connection failures, 429, 5xx) are
//! absorbed by the dispatcher's retry loop using these delays; fatal
//! kinds never reach them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for retry behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial try
    pub max_attempts: u32,
    /// First backoff delay in milliseconds
    pub initial_delay_ms: u64,
    /// Backoff growth factor per attempt
    pub multiplier: f64,
    /// Delay cap in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 1_000,
            multiplier: 2.0,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Calculate the delay to wait after failed attempt number `attempt`
    /// (0-based): `min(initial * multiplier^attempt, max)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let grown = self.initial_delay_ms as f64 * self.multiplier.powi(attempt as i32);
        let delay_ms = grown.min(self.max_delay_ms as f64) as u64;
        Duration::from_millis(delay_ms)
    }
}

//! # Retry Backoff
//!
//! Randomized, capped exponential backoff between selection attempts.

use crate::domain::SelectionConfig;
use rand::Rng;
use std::time::Duration;

/// Delay after failed attempt `attempt` for a given jitter in `[0, 1)`.
///
/// `min(base_sleep_ms << attempt, retry_cap_ms / 2) * (1 + jitter)`, so no
/// delay ever exceeds `retry_cap_ms`.
pub fn backoff_delay(attempt: u32, config: &SelectionConfig, jitter: f64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let exponential = config.base_sleep_ms.saturating_mul(factor);
    let capped = exponential.min(config.retry_cap_ms / 2);

    let jitter = if jitter.is_finite() {
        jitter.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let micros = (capped as f64 * (1.0 + jitter) * 1000.0).round();
    Duration::from_micros(micros as u64)
}

/// Delay after failed attempt `attempt`, jittered from the thread RNG.
pub fn jittered_backoff(attempt: u32, config: &SelectionConfig) -> Duration {
    let jitter: f64 = rand::thread_rng().gen();
    backoff_delay(attempt, config, jitter)
}

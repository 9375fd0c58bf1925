//! Selection metrics.
//!
//! Lock-free counters shared between an engine and whoever reports on it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Coin selection counters.
#[derive(Debug, Default)]
pub struct SelectionMetrics {
    /// Claims started.
    pub claims_total: AtomicU64,
    /// Claims that reserved outputs.
    pub claims_succeeded: AtomicU64,
    /// Selection attempts made across all claims.
    pub attempts_total: AtomicU64,
    /// Attempts that ran out of pages before covering the amount.
    pub shortfalls: AtomicU64,
    /// Attempts that lost outputs to another claimant.
    pub contentions: AtomicU64,
    /// Claims that exhausted their retries.
    pub exhausted: AtomicU64,
    /// Claims cancelled by their workflow.
    pub cancelled: AtomicU64,
    /// Outputs reserved by successful claims.
    pub outputs_reserved: AtomicU64,
}

/// Point-in-time copy of [`SelectionMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Claims started.
    pub claims_total: u64,
    /// Claims that reserved outputs.
    pub claims_succeeded: u64,
    /// Attempts made.
    pub attempts_total: u64,
    /// Shortfall attempts.
    pub shortfalls: u64,
    /// Contended attempts.
    pub contentions: u64,
    /// Exhausted claims.
    pub exhausted: u64,
    /// Cancelled claims.
    pub cancelled: u64,
    /// Outputs reserved.
    pub outputs_reserved: u64,
}

impl SelectionMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a claim starting.
    pub fn record_claim(&self) {
        self.claims_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an attempt starting.
    pub fn record_attempt(&self) {
        self.attempts_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a shortfall attempt.
    pub fn record_shortfall(&self) {
        self.shortfalls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a contended attempt.
    pub fn record_contention(&self) {
        self.contentions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful claim of `outputs` outputs.
    pub fn record_success(&self, outputs: usize) {
        self.claims_succeeded.fetch_add(1, Ordering::Relaxed);
        self.outputs_reserved
            .fetch_add(outputs as u64, Ordering::Relaxed);
    }

    /// Record a claim exhausting its retries.
    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cancelled claim.
    pub fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            claims_total: self.claims_total.load(Ordering::Relaxed),
            claims_succeeded: self.claims_succeeded.load(Ordering::Relaxed),
            attempts_total: self.attempts_total.load(Ordering::Relaxed),
            shortfalls: self.shortfalls.load(Ordering::Relaxed),
            contentions: self.contentions.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            outputs_reserved: self.outputs_reserved.load(Ordering::Relaxed),
        }
    }
}

//! # Selection Engine
//!
//! Claims unspent outputs covering a requested amount under contention.
//!
//! Each attempt pages through the query backend, gathers outputs until the
//! amount is covered, then reserves the whole set atomically. A shortfall or
//! a lost reservation race ends the attempt; the engine backs off with
//! jittered exponential delay and tries again, up to `max_retries` attempts.
//!
//! The engine never releases a reservation. That belongs to whoever commits
//! or rolls back the transaction built from the claimed outputs.

use crate::algorithms::{jittered_backoff, Accumulator};
use crate::cancel::CancelSignal;
use crate::domain::{
    Amount, AttemptOutcome, ClaimId, PartyId, SelectionConfig, SelectionError, TokenType,
    UnspentOutput,
};
use crate::metrics::SelectionMetrics;
use crate::ports::{
    LockFilter, LockManager, OwnershipRelevance, QueryBackend, ReserveOutcome, SortOrder,
    StateStatus, UnspentFilter,
};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument, Span};

/// A request to claim outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimRequest {
    /// Amount to cover.
    pub required: Amount<TokenType>,
    /// Claim the reservations are made under.
    pub claim_id: ClaimId,
    /// Restrict to one issuer.
    pub issuer: Option<PartyId>,
    /// Ownership relevance of candidates.
    pub relevance: OwnershipRelevance,
    /// Reservation state of candidates.
    pub lock: LockFilter,
    /// Candidate order.
    pub sort: SortOrder,
    /// Page size override.
    pub page_size: Option<usize>,
}

impl ClaimRequest {
    /// Claim `required` under `claim_id`, from unlocked relevant outputs in
    /// ascending reference order.
    ///
    /// Calling the engine twice with the same claim id returns the next,
    /// disjoint batch.
    pub fn new(required: Amount<TokenType>, claim_id: ClaimId) -> Self {
        Self {
            required,
            claim_id,
            issuer: None,
            relevance: OwnershipRelevance::default(),
            lock: LockFilter::default(),
            sort: SortOrder::default(),
            page_size: None,
        }
    }

    /// Only select outputs from `issuer`.
    pub fn with_issuer(mut self, issuer: PartyId) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Set the ownership relevance.
    pub fn with_relevance(mut self, relevance: OwnershipRelevance) -> Self {
        self.relevance = relevance;
        self
    }

    /// Set the lock filter.
    pub fn with_lock(mut self, lock: LockFilter) -> Self {
        self.lock = lock;
        self
    }

    /// Also consider outputs already reserved under this request's claim.
    pub fn including_own_reservations(self) -> Self {
        let lock = LockFilter::UnlockedOrLockedBy(self.claim_id);
        self.with_lock(lock)
    }

    /// Set the candidate order.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Override the configured page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Backend filter for this request.
    pub fn filter(&self) -> UnspentFilter {
        UnspentFilter {
            token: self.required.token.clone(),
            issuer: self.issuer,
            relevance: self.relevance,
            status: StateStatus::Unconsumed,
            lock: self.lock,
        }
    }
}

/// Contended coin selection engine.
pub struct SelectionEngine<Q, L> {
    backend: Arc<Q>,
    locks: Arc<L>,
    config: SelectionConfig,
    span: Span,
    metrics: Arc<SelectionMetrics>,
}

impl<Q, L> SelectionEngine<Q, L>
where
    Q: QueryBackend,
    L: LockManager,
{
    /// Create an engine. Every claim is recorded under `span`.
    pub fn new(
        backend: Arc<Q>,
        locks: Arc<L>,
        config: SelectionConfig,
        span: Span,
    ) -> Result<Self, SelectionError> {
        config.validate()?;
        Ok(Self {
            backend,
            locks,
            config,
            span,
            metrics: Arc::new(SelectionMetrics::new()),
        })
    }

    /// Share an existing metrics instance.
    pub fn with_metrics(mut self, metrics: Arc<SelectionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Engine metrics.
    pub fn metrics(&self) -> &Arc<SelectionMetrics> {
        &self.metrics
    }

    /// Engine configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Claim outputs covering `request.required`.
    pub async fn claim(&self, request: ClaimRequest) -> Result<Vec<UnspentOutput>, SelectionError> {
        self.claim_with_cancel(request, &CancelSignal::never()).await
    }

    /// Claim outputs, aborting with `Cancelled` when `cancel` fires.
    pub async fn claim_with_cancel(
        &self,
        request: ClaimRequest,
        cancel: &CancelSignal,
    ) -> Result<Vec<UnspentOutput>, SelectionError> {
        let span = info_span!(
            parent: &self.span,
            "claim",
            claim_id = %request.claim_id,
            required = %request.required
        );
        self.run_claim(request, cancel).instrument(span).await
    }

    async fn run_claim(
        &self,
        request: ClaimRequest,
        cancel: &CancelSignal,
    ) -> Result<Vec<UnspentOutput>, SelectionError> {
        if request.required.is_zero() {
            return Err(SelectionError::ZeroAmount);
        }
        self.metrics.record_claim();

        let max_retries = self.config.max_retries;
        for attempt in 1..=max_retries {
            if cancel.is_cancelled() {
                return Err(self.cancelled(&request, attempt));
            }

            self.metrics.record_attempt();
            match self.attempt(&request).await? {
                AttemptOutcome::Claimed(outputs) => {
                    self.metrics.record_success(outputs.len());
                    info!(
                        attempt,
                        outputs = outputs.len(),
                        "[qc-18] Claimed {} for {}",
                        request.required,
                        request.claim_id
                    );
                    return Ok(outputs);
                }
                AttemptOutcome::Shortfall { gathered } => {
                    self.metrics.record_shortfall();
                    debug!(attempt, gathered, "[qc-18] Shortfall");
                }
                AttemptOutcome::Contended { conflicts } => {
                    self.metrics.record_contention();
                    debug!(attempt, conflicts = conflicts.len(), "[qc-18] Contended");
                }
            }

            if attempt < max_retries {
                let delay = jittered_backoff(attempt, &self.config);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "[qc-18] Backing off");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        return Err(self.cancelled(&request, attempt));
                    }
                }
            }
        }

        self.metrics.record_exhausted();
        warn!(
            attempts = max_retries,
            "[qc-18] Could not claim {} for {}", request.required, request.claim_id
        );
        Err(SelectionError::InsufficientFunds {
            required: request.required.to_string(),
            claim_id: request.claim_id,
            attempts: max_retries,
        })
    }

    fn cancelled(&self, request: &ClaimRequest, attempt: u32) -> SelectionError {
        self.metrics.record_cancelled();
        info!(attempt, "[qc-18] Claim {} cancelled", request.claim_id);
        SelectionError::Cancelled(request.claim_id)
    }

    /// Run a single selection attempt.
    ///
    /// Backend and lock manager errors propagate; shortfall and contention
    /// are reported as outcomes.
    pub async fn attempt(&self, request: &ClaimRequest) -> Result<AttemptOutcome, SelectionError> {
        let filter = request.filter();
        let page_size = request.page_size.unwrap_or(self.config.page_size).max(1);
        let mut accumulator = Accumulator::new(request.required.quantity);

        let mut page = 0;
        loop {
            let result = self
                .backend
                .query(&filter, page, page_size, request.sort)
                .await?;
            let has_more = result.has_more(page, page_size);
            if accumulator.offer_page(result.outputs) || !has_more {
                break;
            }
            page += 1;
        }

        if !accumulator.is_satisfied() {
            return Ok(AttemptOutcome::Shortfall {
                gathered: accumulator.gathered(),
            });
        }

        let refs = accumulator.refs();
        match self.locks.reserve(request.claim_id, &refs).await? {
            ReserveOutcome::Reserved => Ok(AttemptOutcome::Claimed(accumulator.into_outputs())),
            ReserveOutcome::AlreadyReserved(conflicts) => {
                Ok(AttemptOutcome::Contended { conflicts })
            }
        }
    }
}

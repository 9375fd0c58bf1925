//! # Outbound Ports
//!
//! Collaborators the selection engine and planners depend on: the paged
//! query backend, the reservation lock manager and the ownership resolver.

use crate::domain::{ClaimId, PartyId, SelectionError, StateRef, TokenType, UnspentOutput};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Which outputs count as "ours" for a query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OwnershipRelevance {
    /// Only outputs owned by identities of the querying party.
    #[default]
    Relevant,
    /// Every output the backend knows about.
    All,
}

/// Consumption status filter. Selection only ever looks at unconsumed outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StateStatus {
    /// Not yet consumed by any committed transaction.
    #[default]
    Unconsumed,
}

/// Reservation state filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LockFilter {
    /// Outputs nobody has reserved.
    #[default]
    UnlockedOnly,
    /// Outputs reserved under the given claim.
    LockedBy(ClaimId),
    /// Unreserved outputs plus those already reserved under the given claim.
    UnlockedOrLockedBy(ClaimId),
}

impl LockFilter {
    /// Check whether an output whose reservation holder is `holder` passes.
    pub fn admits(&self, holder: Option<ClaimId>) -> bool {
        match (self, holder) {
            (Self::UnlockedOnly, None) => true,
            (Self::UnlockedOnly, Some(_)) => false,
            (Self::LockedBy(id), Some(h)) => *id == h,
            (Self::LockedBy(_), None) => false,
            (Self::UnlockedOrLockedBy(_), None) => true,
            (Self::UnlockedOrLockedBy(id), Some(h)) => *id == h,
        }
    }
}

/// Total order over candidate outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending `StateRef`.
    #[default]
    StateRefAscending,
    /// Descending `StateRef`.
    StateRefDescending,
    /// Smallest quantity first, ties by ascending `StateRef`.
    QuantityAscending,
    /// Largest quantity first, ties by ascending `StateRef`.
    QuantityDescending,
}

impl SortOrder {
    /// Compare two outputs under this order.
    pub fn compare(&self, a: &UnspentOutput, b: &UnspentOutput) -> Ordering {
        match self {
            Self::StateRefAscending => a.state_ref.cmp(&b.state_ref),
            Self::StateRefDescending => b.state_ref.cmp(&a.state_ref),
            Self::QuantityAscending => a
                .quantity()
                .cmp(&b.quantity())
                .then_with(|| a.state_ref.cmp(&b.state_ref)),
            Self::QuantityDescending => b
                .quantity()
                .cmp(&a.quantity())
                .then_with(|| a.state_ref.cmp(&b.state_ref)),
        }
    }
}

/// Query criteria for candidate outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnspentFilter {
    /// Required token.
    pub token: TokenType,
    /// Restrict to one issuer.
    pub issuer: Option<PartyId>,
    /// Ownership relevance.
    pub relevance: OwnershipRelevance,
    /// Consumption status.
    pub status: StateStatus,
    /// Reservation state.
    pub lock: LockFilter,
}

impl UnspentFilter {
    /// Unlocked, relevant, unconsumed outputs of `token` from any issuer.
    pub fn for_token(token: TokenType) -> Self {
        Self {
            token,
            issuer: None,
            relevance: OwnershipRelevance::default(),
            status: StateStatus::default(),
            lock: LockFilter::default(),
        }
    }

    /// Check the value criteria (token and issuer) against an output.
    ///
    /// Relevance, status and lock state depend on backend knowledge and are
    /// applied by the backend itself.
    pub fn matches_value(&self, output: &UnspentOutput) -> bool {
        output.token() == &self.token && self.issuer.map_or(true, |i| output.issuer() == i)
    }
}

/// One page of query results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnspentPage {
    /// Outputs on this page, in the requested order.
    pub outputs: Vec<UnspentOutput>,
    /// Total matching outputs across all pages.
    pub total_available: usize,
}

impl UnspentPage {
    /// Check whether pages after `page` may hold more results.
    pub fn has_more(&self, page: usize, page_size: usize) -> bool {
        !self.outputs.is_empty() && (page + 1).saturating_mul(page_size) < self.total_available
    }
}

/// Query backend - outbound port.
///
/// Paged, sorted, filtered retrieval of candidate unspent outputs. Pages are
/// 0-based.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Fetch one page of outputs matching `filter`.
    async fn query(
        &self,
        filter: &UnspentFilter,
        page: usize,
        page_size: usize,
        sort: SortOrder,
    ) -> Result<UnspentPage, SelectionError>;
}

/// Result of a reservation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Every ref is now reserved under the claim.
    Reserved,
    /// Nothing was reserved; these refs are held by another claim.
    AlreadyReserved(Vec<StateRef>),
}

/// Lock manager - outbound port.
///
/// `reserve` must be atomic and linearizable across concurrent callers:
/// either every ref becomes reserved under `claim_id`, or none does.
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Reserve `refs` under `claim_id` if none is held by another claim.
    async fn reserve(
        &self,
        claim_id: ClaimId,
        refs: &[StateRef],
    ) -> Result<ReserveOutcome, SelectionError>;
}

/// Resolves whether an identity belongs to the planning party.
pub trait OwnershipResolver {
    /// Check if `party` is one of our identities.
    fn is_owned(&self, party: &PartyId) -> bool;
}

impl<F> OwnershipResolver for F
where
    F: Fn(&PartyId) -> bool,
{
    fn is_owned(&self, party: &PartyId) -> bool {
        self(party)
    }
}

impl OwnershipResolver for HashSet<PartyId> {
    fn is_owned(&self, party: &PartyId) -> bool {
        self.contains(party)
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock backend serving a fixed list of outputs with no lock awareness.
#[derive(Clone, Default)]
pub struct MockQueryBackend {
    /// Outputs served, filtered by value criteria only.
    pub outputs: Vec<UnspentOutput>,
    /// Should fail?
    pub should_fail: bool,
}

#[async_trait]
impl QueryBackend for MockQueryBackend {
    async fn query(
        &self,
        filter: &UnspentFilter,
        page: usize,
        page_size: usize,
        sort: SortOrder,
    ) -> Result<UnspentPage, SelectionError> {
        if self.should_fail {
            return Err(SelectionError::Backend("Mock failure".to_string()));
        }
        let mut matching: Vec<UnspentOutput> = self
            .outputs
            .iter()
            .filter(|o| filter.matches_value(o))
            .cloned()
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));
        let total_available = matching.len();
        let outputs = matching
            .into_iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .collect();
        Ok(UnspentPage {
            outputs,
            total_available,
        })
    }
}

/// Mock lock manager that always grants or always refuses.
#[derive(Clone, Default)]
pub struct MockLockManager {
    /// Refuse every reservation as contended?
    pub always_contended: bool,
    /// Should fail?
    pub should_fail: bool,
}

#[async_trait]
impl LockManager for MockLockManager {
    async fn reserve(
        &self,
        _claim_id: ClaimId,
        refs: &[StateRef],
    ) -> Result<ReserveOutcome, SelectionError> {
        if self.should_fail {
            return Err(SelectionError::Backend("Mock failure".to_string()));
        }
        if self.always_contended {
            return Ok(ReserveOutcome::AlreadyReserved(refs.to_vec()));
        }
        Ok(ReserveOutcome::Reserved)
    }
}

//! In-Memory Vault Adapter
//!
//! Implements the `QueryBackend` and `LockManager` ports over a single
//! in-memory output set. Queries and reservations share one lock, so
//! `reserve` is linearizable with respect to every other call.

use crate::domain::{ClaimId, PartyId, SelectionError, StateRef, UnspentOutput};
use crate::ports::outbound::{
    LockManager, OwnershipRelevance, QueryBackend, ReserveOutcome, SortOrder, UnspentFilter,
    UnspentPage,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

#[derive(Default)]
struct VaultState {
    /// Unconsumed outputs by reference.
    outputs: BTreeMap<StateRef, UnspentOutput>,
    /// Reservation holder per output.
    locks: HashMap<StateRef, ClaimId>,
    /// Identities treated as ours for `OwnershipRelevance::Relevant`.
    our_parties: HashSet<PartyId>,
}

/// In-memory unspent output store with reservation tracking.
///
/// Release and consumption stand in for the external commit and rollback
/// logic; the selection engine itself never calls them.
#[derive(Default)]
pub struct InMemoryVault {
    state: RwLock<VaultState>,
}

impl InMemoryVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty vault owned by `parties`.
    pub fn with_parties(parties: impl IntoIterator<Item = PartyId>) -> Self {
        let vault = Self::new();
        vault.state.write().our_parties.extend(parties);
        vault
    }

    /// Register an identity as ours.
    pub fn add_party(&self, party: PartyId) {
        self.state.write().our_parties.insert(party);
    }

    /// Record a newly committed output.
    pub fn add_output(&self, output: UnspentOutput) {
        debug!("[qc-18] Adding output {} ({})", output.state_ref, output.amount);
        self.state.write().outputs.insert(output.state_ref, output);
    }

    /// Record several outputs.
    pub fn add_outputs(&self, outputs: impl IntoIterator<Item = UnspentOutput>) {
        let mut state = self.state.write();
        for output in outputs {
            state.outputs.insert(output.state_ref, output);
        }
    }

    /// Drop every reservation held by `claim_id`. Returns how many were freed.
    pub fn release(&self, claim_id: ClaimId) -> usize {
        let mut state = self.state.write();
        let before = state.locks.len();
        state.locks.retain(|_, holder| *holder != claim_id);
        let freed = before - state.locks.len();
        info!("[qc-18] Released {} reservations for claim {}", freed, claim_id);
        freed
    }

    /// Mark outputs as consumed, removing them and their reservations.
    pub fn consume(&self, refs: &[StateRef]) -> usize {
        let mut state = self.state.write();
        let mut consumed = 0;
        for state_ref in refs {
            state.locks.remove(state_ref);
            if state.outputs.remove(state_ref).is_some() {
                consumed += 1;
            }
        }
        info!("[qc-18] Consumed {} outputs", consumed);
        consumed
    }

    /// Refs currently reserved under `claim_id`, ascending.
    pub fn reserved_by(&self, claim_id: ClaimId) -> Vec<StateRef> {
        let state = self.state.read();
        let mut refs: Vec<StateRef> = state
            .locks
            .iter()
            .filter(|(_, holder)| **holder == claim_id)
            .map(|(r, _)| *r)
            .collect();
        refs.sort();
        refs
    }

    /// Reservation holder of `state_ref`, if any.
    pub fn holder(&self, state_ref: &StateRef) -> Option<ClaimId> {
        self.state.read().locks.get(state_ref).copied()
    }

    /// Number of unconsumed outputs.
    pub fn len(&self) -> usize {
        self.state.read().outputs.len()
    }

    /// Check if the vault holds no outputs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QueryBackend for InMemoryVault {
    async fn query(
        &self,
        filter: &UnspentFilter,
        page: usize,
        page_size: usize,
        sort: SortOrder,
    ) -> Result<UnspentPage, SelectionError> {
        let state = self.state.read();
        let mut matching: Vec<&UnspentOutput> = state
            .outputs
            .values()
            .filter(|o| filter.matches_value(o))
            .filter(|o| match filter.relevance {
                OwnershipRelevance::Relevant => state.our_parties.contains(&o.owner),
                OwnershipRelevance::All => true,
            })
            .filter(|o| filter.lock.admits(state.locks.get(&o.state_ref).copied()))
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        let total_available = matching.len();
        let outputs: Vec<UnspentOutput> = matching
            .into_iter()
            .skip(page.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();

        debug!(
            "[qc-18] Query page {} returned {}/{} outputs of {}",
            page,
            outputs.len(),
            total_available,
            filter.token
        );

        Ok(UnspentPage {
            outputs,
            total_available,
        })
    }
}

#[async_trait]
impl LockManager for InMemoryVault {
    async fn reserve(
        &self,
        claim_id: ClaimId,
        refs: &[StateRef],
    ) -> Result<ReserveOutcome, SelectionError> {
        let mut state = self.state.write();

        let conflicts: Vec<StateRef> = refs
            .iter()
            .copied()
            .filter(|r| {
                !state.outputs.contains_key(r)
                    || state.locks.get(r).is_some_and(|holder| *holder != claim_id)
            })
            .collect();

        if !conflicts.is_empty() {
            debug!(
                "[qc-18] Claim {} lost {} of {} refs to other claimants",
                claim_id,
                conflicts.len(),
                refs.len()
            );
            return Ok(ReserveOutcome::AlreadyReserved(conflicts));
        }

        for state_ref in refs {
            state.locks.insert(*state_ref, claim_id);
        }
        debug!("[qc-18] Claim {} reserved {} refs", claim_id, refs.len());
        Ok(ReserveOutcome::Reserved)
    }
}

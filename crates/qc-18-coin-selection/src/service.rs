//! # Coin Selection Service
//!
//! Application service implementing the `CoinSelectionApi` inbound port.
//! Claiming goes through the selection engine; planning is delegated to the
//! pure planners with the service's ownership resolver.

use crate::algorithms::{plan_exit, plan_move};
use crate::domain::{
    Amount, ClaimId, ExitPlan, MovePlan, PartyAndAmount, PartyId, SelectionError, TokenType,
    UnspentOutput,
};
use crate::engine::{ClaimRequest, SelectionEngine};
use crate::ports::inbound::CoinSelectionApi;
use crate::ports::outbound::{LockManager, OwnershipResolver, QueryBackend};
use async_trait::async_trait;
use tracing::debug;

/// Coin selection service.
pub struct CoinSelectionService<Q, L, R> {
    engine: SelectionEngine<Q, L>,
    resolver: R,
}

impl<Q, L, R> CoinSelectionService<Q, L, R>
where
    Q: QueryBackend,
    L: LockManager,
    R: OwnershipResolver + Send + Sync,
{
    /// Create a service over `engine`, resolving our identities with `resolver`.
    pub fn new(engine: SelectionEngine<Q, L>, resolver: R) -> Self {
        Self { engine, resolver }
    }

    /// The underlying selection engine.
    pub fn engine(&self) -> &SelectionEngine<Q, L> {
        &self.engine
    }
}

#[async_trait]
impl<Q, L, R> CoinSelectionApi for CoinSelectionService<Q, L, R>
where
    Q: QueryBackend,
    L: LockManager,
    R: OwnershipResolver + Send + Sync,
{
    async fn claim(&self, request: ClaimRequest) -> Result<Vec<UnspentOutput>, SelectionError> {
        self.engine.claim(request).await
    }

    fn plan_move(
        &self,
        inputs: &[UnspentOutput],
        payments: &[PartyAndAmount],
        change_recipient: PartyId,
    ) -> Result<MovePlan, SelectionError> {
        plan_move(inputs, payments, change_recipient, &self.resolver)
    }

    fn plan_exit(
        &self,
        inputs: &[UnspentOutput],
        amount: Amount<TokenType>,
        change_recipient: PartyId,
    ) -> Result<ExitPlan, SelectionError> {
        plan_exit(inputs, amount, change_recipient)
    }

    async fn generate_spend(
        &self,
        claim_id: ClaimId,
        payments: &[PartyAndAmount],
        change_recipient: PartyId,
    ) -> Result<MovePlan, SelectionError> {
        let Some(first) = payments.first() else {
            return Err(SelectionError::ZeroAmount);
        };
        let total = Amount::sum_of(first.amount.token.clone(), payments.iter().map(|p| &p.amount))?;
        debug!(
            legs = payments.len(),
            "[qc-18] Generating spend of {} for {}", total, claim_id
        );

        let inputs = self.engine.claim(ClaimRequest::new(total, claim_id)).await?;
        plan_move(&inputs, payments, change_recipient, &self.resolver)
    }
}

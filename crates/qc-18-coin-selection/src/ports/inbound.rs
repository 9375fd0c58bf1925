//! # Inbound Ports
//!
//! API trait defining what the Coin Selection subsystem can do.

use crate::domain::{
    Amount, ClaimId, ExitPlan, MovePlan, PartyAndAmount, PartyId, SelectionError, TokenType,
    UnspentOutput,
};
use crate::engine::ClaimRequest;
use async_trait::async_trait;

/// Coin selection API - inbound port.
#[async_trait]
pub trait CoinSelectionApi: Send + Sync {
    /// Claim unspent outputs covering the requested amount.
    async fn claim(&self, request: ClaimRequest) -> Result<Vec<UnspentOutput>, SelectionError>;

    /// Plan the outputs of a payment to one or more recipients.
    fn plan_move(
        &self,
        inputs: &[UnspentOutput],
        payments: &[PartyAndAmount],
        change_recipient: PartyId,
    ) -> Result<MovePlan, SelectionError>;

    /// Plan the change left after removing `amount` from circulation.
    fn plan_exit(
        &self,
        inputs: &[UnspentOutput],
        amount: Amount<TokenType>,
        change_recipient: PartyId,
    ) -> Result<ExitPlan, SelectionError>;

    /// Claim inputs for the sum of `payments` and plan the move in one step.
    async fn generate_spend(
        &self,
        claim_id: ClaimId,
        payments: &[PartyAndAmount],
        change_recipient: PartyId,
    ) -> Result<MovePlan, SelectionError>;
}

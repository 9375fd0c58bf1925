//! # Domain Errors
//!
//! Error types for Coin Selection.
//!
//! Only shortfall and contention inside a claim are handled locally (by
//! retrying); every variant here aborts the current request.

use super::value_objects::{ClaimId, PartyId, StateRef};
use thiserror::Error;

/// Coin selection error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Retries exhausted without reaching the requested amount.
    #[error("Insufficient funds: could not claim {required} for {claim_id} after {attempts} attempts")]
    InsufficientFunds {
        /// Requested amount, rendered.
        required: String,
        /// Claim the attempts ran under.
        claim_id: ClaimId,
        /// Attempts made.
        attempts: u32,
    },

    /// A zero quantity was requested; nothing to select.
    #[error("Requested amount is zero")]
    ZeroAmount,

    /// The enclosing workflow cancelled the claim.
    #[error("Claim {0} cancelled")]
    Cancelled(ClaimId),

    /// Inputs must share exactly one notary.
    #[error("Inputs must share exactly one notary, found {}", .found.len())]
    NotaryMismatch {
        /// Distinct notaries seen, in discovery order.
        found: Vec<PartyId>,
    },

    /// The same output appears more than once in a claimed set.
    #[error("Duplicate input {0}")]
    DuplicateInput(StateRef),

    /// Change recipient is not an identity owned by the planning party.
    #[error("Unauthorized change recipient: {0}")]
    UnauthorizedChangeRecipient(PartyId),

    /// Exit amount exceeds the sum of the exit inputs.
    #[error("Exit amount {requested} exceeds inputs {available}")]
    ExitAmountExceedsInputs {
        /// Amount to exit.
        requested: u64,
        /// Sum of the supplied inputs.
        available: u64,
    },

    /// Arithmetic overflow or underflow while combining amounts.
    #[error("Amount overflow")]
    AmountOverflow,

    /// Amounts of different tokens were combined.
    #[error("Mixed token types: expected {expected}, found {found}")]
    MixedType {
        /// Token of the left-hand amount.
        expected: String,
        /// Offending token.
        found: String,
    },

    /// Claimed inputs do not cover the requested payments.
    #[error("Insufficient inputs: required {required}, available {available}")]
    InsufficientInputs {
        /// Sum of all payments.
        required: u64,
        /// Sum of all inputs.
        available: u64,
    },

    /// Selection configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Query backend or lock manager failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl SelectionError {
    /// Check if the caller may retry the whole request with a fresh claim id.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }
}

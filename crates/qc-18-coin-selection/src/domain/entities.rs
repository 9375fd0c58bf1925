//! # Domain Entities
//!
//! Unspent outputs, payment legs and the immutable planning results handed to
//! the transaction pipeline.

use super::value_objects::{Amount, Issued, PartyId, StateRef, TokenType};
use serde::{Deserialize, Serialize};

/// A single unspent output record.
///
/// Created by the ledger when a prior transaction commits, reserved by the
/// selection engine, consumed when the planned transaction is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    /// Stable reference.
    pub state_ref: StateRef,
    /// Value held, with its issuer.
    pub amount: Amount<Issued>,
    /// Owning party.
    pub owner: PartyId,
    /// Notary whose agreement is required to consume this output.
    pub notary: PartyId,
}

impl UnspentOutput {
    /// Create an unspent output.
    pub fn new(state_ref: StateRef, amount: Amount<Issued>, owner: PartyId, notary: PartyId) -> Self {
        Self {
            state_ref,
            amount,
            owner,
            notary,
        }
    }

    /// Quantity held.
    pub fn quantity(&self) -> u64 {
        self.amount.quantity
    }

    /// Issuer of the held value.
    pub fn issuer(&self) -> PartyId {
        self.amount.issuer()
    }

    /// Bare token of the held value.
    pub fn token(&self) -> &TokenType {
        &self.amount.token.token
    }
}

/// One leg of a value transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAndAmount {
    /// Recipient.
    pub party: PartyId,
    /// Amount owed to the recipient (issuer chosen by the planner).
    pub amount: Amount<TokenType>,
}

impl PartyAndAmount {
    /// Create a payment leg.
    pub fn new(party: PartyId, amount: Amount<TokenType>) -> Self {
        Self { party, amount }
    }
}

/// A newly-to-be-created output record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// New owner.
    pub owner: PartyId,
    /// Value, with the issuer preserved from the source inputs.
    pub amount: Amount<Issued>,
    /// Notary shared by the source inputs.
    pub notary: PartyId,
}

impl OutputRecord {
    /// Create an output record.
    pub fn new(owner: PartyId, amount: Amount<Issued>, notary: PartyId) -> Self {
        Self {
            owner,
            amount,
            notary,
        }
    }
}

/// Result of planning a move: inputs to consume and outputs to create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePlan {
    /// Claimed inputs, untouched, for the caller to mark as consumed.
    pub inputs: Vec<UnspentOutput>,
    /// Ordered outputs: payment outputs first, then per-issuer change.
    pub outputs: Vec<OutputRecord>,
}

impl MovePlan {
    /// Total quantity across all inputs.
    pub fn input_quantity(&self) -> u128 {
        self.inputs.iter().map(|i| u128::from(i.quantity())).sum()
    }

    /// Total quantity across all outputs.
    pub fn output_quantity(&self) -> u128 {
        self.outputs.iter().map(|o| u128::from(o.amount.quantity)).sum()
    }

    /// Outputs owned by `party`.
    pub fn outputs_for(&self, party: &PartyId) -> Vec<&OutputRecord> {
        self.outputs.iter().filter(|o| o.owner == *party).collect()
    }
}

/// Result of planning an exit: inputs to consume and optional change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitPlan {
    /// Exit inputs, untouched.
    pub inputs: Vec<UnspentOutput>,
    /// Leftover value returned to the change recipient, if any.
    pub change: Option<OutputRecord>,
}

/// Outcome of a single selection attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Enough value gathered and reserved.
    Claimed(Vec<UnspentOutput>),
    /// Pages exhausted before reaching the requested amount.
    Shortfall {
        /// Quantity gathered before the pages ran out.
        gathered: u64,
    },
    /// Another claimant reserved some of the gathered outputs first.
    Contended {
        /// Refs held by someone else.
        conflicts: Vec<StateRef>,
    },
}

impl AttemptOutcome {
    /// Check if the attempt claimed outputs.
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }
}

//! # Domain Invariants
//!
//! Rules every claimed set and every plan must satisfy.

use super::entities::{OutputRecord, UnspentOutput};
use super::errors::SelectionError;
use super::value_objects::{PartyId, StateRef};
use std::collections::HashSet;

/// Invariant: single notary.
///
/// All inputs fed to planning must share exactly one notary. An empty input
/// list has no notary and is rejected the same way.
pub fn invariant_single_notary(inputs: &[UnspentOutput]) -> Result<PartyId, SelectionError> {
    let mut found: Vec<PartyId> = Vec::new();
    for input in inputs {
        if !found.contains(&input.notary) {
            found.push(input.notary);
        }
    }
    match found.as_slice() {
        [notary] => Ok(*notary),
        _ => Err(SelectionError::NotaryMismatch { found }),
    }
}

/// Invariant: no `StateRef` appears twice in a claimed set.
///
/// Fails with the first repeated ref.
pub fn invariant_unique_refs(outputs: &[UnspentOutput]) -> Result<(), SelectionError> {
    let mut seen: HashSet<StateRef> = HashSet::with_capacity(outputs.len());
    match outputs.iter().find(|o| !seen.insert(o.state_ref)) {
        Some(duplicate) => Err(SelectionError::DuplicateInput(duplicate.state_ref)),
        None => Ok(()),
    }
}

/// Invariant: value conservation.
///
/// Input and output totals match for every issuer. Balances are signed
/// `i128`, so the check itself cannot overflow.
pub fn invariant_value_conserved(inputs: &[UnspentOutput], outputs: &[OutputRecord]) -> bool {
    let mut balance: Vec<(PartyId, i128)> = Vec::new();
    let mut adjust = |issuer: PartyId, delta: i128| {
        match balance.iter_mut().find(|(i, _)| *i == issuer) {
            Some((_, total)) => *total += delta,
            None => balance.push((issuer, delta)),
        }
    };
    for input in inputs {
        adjust(input.issuer(), i128::from(input.quantity()));
    }
    for output in outputs {
        adjust(output.amount.issuer(), -i128::from(output.amount.quantity));
    }
    balance.iter().all(|(_, total)| *total == 0)
}

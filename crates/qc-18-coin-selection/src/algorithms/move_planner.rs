//! # Move Planner
//!
//! Splits claimed input value across payment recipients, issuer group by
//! issuer group, and returns whatever is left as per-issuer change.
//!
//! Groups are drawn from the back of the discovery-ordered list: the last
//! issuer group seen pays first. This fixes which issuer backs which
//! recipient, so it must not be reordered.

use crate::domain::{
    invariant_single_notary, invariant_unique_refs, Amount, Issued, MovePlan, OutputRecord,
    PartyAndAmount, PartyId, SelectionError, TokenType, UnspentOutput,
};
use crate::ports::OwnershipResolver;
use std::cmp::Ordering;

/// Plan the outputs for paying `payments` out of `inputs`.
///
/// Checks, in order: single notary, distinct input refs, change recipient
/// ownership, payment sum, input token, input coverage. Zero-quantity payment
/// legs and zero-quantity inputs produce no output.
pub fn plan_move<R>(
    inputs: &[UnspentOutput],
    payments: &[PartyAndAmount],
    change_recipient: PartyId,
    resolver: &R,
) -> Result<MovePlan, SelectionError>
where
    R: OwnershipResolver + ?Sized,
{
    let notary = invariant_single_notary(inputs)?;
    invariant_unique_refs(inputs)?;
    if !resolver.is_owned(&change_recipient) {
        return Err(SelectionError::UnauthorizedChangeRecipient(change_recipient));
    }

    // Non-empty after the notary check.
    let token = match payments.first() {
        Some(payment) => payment.amount.token.clone(),
        None => inputs[0].token().clone(),
    };
    let required = Amount::sum_of(token.clone(), payments.iter().map(|p| &p.amount))?;

    let mut groups = group_by_issuer(inputs, &token)?;
    let available: u128 = groups.iter().map(|(_, q)| u128::from(*q)).sum();
    if available < u128::from(required.quantity) {
        return Err(SelectionError::InsufficientInputs {
            required: required.quantity,
            available: u64::try_from(available).unwrap_or(u64::MAX),
        });
    }

    let mut outputs = Vec::with_capacity(payments.len() + groups.len());
    for payment in payments {
        let mut owed = payment.amount.quantity;
        while owed > 0 {
            let Some((issued, remaining)) = groups.last_mut() else {
                return Err(SelectionError::InsufficientInputs {
                    required: required.quantity,
                    available: u64::try_from(available).unwrap_or(u64::MAX),
                });
            };
            match (*remaining).cmp(&owed) {
                Ordering::Greater => {
                    outputs.push(OutputRecord::new(
                        payment.party,
                        Amount::new(owed, issued.clone()),
                        notary,
                    ));
                    *remaining -= owed;
                    owed = 0;
                }
                Ordering::Equal => {
                    outputs.push(OutputRecord::new(
                        payment.party,
                        Amount::new(owed, issued.clone()),
                        notary,
                    ));
                    owed = 0;
                    groups.pop();
                }
                Ordering::Less => {
                    outputs.push(OutputRecord::new(
                        payment.party,
                        Amount::new(*remaining, issued.clone()),
                        notary,
                    ));
                    owed -= *remaining;
                    groups.pop();
                }
            }
        }
    }

    outputs.extend(
        groups
            .into_iter()
            .filter(|(_, remaining)| *remaining > 0)
            .map(|(issued, remaining)| {
                OutputRecord::new(change_recipient, Amount::new(remaining, issued), notary)
            }),
    );

    Ok(MovePlan {
        inputs: inputs.to_vec(),
        outputs,
    })
}

/// Sum inputs per issuer, in order of first appearance.
fn group_by_issuer(
    inputs: &[UnspentOutput],
    token: &TokenType,
) -> Result<Vec<(Issued, u64)>, SelectionError> {
    let mut groups: Vec<(Issued, u64)> = Vec::new();
    for input in inputs {
        if input.token() != token {
            return Err(SelectionError::MixedType {
                expected: token.to_string(),
                found: input.token().to_string(),
            });
        }
        if input.quantity() == 0 {
            continue;
        }
        match groups.iter_mut().find(|(issued, _)| *issued == input.amount.token) {
            Some((_, total)) => {
                *total = total
                    .checked_add(input.quantity())
                    .ok_or(SelectionError::AmountOverflow)?;
            }
            None => groups.push((input.amount.token.clone(), input.quantity())),
        }
    }
    Ok(groups)
}

//! # Exit Planner
//!
//! Computes the change left over when part of a fixed input set is removed
//! from circulation.

use crate::domain::{
    invariant_single_notary, invariant_unique_refs, Amount, ExitPlan, OutputRecord, PartyId,
    SelectionError, TokenType, UnspentOutput,
};

/// Plan an exit of `amount` from `inputs`.
///
/// All inputs are expected to share one issuer; the amount is attributed to
/// it. Inputs with differing issuers fail to sum and surface `MixedType`.
pub fn plan_exit(
    inputs: &[UnspentOutput],
    amount: Amount<TokenType>,
    change_recipient: PartyId,
) -> Result<ExitPlan, SelectionError> {
    let notary = invariant_single_notary(inputs)?;
    invariant_unique_refs(inputs)?;
    let issuer = inputs[0].issuer();
    let exiting = amount.issued_by(issuer);

    let total = Amount::sum_of(exiting.token.clone(), inputs.iter().map(|i| &i.amount))?;
    if total.quantity < exiting.quantity {
        return Err(SelectionError::ExitAmountExceedsInputs {
            requested: exiting.quantity,
            available: total.quantity,
        });
    }

    let difference = total.checked_sub(&exiting)?;
    let change = (!difference.is_zero())
        .then(|| OutputRecord::new(change_recipient, difference, notary));

    Ok(ExitPlan {
        inputs: inputs.to_vec(),
        change,
    })
}

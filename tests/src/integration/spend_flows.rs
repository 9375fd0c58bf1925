//! # Spend Flow Tests
//!
//! End-to-end claim, plan and settle sequences through the service.
//!
//! ## Flows Tested:
//!
//! 1. **Spend**: generate_spend → consume inputs → create outputs
//! 2. **Rollback**: failed transaction releases its reservation
//! 3. **Exit**: claim from one issuer → plan_exit with change
//! 4. **Cancellation**: workflow cancels a claim stuck in backoff

#[cfg(test)]
mod tests {
    use crate::support::{
        fast_config, init_tracing, output, seeded_vault, usd, BANK_A, BANK_B, NOTARY, OWNER,
    };
    use qc_18_coin_selection::{
        cancellation, invariant_value_conserved, Amount, ClaimId, ClaimRequest,
        CoinSelectionApi, CoinSelectionService, InMemoryVault, PartyAndAmount, PartyId,
        SelectionConfig, SelectionEngine, SelectionError, StateRef, UnspentOutput,
    };
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::info_span;

    const ALICE: PartyId = PartyId::new([0x41; 20]);
    const BOB: PartyId = PartyId::new([0x42; 20]);

    type Service = CoinSelectionService<InMemoryVault, InMemoryVault, HashSet<PartyId>>;

    fn service(vault: &Arc<InMemoryVault>, config: SelectionConfig) -> Service {
        let engine = SelectionEngine::new(
            vault.clone(),
            vault.clone(),
            config,
            info_span!("qc-18-flow"),
        )
        .unwrap();
        let ours: HashSet<PartyId> = [OWNER].into_iter().collect();
        CoinSelectionService::new(engine, ours)
    }

    /// Settle a plan: consume its inputs and record its outputs as new state.
    fn settle(vault: &InMemoryVault, inputs: &[UnspentOutput], outputs: &[UnspentOutput]) {
        let refs: Vec<StateRef> = inputs.iter().map(|i| i.state_ref).collect();
        assert_eq!(vault.consume(&refs), refs.len());
        vault.add_outputs(outputs.iter().cloned());
    }

    // =========================================================================
    // SPEND
    // =========================================================================

    #[tokio::test]
    async fn test_spend_across_issuers_then_settle() {
        init_tracing();
        let vault = InMemoryVault::with_parties([OWNER]);
        vault.add_outputs([output(0, 60, BANK_A), output(1, 50, BANK_B)]);
        let vault = Arc::new(vault);
        let service = service(&vault, fast_config());

        let payments = vec![
            PartyAndAmount::new(ALICE, usd(80)),
            PartyAndAmount::new(BOB, usd(20)),
        ];
        let plan = service
            .generate_spend(ClaimId::new(), &payments, OWNER)
            .await
            .unwrap();

        assert_eq!(plan.input_quantity(), 110);
        assert_eq!(plan.output_quantity(), 110);
        assert!(invariant_value_conserved(&plan.inputs, &plan.outputs));

        // Last issuer group pays first: Alice gets all of B, then 30 of A.
        let alice: Vec<(u64, PartyId)> = plan
            .outputs_for(&ALICE)
            .iter()
            .map(|o| (o.amount.quantity, o.amount.issuer()))
            .collect();
        assert_eq!(alice, vec![(50, BANK_B), (30, BANK_A)]);
        let change = plan.outputs_for(&OWNER);
        assert_eq!(change.len(), 1);
        assert_eq!(change[0].amount.quantity, 10);
        assert_eq!(change[0].amount.issuer(), BANK_A);

        // The change becomes a new spendable output once the spend commits.
        let new_outputs: Vec<UnspentOutput> = plan
            .outputs
            .iter()
            .enumerate()
            .map(|(i, o)| {
                UnspentOutput::new(StateRef::new([0xCC; 32], i as u32), o.amount.clone(), o.owner, o.notary)
            })
            .collect();
        settle(&vault, &plan.inputs, &new_outputs);

        let next = service
            .claim(ClaimRequest::new(usd(10), ClaimId::new()))
            .await
            .unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].owner, OWNER);
    }

    #[tokio::test]
    async fn test_spend_with_insufficient_supply() {
        init_tracing();
        let vault = seeded_vault(&[10, 10], BANK_A);
        let service = service(&vault, fast_config().with_max_retries(2));
        let claim_id = ClaimId::new();

        let err = service
            .generate_spend(claim_id, &[PartyAndAmount::new(ALICE, usd(50))], OWNER)
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(matches!(err, SelectionError::InsufficientFunds { attempts: 2, .. }));
        assert!(vault.reserved_by(claim_id).is_empty());
    }

    // =========================================================================
    // ROLLBACK
    // =========================================================================

    #[tokio::test]
    async fn test_rollback_releases_reservation() {
        init_tracing();
        let vault = seeded_vault(&[40, 40], BANK_A);
        let service = service(&vault, fast_config().with_max_retries(1));

        let claim_id = ClaimId::new();
        let plan = service
            .generate_spend(claim_id, &[PartyAndAmount::new(ALICE, usd(70))], OWNER)
            .await
            .unwrap();
        assert_eq!(vault.reserved_by(claim_id).len(), plan.inputs.len());

        // Transaction failed downstream.
        vault.release(claim_id);

        let retry = service
            .generate_spend(ClaimId::new(), &[PartyAndAmount::new(ALICE, usd(70))], OWNER)
            .await;
        assert!(retry.is_ok());
    }

    #[tokio::test]
    async fn test_mixed_notary_claim_fails_planning() {
        init_tracing();
        let vault = InMemoryVault::with_parties([OWNER]);
        let mut foreign = output(1, 30, BANK_A);
        foreign.notary = PartyId::new([0xDD; 20]);
        vault.add_outputs([output(0, 30, BANK_A), foreign]);
        let vault = Arc::new(vault);
        let service = service(&vault, fast_config());

        let err = service
            .generate_spend(ClaimId::new(), &[PartyAndAmount::new(ALICE, usd(50))], OWNER)
            .await
            .unwrap_err();
        match err {
            SelectionError::NotaryMismatch { found } => {
                assert_eq!(found, vec![NOTARY, PartyId::new([0xDD; 20])]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    // =========================================================================
    // EXIT
    // =========================================================================

    #[tokio::test]
    async fn test_exit_from_single_issuer() {
        init_tracing();
        let vault = InMemoryVault::with_parties([OWNER]);
        vault.add_outputs([
            output(0, 70, BANK_A),
            output(1, 500, BANK_B),
            output(2, 50, BANK_A),
        ]);
        let vault = Arc::new(vault);
        let service = service(&vault, fast_config());

        let inputs = service
            .claim(ClaimRequest::new(usd(100), ClaimId::new()).with_issuer(BANK_A))
            .await
            .unwrap();
        assert!(inputs.iter().all(|i| i.issuer() == BANK_A));

        let plan = service.plan_exit(&inputs, usd(100), OWNER).unwrap();
        let change = plan.change.unwrap();
        assert_eq!(change.amount, Amount::new(20, change.amount.token.clone()));
        assert_eq!(change.amount.issuer(), BANK_A);
        assert_eq!(change.owner, OWNER);
    }

    // =========================================================================
    // CANCELLATION
    // =========================================================================

    #[tokio::test]
    async fn test_workflow_cancels_claim_in_backoff() {
        init_tracing();
        let vault = seeded_vault(&[10], BANK_A);
        let config = SelectionConfig::default().with_backoff(60_000, 600_000);
        let engine = Arc::new(
            SelectionEngine::new(vault.clone(), vault.clone(), config, info_span!("qc-18-flow"))
                .unwrap(),
        );
        let (handle, signal) = cancellation();
        let claim_id = ClaimId::new();

        let task = {
            let engine = engine.clone();
            tokio::spawn(async move {
                engine
                    .claim_with_cancel(ClaimRequest::new(usd(100), claim_id), &signal)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("cancellation must interrupt the backoff")
            .unwrap();
        assert_eq!(result.unwrap_err(), SelectionError::Cancelled(claim_id));
        assert_eq!(engine.metrics().snapshot().cancelled, 1);
    }
}

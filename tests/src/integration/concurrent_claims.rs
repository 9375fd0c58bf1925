//! # Concurrent Claim Tests
//!
//! Many claimants racing over one vault on a multi-threaded runtime.
//!
//! ## Properties Tested:
//!
//! 1. **No double claim**: returned sets from distinct claims never overlap
//! 2. **Sufficiency**: every successful claim covers its amount and is reserved
//! 3. **Exact supply**: two claimants for the whole supply never both succeed

#[cfg(test)]
mod tests {
    use crate::support::{fast_config, init_tracing, seeded_vault, usd, BANK_A};
    use qc_18_coin_selection::{
        ClaimId, ClaimRequest, InMemoryVault, SelectionConfig, SelectionEngine, SelectionError,
        StateRef, UnspentOutput,
    };
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio::task::JoinSet;
    use tracing::info_span;

    type Engine = SelectionEngine<InMemoryVault, InMemoryVault>;

    fn shared_engine(vault: &Arc<InMemoryVault>, config: SelectionConfig) -> Arc<Engine> {
        let engine = SelectionEngine::new(
            vault.clone(),
            vault.clone(),
            config,
            info_span!("qc-18-test"),
        )
        .unwrap();
        Arc::new(engine)
    }

    async fn race(
        engine: &Arc<Engine>,
        claimants: usize,
        amount: u64,
    ) -> Vec<(ClaimId, Result<Vec<UnspentOutput>, SelectionError>)> {
        let mut set = JoinSet::new();
        for _ in 0..claimants {
            let engine = engine.clone();
            set.spawn(async move {
                let claim_id = ClaimId::new();
                let result = engine.claim(ClaimRequest::new(usd(amount), claim_id)).await;
                (claim_id, result)
            });
        }

        let mut results = Vec::with_capacity(claimants);
        while let Some(joined) = set.join_next().await {
            results.push(joined.unwrap());
        }
        results
    }

    // =========================================================================
    // NO DOUBLE CLAIM
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_output_claimed_twice() {
        init_tracing();
        let vault = seeded_vault(&[10; 100], BANK_A);
        let engine = shared_engine(&vault, fast_config());

        let results = race(&engine, 16, 45).await;

        let mut seen: HashSet<StateRef> = HashSet::new();
        for (claim_id, result) in &results {
            let Ok(outputs) = result else { continue };
            for output in outputs {
                assert!(
                    seen.insert(output.state_ref),
                    "{} claimed twice",
                    output.state_ref
                );
            }

            let mut refs: Vec<StateRef> = outputs.iter().map(|o| o.state_ref).collect();
            refs.sort();
            assert_eq!(vault.reserved_by(*claim_id), refs);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ample_supply_satisfies_every_claimant() {
        init_tracing();
        // 8 claimants x 50 = 400 of 1000 available.
        let vault = seeded_vault(&[10; 100], BANK_A);
        let engine = shared_engine(&vault, fast_config());

        let results = race(&engine, 8, 50).await;

        for (_, result) in &results {
            let outputs = result.as_ref().unwrap();
            let total: u64 = outputs.iter().map(|o| o.quantity()).sum();
            assert!(total >= 50);
        }
        let snap = engine.metrics().snapshot();
        assert_eq!(snap.claims_succeeded, 8);
        assert_eq!(snap.outputs_reserved, 40);
    }

    // =========================================================================
    // EXACT SUPPLY
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_exact_supply_goes_to_one_claimant() {
        init_tracing();
        for _ in 0..10 {
            let vault = seeded_vault(&[25, 25, 25, 25], BANK_A);
            let engine = shared_engine(&vault, fast_config().with_max_retries(4));

            let results = race(&engine, 2, 100).await;

            let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
            assert_eq!(winners.len(), 1);
            let loser = results.iter().find(|(_, r)| r.is_err()).unwrap();
            assert!(matches!(
                loser.1,
                Err(SelectionError::InsufficientFunds { .. })
            ));
            assert!(vault.reserved_by(loser.0).is_empty());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_released_outputs_become_claimable() {
        init_tracing();
        let vault = seeded_vault(&[30, 30], BANK_A);
        let engine = shared_engine(&vault, fast_config());

        let first = ClaimId::new();
        engine
            .claim(ClaimRequest::new(usd(60), first))
            .await
            .unwrap();

        let blocked = shared_engine(&vault, fast_config().with_max_retries(1))
            .claim(ClaimRequest::new(usd(60), ClaimId::new()))
            .await;
        assert!(blocked.is_err());

        // Rollback of the first claimant's transaction.
        assert_eq!(vault.release(first), 2);

        let second = engine
            .claim(ClaimRequest::new(usd(60), ClaimId::new()))
            .await
            .unwrap();
        assert_eq!(second.len(), 2);
    }
}

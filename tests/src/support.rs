//! # Test Support
//!
//! Shared fixtures and one-time tracing setup.

use qc_18_coin_selection::{
    Amount, InMemoryVault, Issued, PartyId, SelectionConfig, StateRef, TokenType, UnspentOutput,
};
use std::sync::{Arc, Once};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per process.
///
/// Honors `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Party whose vault the tests select from.
pub const OWNER: PartyId = PartyId::new([0x01; 20]);
/// Default issuer.
pub const BANK_A: PartyId = PartyId::new([0x0A; 20]);
/// Second issuer.
pub const BANK_B: PartyId = PartyId::new([0x0B; 20]);
/// Default notary.
pub const NOTARY: PartyId = PartyId::new([0xEE; 20]);

/// `quantity` USD.
pub fn usd(quantity: u64) -> Amount<TokenType> {
    Amount::new(quantity, TokenType::new("USD"))
}

/// An output owned by [`OWNER`] under [`NOTARY`].
pub fn output(index: u32, quantity: u64, issuer: PartyId) -> UnspentOutput {
    let mut tx_hash = [0u8; 32];
    tx_hash[..4].copy_from_slice(&index.to_be_bytes());
    UnspentOutput::new(
        StateRef::new(tx_hash, index),
        Amount::new(quantity, Issued::new(issuer, TokenType::new("USD"))),
        OWNER,
        NOTARY,
    )
}

/// A vault owned by [`OWNER`] holding one output per quantity, issued by `issuer`.
pub fn seeded_vault(quantities: &[u64], issuer: PartyId) -> Arc<InMemoryVault> {
    let vault = InMemoryVault::with_parties([OWNER]);
    vault.add_outputs(
        quantities
            .iter()
            .enumerate()
            .map(|(i, q)| output(i as u32, *q, issuer)),
    );
    Arc::new(vault)
}

/// Short backoff so contended tests finish quickly in real time.
///
/// Each lost race means another claimant succeeded, so 32 attempts cover up
/// to 32 concurrent claimants with ample supply.
pub fn fast_config() -> SelectionConfig {
    SelectionConfig::default()
        .with_max_retries(32)
        .with_backoff(1, 8)
}

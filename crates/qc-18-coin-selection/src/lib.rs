//! # QC-18 Coin Selection
//!
//! Contended unspent output selection and output planning.
//!
//! **Subsystem ID:** 18  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Turn a pool of lockable unspent outputs into the inputs and outputs of a
//! value transfer:
//! - Claim outputs covering an amount while many callers compete for them
//! - Split claimed value across recipients and issuers, returning change
//! - Compute the change left when part of a claimed set exits circulation
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | No double claim | All-or-nothing `LockManager::reserve` |
//! | Convergence under contention | Jittered exponential backoff, `max_retries` attempts |
//! | Value conservation | Per-issuer grouping in the move planner |
//! | Single notary per plan | Checked before any output is computed |
//! | Prompt cancellation | Backoff raced against a `CancelSignal` |
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-coin-selection/
//! ├── domain/          # Amount, UnspentOutput, plans, config, errors
//! ├── algorithms/      # Accumulator, backoff, move and exit planners
//! ├── ports/           # CoinSelectionApi, QueryBackend, LockManager
//! ├── adapters/        # InMemoryVault
//! ├── engine           # SelectionEngine, ClaimRequest
//! └── service          # CoinSelectionService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod cancel;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryVault;
pub use algorithms::{backoff_delay, jittered_backoff, plan_exit, plan_move, Accumulator};
pub use cancel::{cancellation, CancelHandle, CancelSignal};
pub use domain::{
    invariant_single_notary, invariant_unique_refs, invariant_value_conserved, Amount,
    AttemptOutcome, ClaimId, ExitPlan, Hash, Issued, MovePlan, OutputRecord, PartyAndAmount,
    PartyId, SelectionConfig, SelectionError, StateRef, TokenType, UnspentOutput,
};
pub use engine::{ClaimRequest, SelectionEngine};
pub use metrics::{MetricsSnapshot, SelectionMetrics};
pub use ports::{
    CoinSelectionApi, LockFilter, LockManager, OwnershipRelevance, OwnershipResolver,
    QueryBackend, ReserveOutcome, SortOrder, StateStatus, UnspentFilter, UnspentPage,
};
pub use service::CoinSelectionService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

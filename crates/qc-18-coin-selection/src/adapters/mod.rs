//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits for coin selection.

mod in_memory_vault;

pub use in_memory_vault::InMemoryVault;

//! # Quantum-Chain Test Suite
//!
//! Cross-component tests for coin selection.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Tracing init, fixtures
//! └── integration/      # Concurrent claims, end-to-end spend flows
//!     ├── concurrent_claims.rs
//!     └── spend_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::concurrent_claims
//! cargo test -p qc-tests integration::spend_flows
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

pub mod support;

//! # Quantum-Chain Test Suite
//!
//! Unified test crate for cross-module flows.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks
//! │   └── thin_block_benchmarks.rs
//! └── src/
//!     └── integration/  # Cross-module flows
//!         └── thin_block_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests integration::
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

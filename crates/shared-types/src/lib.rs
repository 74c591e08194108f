//! # Shared Types Crate
//!
//! Chain primitives shared between the thin block relay (qc-05) and the
//! unified test suite.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Hash`, `BlockHeader` and `Transaction` are
//!   defined once and re-used by every crate in the workspace.
//! - **Deterministic Identity**: headers and transactions hash their fields
//!   with SHA-256 in a fixed order, so every node derives the same id.

pub mod entities;

pub use entities::*;

//! # Thin Block Relay Subsystem (qc-05)
//!
//! Rebuilds blocks announced as compact "stubs" (header plus transaction
//! identifiers) from locally pooled transactions, downloading only what is
//! missing. Several peers may race to deliver the same block; they share
//! one reconstruction.
//!
//! ## Architecture Role
//!
//! ```text
//! [Peer A] ──stub──→ ThinBlockWorker ──┐
//!                                      ├──→ ThinBlockManager ──→ ThinBlockBuilder
//! [Peer B] ──txs───→ ThinBlockWorker ──┘          │                    │
//!                                                 │              TxFinder (pool)
//!                                                 ↓
//!                                       ReconstructedBlock
//! ```
//!
//! ## Encodings
//!
//! | Mode | Stub lists | Request |
//! |------|------------|---------|
//! | Bloom thin | full hashes | getdata `ThinBlock` |
//! | XThin | cheap hashes | `GetXThin` message |
//! | Compact | salted short ids | getdata `CompactBlock` |
//!
//! Identifiers from all three are compared through [`ThinTx`].

pub mod adapters;
pub mod builder;
pub mod domain;
pub mod events;
pub mod manager;
pub mod ports;
pub mod worker;

pub use builder::ThinBlockBuilder;
pub use domain::*;
pub use events::*;
pub use manager::ThinBlockManager;
pub use ports::outbound::{PeerConnection, StubData, TxFinder};
pub use worker::ThinBlockWorker;

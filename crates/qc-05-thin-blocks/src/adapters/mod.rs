//! In-memory implementations of the outbound ports.
//!
//! - [`stubs`]: one `StubData` per encoding (bloom thin, xthin, compact)
//! - [`pool_finder`]: `TxFinder` over a set of pooled transactions

pub mod pool_finder;
pub mod stubs;

pub use pool_finder::PoolTxFinder;
pub use stubs::{BloomThinStub, CompactStub, StubParams, XThinStub};

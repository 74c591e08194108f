//! Protocol messages emitted by the thin block relay.

pub mod p2p;

pub use p2p::*;

//! Ports for the thin block relay.
//!
//! The relay only consumes collaborators (stub parsers, the transaction
//! pool, the peer transport); it exposes its own API directly through
//! [`ThinBlockManager`](crate::ThinBlockManager) and
//! [`ThinBlockWorker`](crate::ThinBlockWorker).

pub mod outbound;

//! # Domain Errors
//!
//! Error types for thin block relay.
//!
//! Contract violations (a stub routed to the wrong worker, a worker put to
//! work on the null hash) are not represented here: they are bugs in the
//! caller and panic.

use shared_types::Hash;
use std::fmt;
use thiserror::Error;

/// One of the three ways a [`ThinTx`](super::ThinTx) can identify a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Representation {
    /// 256-bit transaction hash.
    Full,
    /// 64-bit truncation of the full hash.
    Cheap,
    /// Salted 48-bit short id.
    Obfuscated,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Cheap => write!(f, "cheap"),
            Self::Obfuscated => write!(f, "obfuscated"),
        }
    }
}

/// Accessor misuse on a transaction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ThinTxError {
    /// The requested representation is not held by this identifier.
    #[error("{0} hash not available")]
    RepresentationUnavailable(Representation),
}

/// Malformed or inconsistent thin block data.
///
/// The caller should fall back to requesting the full block or drop the
/// offending peer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ThinBlockError {
    /// Stub arrived for a block no worker is assigned to.
    #[error("No worker assigned to block {}", hex::encode(.0))]
    NotTracked(Hash),

    /// Stub lists no transactions at all.
    #[error("Stub for block {} lists no transactions", hex::encode(.0))]
    EmptyStub(Hash),

    /// Stub lists more transactions than we are willing to reconstruct.
    #[error("Stub lists {count} transactions (max: {max})")]
    TooManyTransactions { count: usize, max: usize },

    /// Two identifiers in the same stub refer to the same transaction.
    ///
    /// Usually a cheap hash or short id collision; the block cannot be
    /// rebuilt from identifiers alone.
    #[error("Identifier collision in block {} at positions {first} and {second}", hex::encode(.block))]
    Collision {
        block: Hash,
        first: usize,
        second: usize,
    },

    /// A transaction provided in the stub matches no listed identifier.
    #[error("Provided transaction {} is not part of the block", hex::encode(.0))]
    UnexpectedTransaction(Hash),

    /// Anything else wrong with the stub.
    #[error("Malformed thin block: {0}")]
    Malformed(String),
}

//! # Core Domain Entities
//!
//! - [`PeerId`]: connection-local identifier of a remote peer
//! - [`WorkerId`]: key of a worker in the manager's registry
//! - [`ThinBlockMode`]: which compact encoding a peer speaks
//! - [`ReconstructedBlock`]: output of a finished reconstruction

use shared_types::{BlockHeader, Hash, Transaction};
use std::fmt;

/// Peer identifier, assigned when the connection is accepted.
///
/// # Example
///
/// ```rust
/// use qc_05_thin_blocks::PeerId;
///
/// let peer = PeerId::new(7);
/// assert_eq!(peer.to_string(), "peer=7");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u64);

impl PeerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer={}", self.0)
    }
}

/// Registry key handed out by the manager for every worker it tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub(crate) u64);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker#{}", self.0)
    }
}

/// Compact block encoding spoken with a peer.
///
/// Determines how a worker requests a block from its peer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ThinBlockMode {
    /// Merkle/bloom filtered blocks: full 32-byte transaction hashes.
    BloomThin,
    /// Extreme thin blocks: 8-byte cheap hashes.
    XThin,
    /// BIP152 compact blocks: salted 6-byte short ids.
    #[default]
    Compact,
}

impl fmt::Display for ThinBlockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BloomThin => write!(f, "bloom-thin"),
            Self::XThin => write!(f, "xthin"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// A block rebuilt from a stub plus pool and downloaded transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconstructedBlock {
    pub header: BlockHeader,
    /// Transactions in block order.
    pub transactions: Vec<Transaction>,
}

impl ReconstructedBlock {
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }
}

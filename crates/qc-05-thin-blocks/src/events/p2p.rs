//! P2P request types for thin block relay.

use shared_types::Hash;

/// Kind of object named in a getdata request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvKind {
    /// Full block.
    Block,
    /// Bloom filtered thin block (full transaction hashes).
    ThinBlock,
    /// BIP152 compact block (salted short ids).
    CompactBlock,
}

/// One entry of a getdata request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Inventory {
    pub kind: InvKind,
    pub hash: Hash,
}

impl Inventory {
    pub fn new(kind: InvKind, hash: Hash) -> Self {
        Self { kind, hash }
    }
}

/// Messages sent to a peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Batched getdata request, see `ThinBlockWorker::flush_requests`.
    GetData(Vec<Inventory>),
    /// Request an extreme thin block (cheap hashes).
    GetXThin { block_hash: Hash },
}

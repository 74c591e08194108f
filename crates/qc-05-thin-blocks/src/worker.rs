//! # Per-Peer Worker
//!
//! One [`ThinBlockWorker`] per connected peer. It tracks which block the peer
//! is currently delivering and forwards everything about that block to the
//! shared [`ThinBlockManager`].
//!
//! ```text
//!            set_to_work(h)
//!   ┌──────┐ ─────────────→ ┌─────────────┐
//!   │ Idle │                │ Working(h)  │ ── set_re_requesting(true)
//!   └──────┘ ←───────────── └─────────────┘
//!            set_available()
//! ```
//!
//! Registration with the manager follows the state: a working worker is
//! registered under its block, an idle one is not. Dropping the worker
//! deregisters it.

use quantum_telemetry::log_peer_event;
use shared_types::{is_null_hash, Hash, Transaction, NULL_HASH};
use std::sync::Arc;

use crate::domain::{PeerId, ThinBlockError, ThinBlockMode, ThinTx, WorkerId};
use crate::events::{InvKind, Inventory, OutboundMessage};
use crate::manager::ThinBlockManager;
use crate::ports::outbound::{PeerConnection, StubData, TxFinder};

const SUBSYSTEM: &str = "thin-blocks";

/// Thin block state machine for a single peer.
pub struct ThinBlockWorker {
    mg: Arc<ThinBlockManager>,
    id: WorkerId,
    peer: PeerId,
    mode: ThinBlockMode,
    block: Option<Hash>,
    rerequesting: bool,
}

impl ThinBlockWorker {
    /// Create an idle worker speaking the manager's preferred encoding.
    pub fn new(mg: Arc<ThinBlockManager>, peer: PeerId) -> Self {
        let mode = mg.config().preferred_mode;
        Self::with_mode(mg, peer, mode)
    }

    pub fn with_mode(mg: Arc<ThinBlockManager>, peer: PeerId, mode: ThinBlockMode) -> Self {
        let id = mg.register_worker(peer);
        Self {
            mg,
            id,
            peer,
            mode,
            block: None,
            rerequesting: false,
        }
    }

    /// Start working on `block`.
    ///
    /// # Panics
    ///
    /// If `block` is the null hash.
    pub fn set_to_work(&mut self, block: Hash) {
        assert!(!is_null_hash(&block), "cannot work on the null block");
        if self.block == Some(block) {
            return;
        }

        if self.block.is_some() {
            self.mg.del_worker(self.id, self.peer);
        }
        self.block = Some(block);
        self.rerequesting = false;
        self.mg.add_worker(block, self.id, self.peer);
        log_peer_event!(debug, SUBSYSTEM, "Worker set to work", self.peer, block = %hex::encode(block), mode = %self.mode);
    }

    /// Go idle, releasing the current block if any.
    pub fn set_available(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        self.rerequesting = false;
        self.mg.del_worker(self.id, self.peer);
        log_peer_event!(debug, SUBSYSTEM, "Worker available", self.peer, released = %hex::encode(block));
    }

    pub fn is_available(&self) -> bool {
        self.block.is_none()
    }

    /// Mark that the missing data has to be fetched again from this peer.
    pub fn set_re_requesting(&mut self, rerequesting: bool) {
        self.rerequesting = rerequesting;
    }

    pub fn is_re_requesting(&self) -> bool {
        self.rerequesting
    }

    pub fn block_hash(&self) -> Option<&Hash> {
        self.block.as_ref()
    }

    /// Hex of the current block, or the null hash's hex when idle.
    pub fn block_str(&self) -> String {
        hex::encode(self.block.unwrap_or(NULL_HASH))
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer
    }

    pub fn mode(&self) -> ThinBlockMode {
        self.mode
    }

    /// Hand a received stub to the manager.
    ///
    /// # Panics
    ///
    /// If the worker is idle or the stub is for a different block.
    pub fn build_stub(
        &self,
        stub: &dyn StubData,
        finder: &dyn TxFinder,
    ) -> Result<(), ThinBlockError> {
        let block = self.block.unwrap_or(NULL_HASH);
        assert_eq!(
            stub.header().hash(),
            block,
            "stub header does not match the block {} is working on",
            self.peer
        );
        self.mg.build_stub(stub, finder)
    }

    pub fn is_stub_built(&self) -> bool {
        self.block.is_some_and(|b| self.mg.is_stub_built(&b))
    }

    /// Offer a transaction received from the peer. `true` if it was needed.
    pub fn add_tx(&self, tx: &Transaction) -> bool {
        self.block.is_some_and(|b| self.mg.add_tx(&b, tx))
    }

    pub fn get_txs_missing(&self) -> Vec<ThinTx> {
        self.block
            .map(|b| self.mg.get_txs_missing(&b))
            .unwrap_or_default()
    }

    /// Whether no other peer is delivering the same block.
    pub fn is_only_worker(&self) -> bool {
        self.block.map_or(0, |b| self.mg.num_workers(&b)) <= 1
    }

    /// Ask the peer for `block` in this worker's encoding.
    ///
    /// Getdata entries are appended to `get_data` for the caller to batch;
    /// xthin requests go straight out on `conn`. While re-requesting the
    /// block being worked on, the full block is requested instead.
    pub fn request_block(
        &self,
        block: Hash,
        get_data: &mut Vec<Inventory>,
        conn: &mut dyn PeerConnection,
    ) {
        if self.rerequesting && self.block == Some(block) {
            log_peer_event!(debug, SUBSYSTEM, "Re-requesting full block", self.peer, block = %hex::encode(block));
            get_data.push(Inventory::new(InvKind::Block, block));
            return;
        }

        match self.mode {
            ThinBlockMode::BloomThin => get_data.push(Inventory::new(InvKind::ThinBlock, block)),
            ThinBlockMode::XThin => conn.send(OutboundMessage::GetXThin { block_hash: block }),
            ThinBlockMode::Compact => get_data.push(Inventory::new(InvKind::CompactBlock, block)),
        }
        log_peer_event!(trace, SUBSYSTEM, "Block requested", self.peer, block = %hex::encode(block), mode = %self.mode);
    }

    /// Send the batched getdata entries as one message and clear the batch.
    ///
    /// Call once per message-processing pass, after every `request_block`.
    /// Nothing is sent for an empty batch.
    pub fn flush_requests(&self, get_data: &mut Vec<Inventory>, conn: &mut dyn PeerConnection) {
        if get_data.is_empty() {
            return;
        }
        log_peer_event!(trace, SUBSYSTEM, "Flushing getdata", self.peer, entries = get_data.len());
        conn.send(OutboundMessage::GetData(std::mem::take(get_data)));
    }
}

impl Drop for ThinBlockWorker {
    fn drop(&mut self) {
        if self.block.is_some() {
            self.mg.del_worker(self.id, self.peer);
        }
    }
}

impl std::fmt::Debug for ThinBlockWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThinBlockWorker")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("mode", &self.mode)
            .field("block", &self.block.map(hex::encode))
            .field("rerequesting", &self.rerequesting)
            .finish()
    }
}

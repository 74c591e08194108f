//! # Thin Block Manager
//!
//! Owns everything shared between peers: which workers are assigned to which
//! block, and the one reconstruction per block they all feed.
//!
//! ## Architecture
//!
//! ```text
//!  [worker peer=7] ──┐
//!                    ├── block A ──→ ThinBlockBuilder (A)
//!  [worker peer=8] ──┘
//!  [worker peer=9] ───── block B ──→ ThinBlockBuilder (B)
//!  [worker peer=4] ───── idle
//! ```
//!
//! Workers hold a [`WorkerId`] key into the registry, never a reference to
//! the state itself. A single mutex guards the registry and every builder,
//! so registration changes and reconstruction progress from different peers
//! are serialized. Stubs are resolved against the finder before the lock is
//! taken to install the result.
//!
//! A block's reconstruction lives exactly as long as at least one worker is
//! assigned to it. Take a finished block out with
//! [`ThinBlockManager::take_finished`] before releasing its workers.

use parking_lot::Mutex;
use quantum_telemetry::{log_block_event, log_peer_event, subsystem_span};
use shared_types::{Hash, Transaction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::builder::ThinBlockBuilder;
use crate::domain::{PeerId, ReconstructedBlock, ThinBlockConfig, ThinBlockError, ThinTx, WorkerId};
use crate::ports::outbound::{StubData, TxFinder};

const SUBSYSTEM: &str = "thin-blocks";

#[derive(Default)]
struct BlockEntry {
    workers: HashMap<WorkerId, PeerId>,
    builder: Option<ThinBlockBuilder>,
}

#[derive(Default)]
struct Registry {
    blocks: HashMap<Hash, BlockEntry>,
    assignments: HashMap<WorkerId, Hash>,
}

impl Registry {
    /// Unassign `worker`, dropping the block's state if it was the last one.
    fn remove(&mut self, worker: WorkerId, peer: PeerId) {
        let Some(block) = self.assignments.remove(&worker) else {
            return;
        };
        let Some(entry) = self.blocks.get_mut(&block) else {
            return;
        };
        entry.workers.remove(&worker);
        log_peer_event!(debug, SUBSYSTEM, "Worker left block", peer, block = %hex::encode(block), remaining = entry.workers.len());

        if entry.workers.is_empty() {
            let missing = entry.builder.as_ref().map(ThinBlockBuilder::num_missing);
            self.blocks.remove(&block);
            log_block_event!(debug, SUBSYSTEM, "Last worker gone, dropping reconstruction", hex::encode(block), missing = ?missing);
        }
    }
}

/// Registry of per-peer workers and shared per-block reconstruction state.
///
/// Share it between connections as `Arc<ThinBlockManager>`.
pub struct ThinBlockManager {
    config: ThinBlockConfig,
    registry: Mutex<Registry>,
    next_worker: AtomicU64,
}

impl ThinBlockManager {
    pub fn new(config: ThinBlockConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(Registry::default()),
            next_worker: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ThinBlockConfig {
        &self.config
    }

    /// Allocate a registry key for a new worker. The worker starts unassigned.
    pub fn register_worker(&self, peer: PeerId) -> WorkerId {
        let id = WorkerId(self.next_worker.fetch_add(1, Ordering::Relaxed));
        log_peer_event!(trace, SUBSYSTEM, "Worker registered", peer, worker = %id);
        id
    }

    /// Assign `worker` to `block`.
    ///
    /// A worker is never assigned to two blocks: any previous assignment is
    /// removed first.
    pub fn add_worker(&self, block: Hash, worker: WorkerId, peer: PeerId) {
        let mut registry = self.registry.lock();
        if let Some(previous) = registry.assignments.get(&worker).copied() {
            if previous == block {
                return;
            }
            log_peer_event!(warn, SUBSYSTEM, "Worker still assigned elsewhere, moving it", peer, previous = %hex::encode(previous));
            registry.remove(worker, peer);
        }

        registry.assignments.insert(worker, block);
        let entry = registry.blocks.entry(block).or_default();
        entry.workers.insert(worker, peer);
        log_peer_event!(debug, SUBSYSTEM, "Worker assigned to block", peer, block = %hex::encode(block), workers = entry.workers.len());
    }

    /// Remove `worker` from whatever block it is assigned to. No-op if idle.
    pub fn del_worker(&self, worker: WorkerId, peer: PeerId) {
        self.registry.lock().remove(worker, peer);
    }

    /// Seed the reconstruction of the stub's block.
    ///
    /// The first stub wins: if another worker already built this block the
    /// call succeeds without touching the existing state.
    ///
    /// The stub and finder run without the registry lock held, so they may
    /// call back into the manager.
    pub fn build_stub(
        &self,
        stub: &dyn StubData,
        finder: &dyn TxFinder,
    ) -> Result<(), ThinBlockError> {
        let block = stub.header().hash();
        let _span = subsystem_span!("build_stub", subsystem = SUBSYSTEM, block_hash = %hex::encode(block)).entered();
        if self.has_builder(&block)? {
            log_block_event!(debug, SUBSYSTEM, "Stub already built by another worker", hex::encode(block));
            return Ok(());
        }

        let builder = ThinBlockBuilder::new(stub, finder, self.config.max_stub_transactions)
            .inspect_err(|e| {
                log_block_event!(warn, SUBSYSTEM, "Rejected thin block stub", hex::encode(block), error = %e);
            })?;

        let mut registry = self.registry.lock();
        let entry = registry
            .blocks
            .get_mut(builder.block_hash())
            .ok_or(ThinBlockError::NotTracked(block))?;
        if entry.builder.is_some() {
            log_block_event!(debug, SUBSYSTEM, "Lost stub race to another worker", hex::encode(block));
            return Ok(());
        }

        log_block_event!(
            info,
            SUBSYSTEM,
            "Thin block stub built",
            hex::encode(block),
            txs = builder.num_transactions(),
            missing = builder.num_missing()
        );
        entry.builder = Some(builder);
        Ok(())
    }

    /// Whether `block` already has a reconstruction. `NotTracked` if no
    /// worker is assigned to it.
    fn has_builder(&self, block: &Hash) -> Result<bool, ThinBlockError> {
        self.registry
            .lock()
            .blocks
            .get(block)
            .map(|e| e.builder.is_some())
            .ok_or(ThinBlockError::NotTracked(*block))
    }

    pub fn is_stub_built(&self, block: &Hash) -> bool {
        self.registry
            .lock()
            .blocks
            .get(block)
            .is_some_and(|e| e.builder.is_some())
    }

    /// Feed a downloaded transaction into the block's reconstruction.
    ///
    /// Returns whether the transaction was needed.
    pub fn add_tx(&self, block: &Hash, tx: &Transaction) -> bool {
        let mut registry = self.registry.lock();
        let Some(builder) = registry
            .blocks
            .get_mut(block)
            .and_then(|e| e.builder.as_mut())
        else {
            return false;
        };

        let used = builder.add_tx(tx);
        if used && builder.is_complete() {
            log_block_event!(info, SUBSYSTEM, "Thin block reconstructed", hex::encode(block), txs = builder.num_transactions());
        }
        used
    }

    /// Identifiers still unresolved for `block`. Empty if nothing is built.
    pub fn get_txs_missing(&self, block: &Hash) -> Vec<ThinTx> {
        self.registry
            .lock()
            .blocks
            .get(block)
            .and_then(|e| e.builder.as_ref())
            .map(ThinBlockBuilder::missing)
            .unwrap_or_default()
    }

    pub fn num_workers(&self, block: &Hash) -> usize {
        self.registry
            .lock()
            .blocks
            .get(block)
            .map_or(0, |e| e.workers.len())
    }

    pub fn is_finished(&self, block: &Hash) -> bool {
        self.registry
            .lock()
            .blocks
            .get(block)
            .and_then(|e| e.builder.as_ref())
            .is_some_and(ThinBlockBuilder::is_complete)
    }

    /// Remove and return a completed block.
    ///
    /// Workers stay assigned; release them with `set_available`.
    pub fn take_finished(&self, block: &Hash) -> Option<ReconstructedBlock> {
        let mut registry = self.registry.lock();
        let entry = registry.blocks.get_mut(block)?;
        if !entry.builder.as_ref().is_some_and(ThinBlockBuilder::is_complete) {
            return None;
        }
        entry.builder.take().and_then(ThinBlockBuilder::into_block)
    }

    /// Number of blocks with at least one assigned worker.
    pub fn tracked_blocks(&self) -> usize {
        self.registry.lock().blocks.len()
    }
}

impl Default for ThinBlockManager {
    fn default() -> Self {
        Self::new(ThinBlockConfig::default())
    }
}

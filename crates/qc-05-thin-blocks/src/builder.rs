//! # Partial Block Reconstruction
//!
//! One [`ThinBlockBuilder`] exists per block being rebuilt, shared by every
//! worker racing to deliver that block.
//!
//! ```text
//! stub ids:   [ id0 ][ id1 ][ id2 ][ id3 ][ id4 ]
//!                │      │      │      │      │
//! provided ──────┘      │      │      │      │
//! provided ─────────────┘      │      │      │
//! finder (pool) ───────────────┘      │      │
//! finder (pool) ──────────────────────┘      │
//! add_tx (downloaded) ───────────────────────┘
//! ```

use shared_types::{BlockHeader, Hash, Transaction};
use std::collections::HashMap;

use crate::domain::{ObfuscatedId, ReconstructedBlock, ThinBlockError, ThinTx};
use crate::ports::outbound::{StubData, TxFinder};

/// Strongest representation of an identifier, used to spot duplicates.
#[derive(PartialEq, Eq, Hash)]
enum IdKey {
    Full(Hash),
    Cheap(u64),
    Short(ObfuscatedId),
}

impl IdKey {
    fn of(id: &ThinTx) -> Option<Self> {
        id.full()
            .ok()
            .map(|h| Self::Full(*h))
            .or_else(|| id.cheap().ok().map(Self::Cheap))
            .or_else(|| id.obfuscated_id().map(|o| Self::Short(*o)))
    }
}

#[derive(Debug)]
struct Slot {
    id: ThinTx,
    tx: Option<Transaction>,
}

impl Slot {
    /// Fill the slot, learning the full hash on the way.
    fn fill(&mut self, tx: Transaction, tx_hash: Hash) {
        self.id.merge(&ThinTx::from_full(tx_hash));
        self.tx = Some(tx);
    }
}

/// Shared reconstruction state for one block.
#[derive(Debug)]
pub struct ThinBlockBuilder {
    header: BlockHeader,
    block_hash: Hash,
    slots: Vec<Slot>,
    missing: usize,
}

impl ThinBlockBuilder {
    /// Seed a reconstruction from a stub.
    ///
    /// Provided transactions are placed first, then every remaining slot is
    /// looked up through `finder`.
    pub fn new(
        stub: &dyn StubData,
        finder: &dyn TxFinder,
        max_transactions: usize,
    ) -> Result<Self, ThinBlockError> {
        let header = stub.header().clone();
        let block_hash = header.hash();
        let ids = stub.all_transactions();

        if ids.is_empty() {
            return Err(ThinBlockError::EmptyStub(block_hash));
        }
        if ids.len() > max_transactions {
            return Err(ThinBlockError::TooManyTransactions {
                count: ids.len(),
                max: max_transactions,
            });
        }

        let mut seen: HashMap<IdKey, usize> = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            let key = IdKey::of(id).ok_or_else(|| {
                ThinBlockError::Malformed(format!("null transaction identifier at position {index}"))
            })?;
            if let Some(first) = seen.insert(key, index) {
                return Err(ThinBlockError::Collision {
                    block: block_hash,
                    first,
                    second: index,
                });
            }
        }

        let mut builder = Self {
            header,
            block_hash,
            missing: ids.len(),
            slots: ids.into_iter().map(|id| Slot { id, tx: None }).collect(),
        };

        for tx in stub.missing_provided() {
            let tx_hash = tx.hash();
            if !builder.place(tx, tx_hash) {
                return Err(ThinBlockError::UnexpectedTransaction(tx_hash));
            }
        }

        for slot in builder.slots.iter_mut().filter(|s| s.tx.is_none()) {
            let Some(tx) = finder.find(&slot.id) else {
                continue;
            };
            let tx_hash = tx.hash();
            if slot.id.equals_hash(&tx_hash).is_not_equal() {
                tracing::warn!(
                    block_hash = %hex::encode(block_hash),
                    id = %slot.id,
                    tx_hash = %hex::encode(tx_hash),
                    "Finder returned a transaction that does not match, ignoring"
                );
                continue;
            }
            slot.fill(tx, tx_hash);
            builder.missing -= 1;
        }

        Ok(builder)
    }

    pub fn block_hash(&self) -> &Hash {
        &self.block_hash
    }

    pub fn num_transactions(&self) -> usize {
        self.slots.len()
    }

    pub fn num_missing(&self) -> usize {
        self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing == 0
    }

    /// Offer a downloaded transaction.
    ///
    /// Returns `true` if it filled a slot. Transactions not in the block, or
    /// already delivered by another peer, return `false`.
    pub fn add_tx(&mut self, tx: &Transaction) -> bool {
        self.place(tx.clone(), tx.hash())
    }

    /// Identifiers of the transactions still missing, in block order.
    pub fn missing(&self) -> Vec<ThinTx> {
        self.slots
            .iter()
            .filter(|s| s.tx.is_none())
            .map(|s| s.id)
            .collect()
    }

    /// Consume a complete builder into the block. `None` while incomplete.
    pub fn into_block(self) -> Option<ReconstructedBlock> {
        if !self.is_complete() {
            return None;
        }
        let transactions = self.slots.into_iter().filter_map(|s| s.tx).collect();
        Some(ReconstructedBlock {
            header: self.header,
            transactions,
        })
    }

    fn place(&mut self, tx: Transaction, tx_hash: Hash) -> bool {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.tx.is_none() && s.id.equals_hash(&tx_hash).is_equal());

        match slot {
            Some(slot) => {
                slot.fill(tx, tx_hash);
                self.missing -= 1;
                true
            }
            None => false,
        }
    }
}

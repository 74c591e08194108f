//! Transaction finder over an in-memory pool.

use parking_lot::Mutex;
use shared_types::{Hash, Transaction};
use std::collections::HashMap;

use crate::domain::{cheap_hash, short_id, ThinTx};
use crate::ports::outbound::TxFinder;

/// Short ids of every pooled transaction under one pair of salts.
#[derive(Debug)]
struct ShortIdIndex {
    salts: (u64, u64),
    ids: HashMap<u64, Vec<Hash>>,
}

/// Pool of known transactions, indexed by full and cheap hash.
///
/// Short ids are salted per block, so their index is built on the first
/// lookup under new salts and kept until the salts or the pool change.
/// Resolving a compact stub hashes the pool once, not once per id.
///
/// Lookups only answer when exactly one pooled transaction matches. An
/// ambiguous cheap hash or short id is reported as not found so the
/// transaction gets downloaded instead of guessed.
#[derive(Debug, Default)]
pub struct PoolTxFinder {
    by_hash: HashMap<Hash, Transaction>,
    by_cheap: HashMap<u64, Vec<Hash>>,
    by_short_id: Mutex<Option<ShortIdIndex>>,
}

impl PoolTxFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transaction. Returns `false` if it was already pooled.
    pub fn insert(&mut self, tx: Transaction) -> bool {
        let tx_hash = tx.hash();
        if self.by_hash.contains_key(&tx_hash) {
            return false;
        }
        self.by_cheap
            .entry(cheap_hash(&tx_hash))
            .or_default()
            .push(tx_hash);
        self.by_hash.insert(tx_hash, tx);
        *self.by_short_id.get_mut() = None;
        true
    }

    pub fn remove(&mut self, tx_hash: &Hash) -> Option<Transaction> {
        let tx = self.by_hash.remove(tx_hash)?;
        *self.by_short_id.get_mut() = None;
        let cheap = cheap_hash(tx_hash);
        if let Some(bucket) = self.by_cheap.get_mut(&cheap) {
            bucket.retain(|h| h != tx_hash);
            if bucket.is_empty() {
                self.by_cheap.remove(&cheap);
            }
        }
        Some(tx)
    }

    pub fn contains(&self, tx_hash: &Hash) -> bool {
        self.by_hash.contains_key(tx_hash)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    fn find_short_id(&self, id: u64, salts: (u64, u64)) -> Option<Transaction> {
        let mut cache = self.by_short_id.lock();
        if !cache.as_ref().is_some_and(|index| index.salts == salts) {
            let mut ids: HashMap<u64, Vec<Hash>> = HashMap::with_capacity(self.by_hash.len());
            for tx_hash in self.by_hash.keys() {
                ids.entry(short_id(salts.0, salts.1, tx_hash))
                    .or_default()
                    .push(*tx_hash);
            }
            *cache = Some(ShortIdIndex { salts, ids });
        }
        let index = cache.as_ref()?;
        self.unique(index.ids.get(&id)?.iter())
    }

    fn unique<'a>(&self, mut candidates: impl Iterator<Item = &'a Hash>) -> Option<Transaction> {
        let first = candidates.next()?;
        if candidates.next().is_some() {
            return None;
        }
        self.by_hash.get(first).cloned()
    }
}

impl TxFinder for PoolTxFinder {
    fn find(&self, id: &ThinTx) -> Option<Transaction> {
        if let Ok(full) = id.full() {
            return self.by_hash.get(full).cloned();
        }
        if let Ok(cheap) = id.cheap() {
            return self.unique(self.by_cheap.get(&cheap)?.iter());
        }
        if let Some(obf) = id.obfuscated_id() {
            return self.find_short_id(obf.id, (obf.idk0, obf.idk1));
        }
        None
    }
}

impl FromIterator<Transaction> for PoolTxFinder {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        let mut pool = Self::new();
        for tx in iter {
            pool.insert(tx);
        }
        pool
    }
}

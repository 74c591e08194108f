//! Parsed thin block stubs, one per encoding.
//!
//! Each stub lists every transaction of the block by identifier and carries
//! the prefilled transactions in full. Building a stub from a full block is
//! what the sending side does; the receiving side only reads it through
//! [`StubData`].

use shared_types::{BlockHeader, Hash, Transaction};

use crate::domain::{cheap_hash, short_id, short_id_salts, ThinTx};
use crate::ports::outbound::StubData;

/// Parameters for building a stub from a full block.
#[derive(Clone, Copy)]
pub struct StubParams<'a> {
    /// Header of the block
    pub header: &'a BlockHeader,
    /// Transactions in block order
    pub transactions: &'a [Transaction],
    /// Indices of transactions to send in full (out of range ignored)
    pub prefill_indices: &'a [usize],
}

impl StubParams<'_> {
    fn tx_hashes(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::hash).collect()
    }

    fn prefilled(&self) -> Vec<Transaction> {
        self.prefill_indices
            .iter()
            .filter_map(|&i| self.transactions.get(i).cloned())
            .collect()
    }
}

/// Bloom filtered thin block: full transaction hashes.
#[derive(Clone, Debug)]
pub struct BloomThinStub {
    pub header: BlockHeader,
    pub tx_hashes: Vec<Hash>,
    pub prefilled: Vec<Transaction>,
}

impl BloomThinStub {
    pub fn from_transactions(params: StubParams<'_>) -> Self {
        Self {
            header: params.header.clone(),
            tx_hashes: params.tx_hashes(),
            prefilled: params.prefilled(),
        }
    }
}

impl StubData for BloomThinStub {
    fn header(&self) -> &BlockHeader {
        &self.header
    }

    fn all_transactions(&self) -> Vec<ThinTx> {
        self.tx_hashes.iter().copied().map(ThinTx::from_full).collect()
    }

    fn missing_provided(&self) -> Vec<Transaction> {
        self.prefilled.clone()
    }
}

/// Extreme thin block: 64-bit cheap hashes.
#[derive(Clone, Debug)]
pub struct XThinStub {
    pub header: BlockHeader,
    pub cheap_hashes: Vec<u64>,
    pub prefilled: Vec<Transaction>,
}

impl XThinStub {
    pub fn from_transactions(params: StubParams<'_>) -> Self {
        Self {
            header: params.header.clone(),
            cheap_hashes: params.tx_hashes().iter().map(cheap_hash).collect(),
            prefilled: params.prefilled(),
        }
    }
}

impl StubData for XThinStub {
    fn header(&self) -> &BlockHeader {
        &self.header
    }

    fn all_transactions(&self) -> Vec<ThinTx> {
        self.cheap_hashes.iter().copied().map(ThinTx::from_cheap).collect()
    }

    fn missing_provided(&self) -> Vec<Transaction> {
        self.prefilled.clone()
    }
}

/// BIP152 compact block: 48-bit short ids salted per block and nonce.
#[derive(Clone, Debug)]
pub struct CompactStub {
    pub header: BlockHeader,
    /// Picked by the sender, mixed into the salts.
    pub nonce: u64,
    pub short_ids: Vec<u64>,
    pub prefilled: Vec<Transaction>,
}

impl CompactStub {
    pub fn from_transactions(params: StubParams<'_>, nonce: u64) -> Self {
        let (k0, k1) = short_id_salts(params.header, nonce);
        Self {
            header: params.header.clone(),
            nonce,
            short_ids: params
                .tx_hashes()
                .iter()
                .map(|h| short_id(k0, k1, h))
                .collect(),
            prefilled: params.prefilled(),
        }
    }

    /// Salts the short ids were computed under.
    pub fn salts(&self) -> (u64, u64) {
        short_id_salts(&self.header, self.nonce)
    }
}

impl StubData for CompactStub {
    fn header(&self) -> &BlockHeader {
        &self.header
    }

    fn all_transactions(&self) -> Vec<ThinTx> {
        let (k0, k1) = self.salts();
        self.short_ids
            .iter()
            .map(|&id| ThinTx::from_obfuscated(id, k0, k1))
            .collect()
    }

    fn missing_provided(&self) -> Vec<Transaction> {
        self.prefilled.clone()
    }
}

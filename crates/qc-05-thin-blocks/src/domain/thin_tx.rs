//! # Transaction Identifiers
//!
//! Every thin block encoding names transactions differently:
//!
//! | Encoding | Identifier | Size |
//! |----------|------------|------|
//! | Bloom thin | full hash | 32 bytes |
//! | XThin | cheap hash (hash prefix) | 8 bytes |
//! | Compact | salted short id | 6 bytes |
//!
//! [`ThinTx`] holds whichever of these are known for one transaction and
//! compares identifiers across encodings. Some pairs cannot be compared at
//! all (short ids under different salts), so comparison yields a
//! [`TxEquality`] rather than a `bool`.

use shared_types::{is_null_hash, Hash};
use std::fmt;

use super::errors::{Representation, ThinTxError};
use super::services::{cheap_hash, short_id};

/// Outcome of comparing two transaction identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxEquality {
    /// Identifiers refer to the same transaction.
    ///
    /// For cheap hashes and short ids this is probabilistic.
    Equal,
    /// Identifiers provably refer to different transactions.
    NotEqual,
    /// Not enough shared information to decide either way.
    Indeterminate,
}

impl TxEquality {
    pub fn is_equal(self) -> bool {
        self == Self::Equal
    }

    pub fn is_not_equal(self) -> bool {
        self == Self::NotEqual
    }

    pub fn is_indeterminate(self) -> bool {
        self == Self::Indeterminate
    }
}

impl From<bool> for TxEquality {
    fn from(equal: bool) -> Self {
        if equal {
            Self::Equal
        } else {
            Self::NotEqual
        }
    }
}

/// Salted short id together with the salts it was derived under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObfuscatedId {
    pub id: u64,
    pub idk0: u64,
    pub idk1: u64,
}

impl ObfuscatedId {
    /// Whether `full` hashes to this id under our salts.
    fn matches(&self, full: &Hash) -> bool {
        self.id == short_id(self.idk0, self.idk1, full)
    }

    fn same_salts(&self, other: &ObfuscatedId) -> bool {
        self.idk0 == other.idk0 && self.idk1 == other.idk1
    }
}

/// Identity of a transaction as far as we know it.
///
/// `PartialEq` is structural (same representations held). Use
/// [`ThinTx::equals`] to ask whether two identifiers name the same
/// transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ThinTx {
    full: Option<Hash>,
    /// Zero means absent.
    cheap: u64,
    obfuscated: Option<ObfuscatedId>,
}

impl ThinTx {
    /// Identifier holding nothing.
    pub fn null() -> Self {
        Self::default()
    }

    /// Identifier from a full hash. The cheap hash is derived alongside.
    ///
    /// The all-zero hash is the null hash and yields a null identifier.
    pub fn from_full(hash: Hash) -> Self {
        if is_null_hash(&hash) {
            return Self::null();
        }
        Self {
            full: Some(hash),
            cheap: cheap_hash(&hash),
            obfuscated: None,
        }
    }

    /// Identifier from a cheap hash. Zero yields a null identifier.
    pub fn from_cheap(cheap: u64) -> Self {
        Self {
            full: None,
            cheap,
            obfuscated: None,
        }
    }

    /// Identifier from a short id and the salts it was derived under.
    ///
    /// A zero id yields a null identifier; salts are kept only with an id.
    pub fn from_obfuscated(id: u64, idk0: u64, idk1: u64) -> Self {
        Self {
            full: None,
            cheap: 0,
            obfuscated: (id != 0).then_some(ObfuscatedId { id, idk0, idk1 }),
        }
    }

    pub fn is_null(&self) -> bool {
        !self.has_full() && !self.has_cheap() && !self.has_obfuscated()
    }

    pub fn has_full(&self) -> bool {
        self.full.is_some()
    }

    pub fn has_cheap(&self) -> bool {
        self.cheap != 0
    }

    pub fn has_obfuscated(&self) -> bool {
        self.obfuscated.is_some()
    }

    pub fn full(&self) -> Result<&Hash, ThinTxError> {
        self.full
            .as_ref()
            .ok_or(ThinTxError::RepresentationUnavailable(Representation::Full))
    }

    pub fn cheap(&self) -> Result<u64, ThinTxError> {
        if self.has_cheap() {
            Ok(self.cheap)
        } else {
            Err(ThinTxError::RepresentationUnavailable(
                Representation::Cheap,
            ))
        }
    }

    /// The short id (without salts).
    pub fn obfuscated(&self) -> Result<u64, ThinTxError> {
        self.obfuscated
            .map(|o| o.id)
            .ok_or(ThinTxError::RepresentationUnavailable(
                Representation::Obfuscated,
            ))
    }

    /// The short id together with its salts.
    pub fn obfuscated_id(&self) -> Option<&ObfuscatedId> {
        self.obfuscated.as_ref()
    }

    /// Fold in what `other` knows, given that both name the same transaction.
    ///
    /// Full dominates cheap dominates obfuscated. Nothing already present is
    /// dropped; the cheap hash is replaced only when a full hash arrives,
    /// since the full hash carries its own cheap derivation.
    pub fn merge(&mut self, other: &ThinTx) {
        if self.has_full() {
            return;
        }

        if other.has_full() {
            self.full = other.full;
            self.cheap = other.cheap;
            return;
        }

        if !self.has_cheap() && other.has_cheap() {
            self.cheap = other.cheap;
        }

        if self.has_obfuscated() {
            return;
        }

        if other.has_obfuscated() {
            self.obfuscated = other.obfuscated;
        }
    }

    /// Compare two identifiers.
    ///
    /// Representations are tried strongest first. Short ids under different
    /// salts, or a short id against a bare cheap hash, are `Indeterminate`.
    ///
    /// # Panics
    ///
    /// If no comparison applies, which only happens when the identifier's
    /// internal state is inconsistent.
    pub fn equals(&self, other: &ThinTx) -> TxEquality {
        if self.is_null() && other.is_null() {
            return TxEquality::Equal;
        }

        if self.is_null() || other.is_null() {
            return TxEquality::NotEqual;
        }

        if let (Some(a), Some(b)) = (&self.full, &other.full) {
            return (a == b).into();
        }

        if self.has_cheap() && other.has_cheap() {
            return (self.cheap == other.cheap).into();
        }

        if let (Some(obf), Some(full)) = (&self.obfuscated, &other.full) {
            return obf.matches(full).into();
        }

        if let (Some(full), Some(obf)) = (&self.full, &other.obfuscated) {
            return obf.matches(full).into();
        }

        match (&self.obfuscated, &other.obfuscated) {
            (Some(a), Some(b)) if !a.same_salts(b) => TxEquality::Indeterminate,
            (Some(a), Some(b)) => (a.id == b.id).into(),
            (Some(_), None) | (None, Some(_)) => TxEquality::Indeterminate,
            (None, None) => unreachable!("ThinTx::equals: no comparable representation ({self} vs {other})"),
        }
    }

    /// Compare against a full transaction hash.
    pub fn equals_hash(&self, hash: &Hash) -> TxEquality {
        self.equals(&ThinTx::from_full(*hash))
    }
}

impl fmt::Display for ThinTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "null");
        }
        let mut sep = "";
        if let Some(full) = &self.full {
            write!(f, "full:{}", hex::encode(full))?;
            sep = " ";
        }
        if self.has_cheap() {
            write!(f, "{sep}cheap:{:016x}", self.cheap)?;
            sep = " ";
        }
        if let Some(obf) = &self.obfuscated {
            write!(f, "{sep}obf:{:012x}@{:x}/{:x}", obf.id, obf.idk0, obf.idk1)?;
        }
        Ok(())
    }
}

//! Hash derivations shared by the thin block encodings.

use sha2::{Digest, Sha256};
use shared_types::{BlockHeader, Hash};
use siphasher::sip::SipHasher24;
use std::hash::Hasher;

/// Short ids keep the low 48 bits of the SipHash output.
pub const SHORT_ID_MASK: u64 = 0xffff_ffff_ffff;

/// Derive the 64-bit cheap hash of a transaction.
///
/// Formula: cheap = LE64(tx_hash\[0:8\])
pub fn cheap_hash(tx_hash: &Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&tx_hash[..8]);
    u64::from_le_bytes(bytes)
}

/// Calculate the salted short transaction id.
///
/// Formula: short_id = SipHash-2-4(k0, k1, tx_hash) & 0xffff_ffff_ffff
///
/// Reference: BIP152 (Bitcoin Improvement Proposal 152)
pub fn short_id(idk0: u64, idk1: u64, tx_hash: &Hash) -> u64 {
    let mut hasher = SipHasher24::new_with_keys(idk0, idk1);
    hasher.write(tx_hash);
    hasher.finish() & SHORT_ID_MASK
}

/// Derive the short id salts for a block.
///
/// Formula: (k0, k1) = SHA-256(header_hash || LE64(nonce))\[0:16\]
///
/// The sender picks a fresh nonce per stub so ids cannot be precomputed.
pub fn short_id_salts(header: &BlockHeader, nonce: u64) -> (u64, u64) {
    let mut hasher = Sha256::new();
    hasher.update(header.hash());
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();

    let mut k0 = [0u8; 8];
    let mut k1 = [0u8; 8];
    k0.copy_from_slice(&digest[..8]);
    k1.copy_from_slice(&digest[8..16]);
    (u64::from_le_bytes(k0), u64::from_le_bytes(k1))
}

//! Hash functions used for addresses, selectors and transaction ids.

use sha3::{Digest, Keccak256};

/// Computes the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

//! Hashing utilities
//!
//! SHA-256 and HASH160 (RIPEMD-160 of SHA-256) used to derive addresses
//! for key pairs and for the custody wallet.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// RIPEMD-160 of SHA-256, always 20 bytes
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}

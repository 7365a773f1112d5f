//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 / HASH160 hashing
//! - secp256k1 key pairs used to mint owner identities
//! - The `Address` identity type

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{Address, AddressError, ADDRESS_LEN};
pub use hash::{hash160, sha256, sha256_hex};
pub use keys::{public_key_to_address, KeyError, KeyPair};

//! secp256k1 key management
//!
//! Owners are ordinary accounts; a key pair is only used here to mint a
//! fresh, collision-free identity for them.

use rand::rngs::OsRng;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::address::Address;
use super::hash::hash160;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Account address of this key pair
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }
}

/// Derive an account address: HASH160 of the compressed public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    Address::from_bytes(hash160(&public_key.serialize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert_eq!(kp.private_key_hex().len(), 64);
        assert_eq!(kp.public_key_hex().len(), 66);
        assert!(!kp.address().is_zero());
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let private_hex = kp1.private_key_hex();

        let kp2 = KeyPair::from_private_key_hex(&private_hex).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            KeyPair::from_private_key_hex("not hex"),
            Err(KeyError::InvalidPrivateKey)
        ));
        // All-zero scalar is outside the curve order
        assert!(KeyPair::from_private_key_hex(&"00".repeat(32)).is_err());
    }

    #[test]
    fn test_distinct_addresses() {
        let a = KeyPair::generate().address();
        let b = KeyPair::generate().address();
        assert_ne!(a, b);
    }
}

//! Account identities
//!
//! Every participant (owner, depositor, payout target, the custody wallet
//! itself) is identified by a 20-byte address rendered as `0x`-prefixed hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Errors raised while parsing an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid address length: expected {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),
}

/// A 20-byte account identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null identity. Never a valid owner.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Wrap raw address bytes
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the address
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Whether this is the null identity
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Short form for log lines (`0x1234…abcd`)
    pub fn short(&self) -> String {
        let full = self.to_string();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }

        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let addr = Address::from_bytes([0xab; ADDRESS_LEN]);
        let text = addr.to_string();

        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Address>().unwrap(), addr);

        // Prefix and case are optional
        let upper = text[2..].to_uppercase();
        assert_eq!(upper.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(AddressError::InvalidLength(2))
        ));
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_zero_address() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::from_bytes([1; ADDRESS_LEN]).is_zero());
        assert_eq!(
            "0x0000000000000000000000000000000000000000"
                .parse::<Address>()
                .unwrap(),
            Address::ZERO
        );
    }

    #[test]
    fn test_serde_as_string() {
        let addr = Address::from_bytes([7; ADDRESS_LEN]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}

//! Wallet deployment configuration
//!
//! A wallet is deployed from an owner list and an approval threshold, given
//! either on the command line or as a JSON file:
//!
//! ```json
//! {
//!   "owners": ["0x…", "0x…", "0x…"],
//!   "required_approvals": 2,
//!   "label": "Treasury"
//! }
//! ```

use crate::crypto::{Address, AddressError};
use crate::multisig::{OwnerRegistry, WalletError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid owner address '{input}': {source}")]
    InvalidAddress {
        input: String,
        source: AddressError,
    },
    #[error("Invalid wallet configuration: {0}")]
    Invalid(#[from] WalletError),
}

/// Owners and threshold a wallet is created with
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletConfig {
    /// Owner addresses
    pub owners: Vec<Address>,
    /// Minimum approvals required (M in M-of-N)
    pub required_approvals: usize,
    /// Optional human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

impl WalletConfig {
    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Save this configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Build a configuration from a comma-separated owner list
    pub fn from_owner_list(
        owners: &str,
        required_approvals: usize,
        label: Option<String>,
    ) -> Result<Self, ConfigError> {
        let owners = owners
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Address>()
                    .map_err(|source| ConfigError::InvalidAddress {
                        input: s.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            owners,
            required_approvals,
            label,
        })
    }

    /// Run the same checks wallet construction would
    pub fn validate(&self) -> Result<(), ConfigError> {
        OwnerRegistry::new(self.owners.clone(), self.required_approvals)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[test]
    fn test_from_owner_list() {
        let list = format!("{}, {},{}", addr(1), addr(2), addr(3));
        let config = WalletConfig::from_owner_list(&list, 2, None).unwrap();

        assert_eq!(config.owners, vec![addr(1), addr(2), addr(3)]);
        assert_eq!(config.required_approvals, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_owner_in_list() {
        let list = format!("{},nope", addr(1));
        assert!(matches!(
            WalletConfig::from_owner_list(&list, 1, None),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_validate() {
        let config = WalletConfig {
            owners: vec![addr(1), addr(1)],
            required_approvals: 1,
            label: None,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid(WalletError::InvalidConstructorArgs(_)))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("wallet-config.json");

        let config = WalletConfig {
            owners: vec![addr(1), addr(2)],
            required_approvals: 2,
            label: Some("Ops".to_string()),
        };
        config.save(&path).unwrap();

        let loaded = WalletConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_label_is_optional() {
        let json = format!(
            r#"{{"owners": ["{}"], "required_approvals": 1}}"#,
            addr(5)
        );
        let config: WalletConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.label, None);
    }
}

//! Owner registry
//!
//! Fixed M-of-N membership: the owner set and the approval threshold are
//! validated once at construction and never change afterwards.

use crate::crypto::Address;
use crate::multisig::error::{WalletError, WalletResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Serialized form of the registry. Deserialization goes back through
/// [`OwnerRegistry::new`] so persisted state is re-validated.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RegistryParts {
    owners: Vec<Address>,
    required_approvals: usize,
}

/// Immutable owner set and approval threshold
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistryParts", into = "RegistryParts")]
pub struct OwnerRegistry {
    /// Owners in construction order
    owners: Vec<Address>,
    /// Membership index
    index: HashSet<Address>,
    /// Minimum approvals required to execute (M in M-of-N)
    required_approvals: usize,
}

impl OwnerRegistry {
    /// Create a new registry
    ///
    /// # Errors
    /// Returns `InvalidConstructorArgs` if `owners` is empty, contains the zero
    /// address or a duplicate, or if `required_approvals` is outside `1..=owners.len()`.
    pub fn new(owners: Vec<Address>, required_approvals: usize) -> WalletResult<Self> {
        if owners.is_empty() {
            return Err(WalletError::InvalidConstructorArgs(
                "owners required".to_string(),
            ));
        }

        if required_approvals == 0 || required_approvals > owners.len() {
            return Err(WalletError::InvalidConstructorArgs(format!(
                "required approvals {} must be between 1 and {}",
                required_approvals,
                owners.len()
            )));
        }

        let mut index = HashSet::with_capacity(owners.len());
        for owner in &owners {
            if owner.is_zero() {
                return Err(WalletError::InvalidConstructorArgs(
                    "zero address cannot be an owner".to_string(),
                ));
            }
            if !index.insert(*owner) {
                return Err(WalletError::InvalidConstructorArgs(format!(
                    "duplicate owner {}",
                    owner
                )));
            }
        }

        Ok(Self {
            owners,
            index,
            required_approvals,
        })
    }

    /// Check if an address is one of the owners
    pub fn is_owner(&self, address: &Address) -> bool {
        self.index.contains(address)
    }

    /// Authorization guard run at the top of every mutating entry point
    pub fn ensure_owner(&self, caller: &Address) -> WalletResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            log::debug!("Rejected call from non-owner {}", caller);
            Err(WalletError::NotOwner(*caller))
        }
    }

    /// Get the threshold (M)
    pub fn required_approvals(&self) -> usize {
        self.required_approvals
    }

    /// Owners in construction order
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// Get the total owner count (N)
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.required_approvals, self.owners.len())
    }
}

impl TryFrom<RegistryParts> for OwnerRegistry {
    type Error = WalletError;

    fn try_from(parts: RegistryParts) -> Result<Self, Self::Error> {
        Self::new(parts.owners, parts.required_approvals)
    }
}

impl From<OwnerRegistry> for RegistryParts {
    fn from(registry: OwnerRegistry) -> Self {
        Self {
            owners: registry.owners,
            required_approvals: registry.required_approvals,
        }
    }
}

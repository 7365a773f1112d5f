//! Approval bookkeeping
//!
//! Tracks which owners currently endorse which transaction. The tracker only
//! maintains the `(id, owner)` relation; ownership and transaction-state
//! checks happen in the wallet entry points before it is touched.

use crate::crypto::Address;
use crate::multisig::error::{WalletError, WalletResult};
use crate::multisig::TxId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-transaction, per-owner approval relation
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApprovalTracker {
    approvals: BTreeMap<TxId, BTreeSet<Address>>,
}

impl ApprovalTracker {
    pub fn new() -> Self {
        Self {
            approvals: BTreeMap::new(),
        }
    }

    /// Record an approval
    pub(crate) fn insert(&mut self, id: TxId, owner: Address) -> WalletResult<()> {
        if !self.approvals.entry(id).or_default().insert(owner) {
            return Err(WalletError::AlreadyApproved { id, owner });
        }
        Ok(())
    }

    /// Withdraw an approval
    pub(crate) fn remove(&mut self, id: TxId, owner: Address) -> WalletResult<()> {
        let removed = match self.approvals.get_mut(&id) {
            Some(owners) => {
                let removed = owners.remove(&owner);
                if owners.is_empty() {
                    self.approvals.remove(&id);
                }
                removed
            }
            None => false,
        };

        if !removed {
            return Err(WalletError::NotApproved { id, owner });
        }
        Ok(())
    }

    /// Check whether `owner` currently approves `id`
    pub fn is_approved(&self, id: TxId, owner: &Address) -> bool {
        self.approvals
            .get(&id)
            .map(|owners| owners.contains(owner))
            .unwrap_or(false)
    }

    /// Number of owners currently approving `id`
    pub fn count(&self, id: TxId) -> usize {
        self.approvals.get(&id).map(BTreeSet::len).unwrap_or(0)
    }

    /// Owners currently approving `id`, in address order
    pub fn approvers(&self, id: TxId) -> Vec<Address> {
        self.approvals
            .get(&id)
            .map(|owners| owners.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::from_bytes([n; 20])
    }

    #[test]
    fn test_approve_and_count() {
        let mut tracker = ApprovalTracker::new();

        tracker.insert(0, addr(1)).unwrap();
        tracker.insert(0, addr(2)).unwrap();
        tracker.insert(1, addr(1)).unwrap();

        assert_eq!(tracker.count(0), 2);
        assert_eq!(tracker.count(1), 1);
        assert_eq!(tracker.count(7), 0);
        assert!(tracker.is_approved(0, &addr(2)));
        assert!(!tracker.is_approved(1, &addr(2)));
        assert_eq!(tracker.approvers(0), vec![addr(1), addr(2)]);
    }

    #[test]
    fn test_duplicate_approval_rejected() {
        let mut tracker = ApprovalTracker::new();
        tracker.insert(0, addr(1)).unwrap();

        assert_eq!(
            tracker.insert(0, addr(1)),
            Err(WalletError::AlreadyApproved {
                id: 0,
                owner: addr(1)
            })
        );
        assert_eq!(tracker.count(0), 1);
    }

    #[test]
    fn test_revoke() {
        let mut tracker = ApprovalTracker::new();

        assert_eq!(
            tracker.remove(0, addr(1)),
            Err(WalletError::NotApproved {
                id: 0,
                owner: addr(1)
            })
        );

        tracker.insert(0, addr(1)).unwrap();
        tracker.remove(0, addr(1)).unwrap();
        assert!(!tracker.is_approved(0, &addr(1)));
        assert_eq!(tracker.count(0), 0);

        // Approving again after a revoke is allowed
        tracker.insert(0, addr(1)).unwrap();
        assert!(tracker.is_approved(0, &addr(1)));
    }

    #[test]
    fn test_revoke_other_owner_rejected() {
        let mut tracker = ApprovalTracker::new();
        tracker.insert(3, addr(1)).unwrap();

        assert!(tracker.remove(3, addr(2)).is_err());
        assert_eq!(tracker.count(3), 1);
    }
}

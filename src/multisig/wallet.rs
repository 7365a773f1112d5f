//! Multi-signature custody wallet
//!
//! Holds a native-currency balance that only leaves the wallet once enough
//! owners have approved a submitted transaction. All mutation goes through
//! `submit`, `approve`, `revoke`, `execute` and the deposit path; each takes
//! `&mut self`, so one operation always completes before the next starts.

use crate::config::WalletConfig;
use crate::crypto::{hash160, Address};
use crate::multisig::approval::ApprovalTracker;
use crate::multisig::error::{WalletError, WalletResult};
use crate::multisig::events::{EventKind, EventLog, WalletEvent};
use crate::multisig::registry::OwnerRegistry;
use crate::multisig::transaction::{Transaction, TransactionLedger};
use crate::multisig::{Amount, TxId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A multi-signature wallet
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiSigWallet {
    /// Custody address (derived from the owner set and threshold)
    pub(super) address: Address,
    /// Optional human-readable label
    pub(super) label: Option<String>,
    pub(super) registry: OwnerRegistry,
    pub(super) ledger: TransactionLedger,
    pub(super) approvals: ApprovalTracker,
    /// Custodied balance in base units
    pub(super) balance: Amount,
    pub(super) events: EventLog,
    /// Creation timestamp
    pub(super) created_at: DateTime<Utc>,
}

impl MultiSigWallet {
    /// Create a new wallet with a fixed owner set
    ///
    /// # Errors
    /// `InvalidConstructorArgs` if the owner set or threshold is invalid.
    pub fn new(owners: Vec<Address>, required_approvals: usize) -> WalletResult<Self> {
        let registry = OwnerRegistry::new(owners, required_approvals)?;
        let address = Self::generate_address(&registry);

        log::info!(
            "Multisig wallet {} created ({})",
            address,
            registry.description()
        );

        Ok(Self {
            address,
            label: None,
            registry,
            ledger: TransactionLedger::new(),
            approvals: ApprovalTracker::new(),
            balance: 0,
            events: EventLog::new(),
            created_at: Utc::now(),
        })
    }

    /// Create a wallet from a deployment configuration
    pub fn from_config(config: &WalletConfig) -> WalletResult<Self> {
        let mut wallet = Self::new(config.owners.clone(), config.required_approvals)?;
        wallet.label = config.label.clone();
        Ok(wallet)
    }

    /// Derive the custody address
    ///
    /// Address = HASH160("multisig" || threshold || sorted owners)
    fn generate_address(registry: &OwnerRegistry) -> Address {
        let mut sorted_owners = registry.owners().to_vec();
        sorted_owners.sort();

        let mut data = b"multisig".to_vec();
        data.extend_from_slice(&(registry.required_approvals() as u64).to_be_bytes());
        for owner in &sorted_owners {
            data.extend_from_slice(owner.as_bytes());
        }

        Address::from_bytes(hash160(&data))
    }

    /// Check that the stored custody address matches the owner set
    pub fn verify_address(&self) -> bool {
        Self::generate_address(&self.registry) == self.address
    }

    // =========================================================================
    // State-changing entry points
    // =========================================================================

    /// Propose a new outgoing transaction
    ///
    /// Returns the id of the new transaction. Ids are allocated sequentially from 0.
    pub fn submit(
        &mut self,
        caller: &Address,
        target: Address,
        amount: Amount,
        payload: Vec<u8>,
    ) -> WalletResult<TxId> {
        self.registry.ensure_owner(caller)?;

        let id = self.ledger.push(target, amount, payload.clone(), *caller);
        self.events.emit(EventKind::Submit {
            id,
            target,
            amount,
            payload,
        });

        Ok(id)
    }

    /// Approve a pending transaction
    pub fn approve(&mut self, caller: &Address, id: TxId) -> WalletResult<()> {
        self.registry.ensure_owner(caller)?;
        self.ledger.ensure_proposed(id)?;

        self.approvals.insert(id, *caller)?;
        self.events.emit(EventKind::Approve { owner: *caller, id });

        Ok(())
    }

    /// Withdraw a previously given approval
    pub fn revoke(&mut self, caller: &Address, id: TxId) -> WalletResult<()> {
        self.registry.ensure_owner(caller)?;
        self.ledger.ensure_proposed(id)?;

        self.approvals.remove(id, *caller)?;
        self.events.emit(EventKind::Revoke { owner: *caller, id });

        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get the wallet address
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Custodied balance
    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// Check if an address is an owner
    pub fn is_owner(&self, address: &Address) -> bool {
        self.registry.is_owner(address)
    }

    /// Approvals required to execute
    pub fn required_approvals(&self) -> usize {
        self.registry.required_approvals()
    }

    pub fn owners(&self) -> &[Address] {
        self.registry.owners()
    }

    /// Get human-readable description like "2-of-3"
    pub fn description(&self) -> String {
        self.registry.description()
    }

    /// Get a transaction by id
    pub fn transaction(&self, id: TxId) -> WalletResult<&Transaction> {
        self.ledger.get(id)
    }

    pub fn transaction_count(&self) -> usize {
        self.ledger.len()
    }

    /// All transactions in id order
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.ledger.iter()
    }

    /// Transactions not yet executed
    pub fn pending_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.ledger.pending()
    }

    /// Whether `owner` currently approves transaction `id`
    pub fn is_approved(&self, id: TxId, owner: &Address) -> bool {
        self.approvals.is_approved(id, owner)
    }

    pub fn approval_count(&self, id: TxId) -> usize {
        self.approvals.count(id)
    }

    pub fn approvers(&self, id: TxId) -> Vec<Address> {
        self.approvals.approvers(id)
    }

    /// Whether `execute` would pass its approval check right now
    pub fn is_executable(&self, id: TxId) -> bool {
        match self.ledger.get(id) {
            Ok(tx) => !tx.executed() && self.approval_count(id) >= self.required_approvals(),
            Err(_) => false,
        }
    }

    /// Recorded notifications, oldest first
    pub fn events(&self) -> &[WalletEvent] {
        self.events.as_slice()
    }

    /// Drain recorded notifications
    pub fn take_events(&mut self) -> Vec<WalletEvent> {
        self.events.take()
    }
}

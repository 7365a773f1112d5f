//! Multisig Vault: an M-of-N multi-signature custody engine in Rust
//!
//! This crate provides a shared wallet controlled by a fixed set of owners:
//! - Owner registry with an approval threshold fixed at creation
//! - Sequentially numbered transaction proposals with attached payloads
//! - Per-owner approvals that can be revoked until execution
//! - All-or-nothing execution with rollback on delivery failure
//! - Re-entrancy safe payouts to accounts that call back into the wallet
//! - Append-only event log of every state change
//! - Simulated native-currency chain with 18-decimal units
//! - JSON persistence with backups
//!
//! # Example
//!
//! ```rust
//! use multisig_vault::chain::Chain;
//! use multisig_vault::crypto::KeyPair;
//! use multisig_vault::multisig::MultiSigWallet;
//! use multisig_vault::units::parse_amount;
//!
//! let owners: Vec<_> = (0..3).map(|_| KeyPair::generate().address()).collect();
//! let mut wallet = MultiSigWallet::new(owners.clone(), 2).unwrap();
//! let mut chain = Chain::new();
//!
//! // Fund an owner and deposit into the wallet
//! let value = parse_amount("0.1").unwrap();
//! chain.fund(&owners[0], value, &wallet).unwrap();
//! let custody = *wallet.address();
//! chain.send(&owners[0], &custody, value, &[], &mut wallet).unwrap();
//!
//! // Propose, approve twice, execute
//! let recipient = KeyPair::generate().address();
//! let id = wallet.submit(&owners[0], recipient, value, Vec::new()).unwrap();
//! wallet.approve(&owners[0], id).unwrap();
//! wallet.approve(&owners[1], id).unwrap();
//! wallet.execute(&owners[2], id, &mut chain).unwrap();
//!
//! assert_eq!(chain.balance_of(&recipient), value);
//! assert_eq!(wallet.balance(), 0);
//! ```

pub mod chain;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod multisig;
pub mod storage;
pub mod units;

// Re-export commonly used types
pub use chain::{Chain, ChainError, Receiver};
pub use config::{ConfigError, WalletConfig};
pub use crypto::{Address, KeyPair};
pub use multisig::{
    Amount, DeliveryError, MultiSigWallet, Transaction, Transfer, TxId, WalletError, WalletEvent,
};
pub use storage::{Storage, StorageConfig};
pub use units::{format_amount, parse_amount, COIN};

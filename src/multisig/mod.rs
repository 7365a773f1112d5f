//! Multi-signature custody engine
//!
//! A fixed set of owners guards a native-currency balance. Outgoing
//! transfers are proposed, collect approvals, and execute only once the
//! number of approving owners reaches the wallet's threshold.
//!
//! # Example
//!
//! ```ignore
//! use multisig_vault::multisig::MultiSigWallet;
//!
//! // Create a 2-of-3 wallet
//! let mut wallet = MultiSigWallet::new(vec![alice, bob, carol], 2)?;
//!
//! // Propose a transfer and collect approvals
//! let id = wallet.submit(&alice, carol, amount, b"memo".to_vec())?;
//! wallet.approve(&alice, id)?;
//! wallet.approve(&bob, id)?;
//!
//! // Deliver through the chain
//! wallet.execute(&alice, id, &mut chain)?;
//! ```

pub mod approval;
pub mod deposit;
pub mod error;
pub mod events;
pub mod execution;
pub mod registry;
pub mod transaction;
pub mod wallet;

/// Native-currency amount in base units
pub type Amount = u128;

/// Sequential transaction identifier
pub type TxId = u64;

pub use approval::ApprovalTracker;
pub use error::{DeliveryError, WalletError, WalletResult};
pub use events::{EventKind, EventLog, WalletEvent};
pub use execution::Transfer;
pub use registry::OwnerRegistry;
pub use transaction::{Transaction, TransactionLedger, TxStatus};
pub use wallet::MultiSigWallet;

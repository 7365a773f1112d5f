//! Error types for the custody engine

use crate::crypto::Address;
use crate::multisig::{Amount, TxId};
use thiserror::Error;

/// Errors related to multisig operations
///
/// Every variant is raised synchronously by the operation that violated it,
/// and the engine state is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid constructor arguments: {0}")]
    InvalidConstructorArgs(String),
    #[error("Caller is not an owner: {0}")]
    NotOwner(Address),
    #[error("Transaction does not exist: {0}")]
    TxNotExist(TxId),
    #[error("Transaction already executed: {0}")]
    TxAlreadyExecuted(TxId),
    #[error("Transaction {id} already approved by {owner}")]
    AlreadyApproved { id: TxId, owner: Address },
    #[error("Transaction {id} not approved by {owner}")]
    NotApproved { id: TxId, owner: Address },
    #[error("Not enough approvals for transaction {id}: have {have}, need {need}")]
    NotEnoughApprovals { id: TxId, have: usize, need: usize },
    #[error("Execution of transaction {id} failed: {reason}")]
    ExecutionFailed { id: TxId, reason: DeliveryError },
    #[error("Custodied balance would overflow")]
    BalanceOverflow,
}

/// Why delivering an executed transaction's value to its target failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Target {target} rejected the transfer: {reason}")]
    Rejected { target: Address, reason: String },
    #[error("Insufficient custodied balance: have {have}, need {need}")]
    InsufficientBalance { have: Amount, need: Amount },
    #[error("Target balance would overflow")]
    Overflow,
    #[error("Nested call failed: {0}")]
    Nested(Box<WalletError>),
}

impl From<WalletError> for DeliveryError {
    fn from(err: WalletError) -> Self {
        DeliveryError::Nested(Box::new(err))
    }
}

/// Result alias used throughout the engine
pub type WalletResult<T> = Result<T, WalletError>;

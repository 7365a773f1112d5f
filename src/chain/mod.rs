//! Native-currency chain
//!
//! The environment a wallet lives in: external account balances, value
//! transfers into the wallet's deposit path, and delivery of executed
//! payouts to their targets.

pub mod receiver;
pub mod state;

pub use receiver::{
    Incoming, Observations, ReceivedCall, Receiver, RecordCalls, ReenterExecute, RejectAll,
};
pub use state::{Chain, ChainError};

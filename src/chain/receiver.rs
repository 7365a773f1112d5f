//! Programmable recipients
//!
//! A [`Receiver`] attached to a chain account runs whenever that account is
//! paid, and may accept, reject, or call back into the paying wallet.

use crate::chain::state::Chain;
use crate::crypto::Address;
use crate::multisig::{Amount, DeliveryError, MultiSigWallet, TxId, WalletResult};
use std::cell::RefCell;
use std::rc::Rc;

/// A value transfer as seen by its recipient
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Incoming<'a> {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
    pub payload: &'a [u8],
}

/// Behaviour run when an account receives value
pub trait Receiver {
    /// Returning an error rejects the transfer; the chain then undoes the credit.
    fn on_receive(
        &mut self,
        chain: &mut Chain,
        wallet: &mut MultiSigWallet,
        incoming: &Incoming<'_>,
    ) -> Result<(), DeliveryError>;
}

/// Rejects every incoming transfer
#[derive(Clone, Debug)]
pub struct RejectAll {
    reason: String,
}

impl RejectAll {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Receiver for RejectAll {
    fn on_receive(
        &mut self,
        _chain: &mut Chain,
        _wallet: &mut MultiSigWallet,
        incoming: &Incoming<'_>,
    ) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected {
            target: incoming.to,
            reason: self.reason.clone(),
        })
    }
}

/// A transfer recorded by [`RecordCalls`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedCall {
    pub from: Address,
    pub amount: Amount,
    pub payload: Vec<u8>,
}

/// Shared view of what a receiver observed
pub type Observations<T> = Rc<RefCell<Vec<T>>>;

/// Accepts every transfer and records it
#[derive(Clone, Debug, Default)]
pub struct RecordCalls {
    calls: Observations<ReceivedCall>,
}

impl RecordCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the recorded calls, still readable after the receiver is registered
    pub fn calls(&self) -> Observations<ReceivedCall> {
        Rc::clone(&self.calls)
    }
}

impl Receiver for RecordCalls {
    fn on_receive(
        &mut self,
        _chain: &mut Chain,
        _wallet: &mut MultiSigWallet,
        incoming: &Incoming<'_>,
    ) -> Result<(), DeliveryError> {
        self.calls.borrow_mut().push(ReceivedCall {
            from: incoming.from,
            amount: incoming.amount,
            payload: incoming.payload.to_vec(),
        });
        Ok(())
    }
}

/// Calls `execute` on the paying wallet while being paid.
///
/// Models a hostile target trying to collect the same payout twice. The
/// nested call's outcome is recorded and the outer transfer is accepted.
#[derive(Clone, Debug)]
pub struct ReenterExecute {
    caller: Address,
    id: TxId,
    outcomes: Observations<WalletResult<()>>,
}

impl ReenterExecute {
    /// `caller` is the identity used for the nested call (typically an owner
    /// colluding with the target)
    pub fn new(caller: Address, id: TxId) -> Self {
        Self {
            caller,
            id,
            outcomes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn outcomes(&self) -> Observations<WalletResult<()>> {
        Rc::clone(&self.outcomes)
    }
}

impl Receiver for ReenterExecute {
    fn on_receive(
        &mut self,
        chain: &mut Chain,
        wallet: &mut MultiSigWallet,
        _incoming: &Incoming<'_>,
    ) -> Result<(), DeliveryError> {
        let outcome = wallet.execute(&self.caller, self.id, chain);
        log::debug!("Re-entrant execute of {} returned {:?}", self.id, outcome);
        self.outcomes.borrow_mut().push(outcome);
        Ok(())
    }
}

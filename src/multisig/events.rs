//! Wallet notifications
//!
//! Every successful state-changing call appends exactly one event. Events
//! recorded during an execution attempt that is rolled back are discarded
//! together with the rest of its effects.

use crate::crypto::Address;
use crate::multisig::transaction::payload_hex;
use crate::multisig::{Amount, TxId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventKind {
    Deposit {
        sender: Address,
        amount: Amount,
    },
    Submit {
        id: TxId,
        target: Address,
        amount: Amount,
        #[serde(with = "payload_hex")]
        payload: Vec<u8>,
    },
    Approve {
        owner: Address,
        id: TxId,
    },
    Revoke {
        owner: Address,
        id: TxId,
    },
    Execute {
        id: TxId,
    },
}

impl EventKind {
    /// Event name as emitted
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Deposit { .. } => "Deposit",
            EventKind::Submit { .. } => "Submit",
            EventKind::Approve { .. } => "Approve",
            EventKind::Revoke { .. } => "Revoke",
            EventKind::Execute { .. } => "Execute",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Deposit { sender, amount } => {
                write!(f, "Deposit(sender={}, amount={})", sender, amount)
            }
            EventKind::Submit {
                id,
                target,
                amount,
                payload,
            } => write!(
                f,
                "Submit(id={}, target={}, amount={}, payload=0x{})",
                id,
                target,
                amount,
                hex::encode(payload)
            ),
            EventKind::Approve { owner, id } => write!(f, "Approve(owner={}, id={})", owner, id),
            EventKind::Revoke { owner, id } => write!(f, "Revoke(owner={}, id={})", owner, id),
            EventKind::Execute { id } => write!(f, "Execute(id={})", id),
        }
    }
}

/// A timestamped notification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletEvent {
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

/// Ordered event journal
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<WalletEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event
    pub(crate) fn emit(&mut self, kind: EventKind) {
        log::info!("{}", kind);
        self.events.push(WalletEvent {
            kind,
            timestamp: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn as_slice(&self) -> &[WalletEvent] {
        &self.events
    }

    /// Remove and return all recorded events
    pub fn take(&mut self) -> Vec<WalletEvent> {
        std::mem::take(&mut self.events)
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&EventKind> {
        self.events.last().map(|e| &e.kind)
    }
}

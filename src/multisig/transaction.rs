//! Transaction ledger
//!
//! Proposed outgoing transfers, stored in submission order. A transaction's
//! id is its position in the ledger, so ids start at 0, have no gaps and are
//! never reused.

use crate::crypto::{sha256_hex, Address};
use crate::multisig::error::{WalletError, WalletResult};
use crate::multisig::{Amount, TxId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hex (`0x…`) encoding for opaque call payloads
pub(crate) mod payload_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(digits).map_err(serde::de::Error::custom)
    }
}

/// Lifecycle state of a transaction
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TxStatus {
    /// Submitted, collecting approvals
    Proposed,
    /// Funds delivered (terminal)
    Executed,
}

/// A proposed fund movement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    id: TxId,
    target: Address,
    amount: Amount,
    #[serde(with = "payload_hex")]
    payload: Vec<u8>,
    executed: bool,
    submitted_by: Address,
    submitted_at: DateTime<Utc>,
}

impl Transaction {
    fn new(id: TxId, target: Address, amount: Amount, payload: Vec<u8>, submitted_by: Address) -> Self {
        Self {
            id,
            target,
            amount,
            payload,
            executed: false,
            submitted_by,
            submitted_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TxId {
        self.id
    }

    pub fn target(&self) -> &Address {
        &self.target
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn executed(&self) -> bool {
        self.executed
    }

    pub fn submitted_by(&self) -> &Address {
        &self.submitted_by
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn status(&self) -> TxStatus {
        if self.executed {
            TxStatus::Executed
        } else {
            TxStatus::Proposed
        }
    }

    /// Content digest over id, target, amount and payload.
    ///
    /// Lets owners confirm out of band that they are approving the same proposal.
    pub fn digest(&self) -> String {
        let mut data = Vec::with_capacity(8 + 20 + 16 + self.payload.len());
        data.extend_from_slice(&self.id.to_be_bytes());
        data.extend_from_slice(self.target.as_bytes());
        data.extend_from_slice(&self.amount.to_be_bytes());
        data.extend_from_slice(&self.payload);
        sha256_hex(&data)
    }

    pub(crate) fn set_executed(&mut self, executed: bool) {
        self.executed = executed;
    }
}

/// Append-only store of transactions indexed by id
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<Transaction>", into = "Vec<Transaction>")]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    /// Id the next submission will receive
    pub fn next_id(&self) -> TxId {
        self.transactions.len() as TxId
    }

    /// Store a new, non-executed transaction and return its id
    pub(crate) fn push(
        &mut self,
        target: Address,
        amount: Amount,
        payload: Vec<u8>,
        submitted_by: Address,
    ) -> TxId {
        let id = self.next_id();
        self.transactions
            .push(Transaction::new(id, target, amount, payload, submitted_by));
        id
    }

    /// Get a transaction by id
    pub fn get(&self, id: TxId) -> WalletResult<&Transaction> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get(index))
            .ok_or(WalletError::TxNotExist(id))
    }

    /// Get a transaction that can still change state
    ///
    /// # Errors
    /// `TxNotExist` for unknown ids, `TxAlreadyExecuted` for settled ones.
    pub(crate) fn get_proposed_mut(&mut self, id: TxId) -> WalletResult<&mut Transaction> {
        let tx = usize::try_from(id)
            .ok()
            .and_then(|index| self.transactions.get_mut(index))
            .ok_or(WalletError::TxNotExist(id))?;

        if tx.executed {
            return Err(WalletError::TxAlreadyExecuted(id));
        }
        Ok(tx)
    }

    /// Check that a transaction exists and is still proposed
    pub(crate) fn ensure_proposed(&self, id: TxId) -> WalletResult<&Transaction> {
        let tx = self.get(id)?;
        if tx.executed {
            return Err(WalletError::TxAlreadyExecuted(id));
        }
        Ok(tx)
    }

    /// Number of transactions ever submitted
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// All transactions in id order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Transactions still awaiting execution
    pub fn pending(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| !tx.executed)
    }
}

impl TryFrom<Vec<Transaction>> for TransactionLedger {
    type Error = String;

    fn try_from(transactions: Vec<Transaction>) -> Result<Self, Self::Error> {
        for (index, tx) in transactions.iter().enumerate() {
            if tx.id != index as TxId {
                return Err(format!(
                    "transaction at position {} has id {}",
                    index, tx.id
                ));
            }
        }
        Ok(Self { transactions })
    }
}

impl From<TransactionLedger> for Vec<Transaction> {
    fn from(ledger: TransactionLedger) -> Self {
        ledger.transactions
    }
}

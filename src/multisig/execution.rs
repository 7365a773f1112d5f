//! Threshold-gated execution
//!
//! Executing a transaction marks it executed, debits the custodied balance
//! and hands the value to the target through a [`Transfer`]. The target may
//! call back into the wallet while it is being paid; because the executed
//! flag is already set, a nested `execute` of the same id fails with
//! `TxAlreadyExecuted`. If delivery fails, every effect of the attempt,
//! nested calls included, is rolled back.

use crate::crypto::Address;
use crate::multisig::approval::ApprovalTracker;
use crate::multisig::error::{DeliveryError, WalletError, WalletResult};
use crate::multisig::events::{EventKind, EventLog};
use crate::multisig::transaction::TransactionLedger;
use crate::multisig::wallet::MultiSigWallet;
use crate::multisig::{Amount, TxId};

/// Delivers value leaving the wallet
pub trait Transfer {
    /// Credit `amount` to `target` along with `payload`.
    ///
    /// `wallet` is the paying wallet, already showing the transaction as
    /// executed and the balance debited. Implementations may call back into it.
    fn deliver(
        &mut self,
        wallet: &mut MultiSigWallet,
        target: &Address,
        amount: Amount,
        payload: &[u8],
    ) -> Result<(), DeliveryError>;
}

/// Wallet state captured before an execution attempt
struct Checkpoint {
    ledger: TransactionLedger,
    approvals: ApprovalTracker,
    balance: Amount,
    events: EventLog,
}

impl MultiSigWallet {
    /// Execute an approved transaction
    ///
    /// # Errors
    /// - `NotOwner`, `TxNotExist`, `TxAlreadyExecuted` for invalid calls
    /// - `NotEnoughApprovals` if fewer than `required_approvals` owners approve
    /// - `ExecutionFailed` if the balance cannot cover the amount or delivery fails
    pub fn execute<T: Transfer + ?Sized>(
        &mut self,
        caller: &Address,
        id: TxId,
        transfer: &mut T,
    ) -> WalletResult<()> {
        self.registry.ensure_owner(caller)?;
        let tx = self.ledger.ensure_proposed(id)?;

        let have = self.approvals.count(id);
        let need = self.registry.required_approvals();
        if have < need {
            log::debug!("Transaction {} has {} of {} approvals", id, have, need);
            return Err(WalletError::NotEnoughApprovals { id, have, need });
        }

        let target = *tx.target();
        let amount = tx.amount();
        let payload = tx.payload().to_vec();

        let checkpoint = self.checkpoint();

        // Flag first, so a re-entrant execute of this id is refused
        self.ledger.get_proposed_mut(id)?.set_executed(true);

        let outcome = match self.debit(amount) {
            Ok(()) => transfer.deliver(self, &target, amount, &payload),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                self.events.emit(EventKind::Execute { id });
                Ok(())
            }
            Err(reason) => {
                self.restore(checkpoint);
                log::warn!("Execution of transaction {} rolled back: {}", id, reason);
                Err(WalletError::ExecutionFailed { id, reason })
            }
        }
    }

    fn debit(&mut self, amount: Amount) -> Result<(), DeliveryError> {
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(DeliveryError::InsufficientBalance {
                have: self.balance,
                need: amount,
            })?;
        Ok(())
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            ledger: self.ledger.clone(),
            approvals: self.approvals.clone(),
            balance: self.balance,
            events: self.events.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.ledger = checkpoint.ledger;
        self.approvals = checkpoint.approvals;
        self.balance = checkpoint.balance;
        self.events = checkpoint.events;
    }
}

//! Inbound value accounting

use crate::crypto::Address;
use crate::multisig::error::{WalletError, WalletResult};
use crate::multisig::events::EventKind;
use crate::multisig::wallet::MultiSigWallet;
use crate::multisig::Amount;

impl MultiSigWallet {
    /// Account for value arriving at the custody address.
    ///
    /// Anyone may deposit. A payload travelling with the value is not
    /// interpreted: the call is accounted exactly like a plain transfer.
    pub fn on_deposit(
        &mut self,
        sender: &Address,
        amount: Amount,
        payload: &[u8],
    ) -> WalletResult<()> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(WalletError::BalanceOverflow)?;

        if !payload.is_empty() {
            log::debug!(
                "Deposit from {} carried {} payload bytes, accounted as plain deposit",
                sender,
                payload.len()
            );
        }

        self.events.emit(EventKind::Deposit {
            sender: *sender,
            amount,
        });

        Ok(())
    }
}

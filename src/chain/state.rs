//! Native-currency account state
//!
//! Balances of every account other than the custody wallet, plus the
//! routing that turns value sent to the wallet's address into a deposit and
//! delivers executed payouts to their targets.

use crate::chain::receiver::{Incoming, Receiver};
use crate::crypto::Address;
use crate::multisig::{Amount, DeliveryError, MultiSigWallet, Transfer, WalletError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Chain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Insufficient funds in {account}: have {have}, need {need}")]
    InsufficientFunds {
        account: Address,
        have: Amount,
        need: Amount,
    },
    #[error("Balance of {0} would overflow")]
    Overflow(Address),
    #[error("Custody address {0} only moves value through the wallet")]
    CustodyAccount(Address),
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
    #[error("Transfer rejected: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Account balances and recipient hooks
#[derive(Default, Serialize, Deserialize)]
pub struct Chain {
    balances: BTreeMap<Address, Amount>,
    /// Recipient behaviour is code, not state; it is not persisted
    #[serde(skip)]
    receivers: HashMap<Address, Box<dyn Receiver>>,
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("balances", &self.balances)
            .field("receivers", &self.receivers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Chain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            balances: BTreeMap::new(),
            receivers: HashMap::new(),
        }
    }

    /// Mint funds into an account (development chain faucet)
    ///
    /// The wallet's custody address cannot be minted into; its balance only
    /// grows through deposits.
    pub fn fund(
        &mut self,
        account: &Address,
        amount: Amount,
        wallet: &MultiSigWallet,
    ) -> Result<(), ChainError> {
        if account == wallet.address() {
            log::debug!("Refusing to mint into custody address {}", account);
            return Err(ChainError::CustodyAccount(*account));
        }
        self.credit(account, amount)
            .map_err(|_| ChainError::Overflow(*account))?;
        log::info!("Funded {} with {}", account, amount);
        Ok(())
    }

    /// Balance of an external account
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Attach recipient behaviour to an account
    pub fn register_receiver(&mut self, account: Address, receiver: Box<dyn Receiver>) {
        self.receivers.insert(account, receiver);
    }

    /// Detach recipient behaviour from an account
    pub fn unregister_receiver(&mut self, account: &Address) -> Option<Box<dyn Receiver>> {
        self.receivers.remove(account)
    }

    /// Send value from an external account.
    ///
    /// Value sent to the wallet's custody address goes through the wallet's
    /// deposit path, with or without a payload. Anything else is credited to
    /// the recipient, whose receiver (if any) runs afterwards. The transfer
    /// is all-or-nothing.
    ///
    /// The custody address is never a valid sender: custodied value leaves
    /// only through `MultiSigWallet::execute`.
    pub fn send(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        payload: &[u8],
        wallet: &mut MultiSigWallet,
    ) -> Result<(), ChainError> {
        if from == wallet.address() {
            log::debug!("Refusing unapproved send from custody address {}", from);
            return Err(ChainError::CustodyAccount(*from));
        }

        let snapshot = self.balances.clone();

        let have = self.balance_of(from);
        if have < amount {
            return Err(ChainError::InsufficientFunds {
                account: *from,
                have,
                need: amount,
            });
        }
        self.balances.insert(*from, have - amount);

        let result = if to == wallet.address() {
            wallet
                .on_deposit(from, amount, payload)
                .map_err(ChainError::from)
        } else {
            self.pay(wallet, from, to, amount, payload)
                .map_err(ChainError::from)
        };

        if result.is_err() {
            self.balances = snapshot;
        }
        result
    }

    fn credit(&mut self, account: &Address, amount: Amount) -> Result<(), DeliveryError> {
        let balance = self.balances.entry(*account).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(DeliveryError::Overflow)?;
        Ok(())
    }

    /// Credit `to` and run its receiver. Undoes the credit (and anything the
    /// receiver did to chain balances) on failure.
    ///
    /// Receivers registered during a rejected transfer are dropped and the
    /// paid account's own receiver is put back. Receivers unregistered during
    /// it stay unregistered. If the transfer succeeds and the receiver
    /// registered a replacement for its own account, the replacement wins.
    fn pay(
        &mut self,
        wallet: &mut MultiSigWallet,
        from: &Address,
        to: &Address,
        amount: Amount,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        let snapshot = self.balances.clone();
        self.credit(to, amount)?;

        // A receiver is not re-entered while it is already running
        let Some(mut receiver) = self.receivers.remove(to) else {
            return Ok(());
        };

        let incoming = Incoming {
            from: *from,
            to: *to,
            amount,
            payload,
        };
        let registered: HashSet<Address> = self.receivers.keys().copied().collect();
        let result = receiver.on_receive(self, wallet, &incoming);

        if result.is_err() {
            self.balances = snapshot;
            self.receivers.retain(|account, _| registered.contains(account));
            self.receivers.insert(*to, receiver);
        } else {
            self.receivers.entry(*to).or_insert(receiver);
        }
        result
    }
}

impl Transfer for Chain {
    fn deliver(
        &mut self,
        wallet: &mut MultiSigWallet,
        target: &Address,
        amount: Amount,
        payload: &[u8],
    ) -> Result<(), DeliveryError> {
        let source = *wallet.address();

        // Paying the wallet itself is a deposit back into custody
        if target == &source {
            return wallet
                .on_deposit(&source, amount, payload)
                .map_err(DeliveryError::from);
        }

        self.pay(wallet, &source, target, amount, payload)
    }
}

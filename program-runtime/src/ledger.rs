//! Account balances for the native asset and secondary assets
//!
//! The ledger is the only place balances change. Every mutation is checked
//! arithmetic over `u64`; nothing wraps. Accounts are kept in a `BTreeMap` so
//! iteration order (and therefore snapshots and logs) is identical on every
//! node replaying the same block.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuntimeError};
use crate::storage::AccountProvider;

/// Opaque account identity
pub type AccountId = u64;

/// Asset identifier; [`NATIVE_ASSET`] is the chain's base currency
pub type AssetId = u64;

/// Balance in the asset's smallest unit
pub type Amount = u64;

/// Asset id of the native currency
pub const NATIVE_ASSET: AssetId = 0;

/// Balances held by a single account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Native asset balance
    pub balance: Amount,
    /// Secondary asset balances, keyed by asset id
    pub assets: BTreeMap<AssetId, Amount>,
}

impl Account {
    /// Balance of `asset` held by this account
    pub fn balance_of(&self, asset: AssetId) -> Amount {
        if asset == NATIVE_ASSET {
            self.balance
        } else {
            self.assets.get(&asset).copied().unwrap_or(0)
        }
    }

    fn set_balance(&mut self, asset: AssetId, amount: Amount) {
        if asset == NATIVE_ASSET {
            self.balance = amount;
        } else {
            self.assets.insert(asset, amount);
        }
    }
}

/// In-memory ledger of every account known to the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    accounts: BTreeMap<AccountId, Account>,
}

impl Ledger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account balance, replacing whatever was there
    ///
    /// Used by the host when loading genesis state; contracts never call it.
    pub fn set_balance(&mut self, account: AccountId, asset: AssetId, amount: Amount) {
        self.accounts
            .entry(account)
            .or_default()
            .set_balance(asset, amount);
    }

    /// Iterate over all accounts in ascending id order
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Account)> {
        self.accounts.iter()
    }

    /// Sum of all balances of `asset`
    ///
    /// Returns `None` if the sum does not fit in a `u64`.
    pub fn total_supply(&self, asset: AssetId) -> Option<Amount> {
        self.accounts
            .values()
            .try_fold(0u64, |total, account| total.checked_add(account.balance_of(asset)))
    }
}

impl AccountProvider for Ledger {
    fn balance_of(&self, account: AccountId, asset: AssetId) -> Amount {
        self.accounts
            .get(&account)
            .map(|acc| acc.balance_of(asset))
            .unwrap_or(0)
    }

    fn debit(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balance_of(account, asset);
        let remaining = balance
            .checked_sub(amount)
            .ok_or(RuntimeError::InsufficientFunds { account, asset, balance, amount })?;
        self.set_balance(account, asset, remaining);
        Ok(())
    }

    fn credit(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let updated = self
            .balance_of(account, asset)
            .checked_add(amount)
            .ok_or(RuntimeError::Overflow { account, asset, amount })?;
        self.set_balance(account, asset, updated);
        Ok(())
    }

    fn account(&self, account: AccountId) -> Option<Account> {
        self.accounts.get(&account).cloned()
    }

    fn restore_account(&mut self, account: AccountId, prior: Option<Account>) {
        match prior {
            Some(state) => {
                self.accounts.insert(account, state);
            }
            None => {
                self.accounts.remove(&account);
            }
        }
    }
}

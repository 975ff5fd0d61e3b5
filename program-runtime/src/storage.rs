//! Storage provider traits and the in-memory contract store
//!
//! This module defines the seams through which contracts reach chain state:
//! [`AccountProvider`] for balances and [`StorageProvider`] for the
//! per-contract key-value map. The host decides what backs them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ledger::{Account, AccountId, Amount, AssetId};

/// Account provider trait
///
/// Implemented by the host ledger to give contracts balance queries and
/// transfers. All mutations must be deterministic.
pub trait AccountProvider {
    /// Get the balance of `asset` held by `account` (0 when unknown)
    fn balance_of(&self, account: AccountId, asset: AssetId) -> Amount;

    /// Decrease a balance
    ///
    /// # Errors
    /// * `InsufficientFunds` if the balance is lower than `amount`
    fn debit(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> Result<()>;

    /// Increase a balance
    ///
    /// # Errors
    /// * `Overflow` if the new balance would not fit in a `u64`
    fn credit(&mut self, account: AccountId, asset: AssetId, amount: Amount) -> Result<()>;

    /// Move `amount` of `asset` from one account to another
    ///
    /// Debit then credit. If the credit fails the debit is undone, so no
    /// funds vanish.
    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<()> {
        self.debit(from, asset, amount)?;
        if let Err(err) = self.credit(to, asset, amount) {
            // cannot overflow: it restores a balance that fit before the debit
            self.credit(from, asset, amount)?;
            return Err(err);
        }
        Ok(())
    }

    /// Full state of an account, `None` if it was never touched
    fn account(&self, account: AccountId) -> Option<Account>;

    /// Put an account back to a state previously returned by [`Self::account`]
    fn restore_account(&mut self, account: AccountId, prior: Option<Account>);
}

/// Storage provider trait
///
/// Contract storage is a map from `(primary key, secondary key)` to a signed
/// word, isolated per contract.
pub trait StorageProvider {
    /// Read an entry; absent entries read as 0
    fn get(&self, contract: AccountId, key1: i64, key2: i64) -> i64 {
        self.entry(contract, key1, key2).unwrap_or(0)
    }

    /// Read an entry, distinguishing "never written" from a stored 0
    fn entry(&self, contract: AccountId, key1: i64, key2: i64) -> Option<i64>;

    /// Write an entry, overwriting any previous value
    fn set(&mut self, contract: AccountId, key1: i64, key2: i64, value: i64);

    /// Remove an entry
    ///
    /// # Returns
    /// * `true` if the entry existed
    fn delete(&mut self, contract: AccountId, key1: i64, key2: i64) -> bool;
}

/// Key of a single map entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapKey {
    /// Owning contract
    pub contract: AccountId,
    /// Contract-defined namespace
    pub key1: i64,
    /// Caller-supplied key within the namespace
    pub key2: i64,
}

/// In-memory contract storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStorage {
    entries: BTreeMap<MapKey, i64>,
}

impl MemoryStorage {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries belonging to `contract`, ordered by key
    pub fn entries_of(&self, contract: AccountId) -> impl Iterator<Item = (&MapKey, &i64)> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.contract == contract)
    }

    /// Number of stored entries across all contracts
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been written yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageProvider for MemoryStorage {
    fn entry(&self, contract: AccountId, key1: i64, key2: i64) -> Option<i64> {
        self.entries.get(&MapKey { contract, key1, key2 }).copied()
    }

    fn set(&mut self, contract: AccountId, key1: i64, key2: i64, value: i64) {
        self.entries.insert(MapKey { contract, key1, key2 }, value);
    }

    fn delete(&mut self, contract: AccountId, key1: i64, key2: i64) -> bool {
        self.entries.remove(&MapKey { contract, key1, key2 }).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_entry_reads_zero() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(1, 1, 42), 0);
        assert_eq!(storage.entry(1, 1, 42), None);
    }

    #[test]
    fn test_set_then_get() {
        let mut storage = MemoryStorage::new();
        storage.set(1, 1, 42, -7);
        assert_eq!(storage.get(1, 1, 42), -7);

        // Overwrite is unconditional
        storage.set(1, 1, 42, 9);
        storage.set(1, 1, 42, 9);
        assert_eq!(storage.get(1, 1, 42), 9);
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_contracts_are_isolated() {
        let mut storage = MemoryStorage::new();
        storage.set(1, 1, 5, 100);
        storage.set(2, 1, 5, 200);

        assert_eq!(storage.get(1, 1, 5), 100);
        assert_eq!(storage.get(2, 1, 5), 200);
        assert_eq!(storage.entries_of(1).count(), 1);
    }

    #[test]
    fn test_delete() {
        let mut storage = MemoryStorage::new();
        storage.set(1, 1, 5, 100);

        assert!(storage.delete(1, 1, 5));
        assert!(!storage.delete(1, 1, 5));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_stored_zero_is_an_entry() {
        let mut storage = MemoryStorage::new();
        storage.set(1, 1, 5, 0);
        assert_eq!(storage.entry(1, 1, 5), Some(0));
        assert_eq!(storage.get(1, 1, 5), 0);
    }
}

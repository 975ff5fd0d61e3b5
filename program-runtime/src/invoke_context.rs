//! Contract invocation context
//!
//! This module provides the execution context a contract runs against while a
//! block is being processed. The context borrows the host's ledger, contract
//! storage and transaction queue, tracks the transaction currently being
//! handled, and journals every write so a faulting transaction can be undone.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::ledger::{Account, AccountId, Amount, AssetId};
use crate::queue::{Transaction, TransactionQueue, TxId, NO_TRANSACTION};
use crate::storage::{AccountProvider, StorageProvider};

/// Transaction-scoped atomicity
///
/// Everything written between `begin_transaction` and `commit_transaction`
/// is kept; `rollback_transaction` puts ledger and storage back to the state
/// seen at `begin_transaction`.
pub trait Checkpoint {
    /// Start journaling writes
    fn begin_transaction(&mut self);

    /// Keep all writes since `begin_transaction` and stop journaling
    fn commit_transaction(&mut self);

    /// Undo all writes since `begin_transaction` and stop journaling
    fn rollback_transaction(&mut self);
}

/// Prior state of everything touched by the open transaction
#[derive(Debug, Default)]
struct Journal {
    accounts: Vec<(AccountId, Option<Account>)>,
    entries: Vec<(i64, i64, Option<i64>)>,
    seen_accounts: BTreeSet<AccountId>,
    seen_entries: BTreeSet<(i64, i64)>,
}

/// Program invocation context
///
/// One context is created per block and per contract. It is the only path
/// through which contract code reaches chain state.
pub struct InvokeContext<'a> {
    // === Contract Identity ===
    /// Account id of the contract being executed
    pub contract_id: AccountId,

    /// Account that deployed the contract
    pub creator: AccountId,

    /// Height of the block being processed
    pub block_height: u64,

    // === Chain State ===
    accounts: &'a mut dyn AccountProvider,
    storage: &'a mut dyn StorageProvider,
    queue: &'a mut TransactionQueue,

    /// Transaction most recently handed to the contract
    current_tx: TxId,

    journal: Option<Journal>,

    // === Debug and Logging ===
    /// Debug mode (logs every host intrinsic call)
    pub debug_mode: bool,
}

impl<'a> InvokeContext<'a> {
    /// Creates a new invocation context
    ///
    /// # Arguments
    /// * `contract_id` - Account id of the contract being executed
    /// * `creator` - Account that deployed the contract
    /// * `accounts` - Ledger backing balance queries and transfers
    /// * `storage` - Contract key-value storage
    /// * `queue` - Transactions addressed to the contract in this block
    pub fn new(
        contract_id: AccountId,
        creator: AccountId,
        accounts: &'a mut dyn AccountProvider,
        storage: &'a mut dyn StorageProvider,
        queue: &'a mut TransactionQueue,
    ) -> Self {
        Self {
            contract_id,
            creator,
            block_height: 0,
            accounts,
            storage,
            queue,
            current_tx: NO_TRANSACTION,
            journal: None,
            debug_mode: false,
        }
    }

    /// Enable debug mode (logs host intrinsic calls)
    pub fn enable_debug(&mut self) {
        self.debug_mode = true;
    }

    /// Advance the intake cursor
    ///
    /// # Returns
    /// The id of the next transaction, or [`NO_TRANSACTION`] once the block
    /// is drained
    pub fn next_transaction(&mut self) -> TxId {
        self.current_tx = self
            .queue
            .next_transaction()
            .map(|tx| tx.id)
            .unwrap_or(NO_TRANSACTION);
        self.current_tx
    }

    /// Id of the transaction being processed ([`NO_TRANSACTION`] if none)
    pub fn current_transaction(&self) -> TxId {
        self.current_tx
    }

    /// Look up a transaction of the current block
    pub fn transaction(&self, id: TxId) -> Option<&Transaction> {
        self.queue.get(id)
    }

    /// Balance of `asset` held by `account`
    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> Amount {
        self.accounts.balance_of(account, asset)
    }

    /// Transfer between two accounts, journaled when a transaction is open
    pub fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        asset: AssetId,
        amount: Amount,
    ) -> Result<()> {
        self.record_account(from);
        self.record_account(to);
        self.accounts.transfer(from, to, asset, amount)
    }

    /// Read an entry of this contract's map
    pub fn get_storage(&self, key1: i64, key2: i64) -> i64 {
        self.storage.get(self.contract_id, key1, key2)
    }

    /// Write an entry of this contract's map, journaled when a transaction is open
    pub fn set_storage(&mut self, key1: i64, key2: i64, value: i64) {
        self.record_entry(key1, key2);
        self.storage.set(self.contract_id, key1, key2, value);
    }

    fn record_account(&mut self, account: AccountId) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        if journal.seen_accounts.insert(account) {
            journal.accounts.push((account, self.accounts.account(account)));
        }
    }

    fn record_entry(&mut self, key1: i64, key2: i64) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        if journal.seen_entries.insert((key1, key2)) {
            let prior = self.storage.entry(self.contract_id, key1, key2);
            journal.entries.push((key1, key2, prior));
        }
    }
}

impl Checkpoint for InvokeContext<'_> {
    fn begin_transaction(&mut self) {
        self.journal = Some(Journal::default());
    }

    fn commit_transaction(&mut self) {
        self.journal = None;
    }

    fn rollback_transaction(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for (account, prior) in journal.accounts.into_iter().rev() {
            self.accounts.restore_account(account, prior);
        }
        for (key1, key2, prior) in journal.entries.into_iter().rev() {
            match prior {
                Some(value) => self.storage.set(self.contract_id, key1, key2, value),
                None => {
                    self.storage.delete(self.contract_id, key1, key2);
                }
            }
        }
        log::debug!(
            "Rolled back transaction {} of contract {}",
            self.current_tx,
            self.contract_id
        );
    }
}

//! In-process host for a single deployed contract
//!
//! The testbed plays the chain's part: it accepts transactions, moves their
//! attached amount into the contract, and runs the contract once per block.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use testbed_contract::{BlockReport, ContractRuntime, ContractState};
use testbed_program_runtime::{
    snapshot, Account, AccountId, AccountProvider, Amount, AssetId, ChainSnapshot, InvokeContext,
    Ledger, MemoryStorage, Message, Result, StorageProvider, TransactionQueue, TxId, NATIVE_ASSET,
};

use crate::config::ScenarioConfig;

/// Durable state of a testbed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestbedSnapshot {
    /// Ledger, storage and block height
    pub chain: ChainSnapshot,
    /// Undelivered transactions and the next transaction id
    pub queue: TransactionQueue,
    /// Contract scalars
    pub contract: ContractState,
    /// Minimum attached amount for delivery
    pub activation_amount: Amount,
}

/// Human-readable state dump
#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    /// Last processed block
    pub block_height: u64,
    /// Contract account id
    pub contract: AccountId,
    /// Forwarded percentage
    pub percentage: i64,
    /// Every account with its balances
    pub accounts: Vec<(AccountId, Account)>,
    /// Contract map as `(key1, key2, value)`
    pub map: Vec<(i64, i64, i64)>,
    /// Transactions waiting for the next block
    pub pending: usize,
}

/// A single contract running on an in-memory chain
pub struct Testbed {
    ledger: Ledger,
    storage: MemoryStorage,
    queue: TransactionQueue,
    runtime: ContractRuntime,
    activation_amount: Amount,
    block_height: u64,
    debug: bool,
}

impl Testbed {
    /// Deploy a contract on an empty chain
    pub fn deploy(state: ContractState) -> Self {
        log::info!("Deploying contract {} (creator {})", state.contract_id, state.creator);
        Self {
            ledger: Ledger::new(),
            storage: MemoryStorage::new(),
            queue: TransactionQueue::new(),
            runtime: ContractRuntime::new(state),
            activation_amount: 0,
            block_height: 0,
            debug: false,
        }
    }

    /// Deploy the scenario's contract and load its genesis balances
    pub fn from_config(config: &ScenarioConfig) -> Self {
        let state = ContractState::new(config.contract.id, config.contract.creator)
            .with_percentage(config.contract.percentage);
        let mut testbed = Self::deploy(state).with_activation_amount(config.contract.activation_amount);
        for account in &config.accounts {
            testbed.fund(account.id, NATIVE_ASSET, account.balance);
            for (asset, amount) in &account.assets {
                testbed.fund(account.id, *asset, *amount);
            }
        }
        testbed
    }

    /// Set the minimum attached amount for a transaction to reach the contract
    pub fn with_activation_amount(mut self, amount: Amount) -> Self {
        self.activation_amount = amount;
        self
    }

    /// Log every host intrinsic call
    pub fn enable_debug(&mut self) {
        self.debug = true;
    }

    /// Set a genesis balance
    pub fn fund(&mut self, account: AccountId, asset: AssetId, amount: Amount) {
        self.ledger.set_balance(account, asset, amount);
    }

    /// Accept a transaction for the next block
    ///
    /// The attached amount is moved from the sender to the contract first.
    /// Transactions below the activation amount are credited but never
    /// delivered.
    ///
    /// # Returns
    /// * `Some(id)` if the transaction was queued for the contract
    /// * `None` if it only funded the contract
    ///
    /// # Errors
    /// * `InsufficientFunds` if the sender cannot pay the attached amount;
    ///   nothing is queued
    pub fn submit(&mut self, sender: AccountId, amount: Amount, message: Message) -> Result<Option<TxId>> {
        let contract = self.contract_id();
        self.ledger.transfer(sender, contract, NATIVE_ASSET, amount)?;
        if amount < self.activation_amount {
            log::debug!(
                "Transaction from {} carries {} (< activation {}), not delivered",
                sender,
                amount,
                self.activation_amount
            );
            return Ok(None);
        }
        Ok(Some(self.queue.push(sender, amount, message)))
    }

    /// Run the contract over every queued transaction
    pub fn process_block(&mut self) -> BlockReport {
        self.block_height = self.block_height.saturating_add(1);
        if !self.queue.is_exhausted() {
            log::debug!("Block {}: {} transactions queued", self.block_height, self.queue.pending());
        }
        let state = self.runtime.state();
        let mut context = InvokeContext::new(
            state.contract_id,
            state.creator,
            &mut self.ledger,
            &mut self.storage,
            &mut self.queue,
        );
        context.block_height = self.block_height;
        if self.debug {
            context.enable_debug();
        }
        let report = self.runtime.process_block(&mut context);
        self.queue.finish_block();
        report
    }

    /// Account id of the deployed contract
    pub fn contract_id(&self) -> AccountId {
        self.runtime.state().contract_id
    }

    /// Contract scalars
    pub fn state(&self) -> &ContractState {
        self.runtime.state()
    }

    /// Last processed block
    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Balance of `asset` held by `account`
    pub fn balance_of(&self, account: AccountId, asset: AssetId) -> Amount {
        self.ledger.balance_of(account, asset)
    }

    /// Read the contract's map
    pub fn map_value(&self, key1: i64, key2: i64) -> i64 {
        self.storage.get(self.contract_id(), key1, key2)
    }

    /// Transactions accepted since the last block
    pub fn pending_transactions(&self) -> usize {
        self.queue.pending()
    }

    /// All balances
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Capture the durable state
    pub fn snapshot(&self) -> TestbedSnapshot {
        TestbedSnapshot {
            chain: ChainSnapshot {
                block_height: self.block_height,
                ledger: self.ledger.clone(),
                storage: self.storage.clone(),
            },
            queue: self.queue.clone(),
            contract: self.runtime.state().clone(),
            activation_amount: self.activation_amount,
        }
    }

    /// Rebuild a testbed from a snapshot
    pub fn restore(snapshot: TestbedSnapshot) -> Self {
        Self {
            ledger: snapshot.chain.ledger,
            storage: snapshot.chain.storage,
            queue: snapshot.queue,
            runtime: ContractRuntime::new(snapshot.contract),
            activation_amount: snapshot.activation_amount,
            block_height: snapshot.chain.block_height,
            debug: false,
        }
    }

    /// Write the snapshot to `path` in the binary layout
    pub fn save_snapshot(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let bytes = snapshot::encode(&self.snapshot())?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))
    }

    /// Load a testbed from a snapshot file
    pub fn load_snapshot(path: &std::path::Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot: TestbedSnapshot = snapshot::decode(&bytes)?;
        Ok(Self::restore(snapshot))
    }

    /// State dump for display
    pub fn summary(&self) -> StateSummary {
        let contract = self.contract_id();
        StateSummary {
            block_height: self.block_height,
            contract,
            percentage: self.runtime.state().percentage(),
            accounts: self
                .ledger
                .accounts()
                .map(|(id, account)| (*id, account.clone()))
                .collect(),
            map: self
                .storage
                .entries_of(contract)
                .map(|(key, value)| (key.key1, key.key2, *value))
                .collect(),
            pending: self.queue.pending(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testbed_contract::{FORWARD_PERCENTAGE, SET_MAP_VALUE};
    use testbed_program_runtime::RuntimeError;

    const CONTRACT: AccountId = 1000;
    const CREATOR: AccountId = 1;
    const USER: AccountId = 2;

    #[test]
    fn test_submit_moves_attached_amount() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR));
        testbed.fund(USER, NATIVE_ASSET, 300);

        let id = testbed.submit(USER, 200, [0; 4]).unwrap();
        assert_eq!(id, Some(1));
        assert_eq!(testbed.balance_of(USER, NATIVE_ASSET), 100);
        assert_eq!(testbed.balance_of(CONTRACT, NATIVE_ASSET), 200);
    }

    #[test]
    fn test_submit_without_funds_is_rejected() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR));

        let err = testbed.submit(USER, 1, [0; 4]).unwrap_err();
        assert!(matches!(err, RuntimeError::InsufficientFunds { account: USER, .. }));
        assert!(testbed.process_block().receipts.is_empty());
    }

    #[test]
    fn test_below_activation_amount_is_not_delivered() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR)).with_activation_amount(50);
        testbed.fund(USER, NATIVE_ASSET, 100);

        assert_eq!(testbed.submit(USER, 49, [SET_MAP_VALUE, 1, 1, 0]).unwrap(), None);
        let report = testbed.process_block();
        assert!(report.receipts.is_empty());
        assert_eq!(testbed.balance_of(CONTRACT, NATIVE_ASSET), 49);
        assert_eq!(testbed.map_value(1, 1), 0);
    }

    #[test]
    fn test_blocks_increase_height() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR));
        assert_eq!(testbed.process_block().block_height, 1);
        assert_eq!(testbed.process_block().block_height, 2);
        assert_eq!(testbed.block_height(), 2);
    }

    #[test]
    fn test_snapshot_restore_continues() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR).with_percentage(10));
        testbed.fund(USER, NATIVE_ASSET, 1_000);
        testbed.submit(USER, 100, [FORWARD_PERCENTAGE, 9, 0, 0]).unwrap();
        testbed.submit(USER, 0, [SET_MAP_VALUE, 3, 33, 0]).unwrap();
        testbed.process_block();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testbed.bin");
        testbed.save_snapshot(&path).unwrap();
        let mut restored = Testbed::load_snapshot(&path).unwrap();

        assert_eq!(restored.snapshot(), testbed.snapshot());
        assert_eq!(restored.map_value(1, 3), 33);
        assert_eq!(restored.balance_of(9, NATIVE_ASSET), 10);

        // Transaction ids keep increasing across the restore
        assert_eq!(restored.submit(USER, 100, [FORWARD_PERCENTAGE, 9, 0, 0]).unwrap(), Some(3));
        restored.process_block();
        assert_eq!(restored.balance_of(9, NATIVE_ASSET), 20);
        assert_eq!(restored.block_height(), 2);
    }

    #[test]
    fn test_summary_lists_map() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR));
        testbed.submit(USER, 0, [SET_MAP_VALUE, 5, 6, 0]).unwrap();
        testbed.process_block();

        let summary = testbed.summary();
        assert_eq!(summary.map, vec![(1, 5, 6)]);
        assert_eq!(summary.block_height, 1);
        assert_eq!(summary.pending, 0);
    }

    #[test]
    fn test_pending_until_block_runs() {
        let mut testbed = Testbed::deploy(ContractState::new(CONTRACT, CREATOR));
        testbed.submit(USER, 0, [SET_MAP_VALUE, 1, 1, 0]).unwrap();
        testbed.submit(USER, 0, [SET_MAP_VALUE, 1, 2, 0]).unwrap();
        assert_eq!(testbed.pending_transactions(), 2);
        assert_eq!(testbed.summary().pending, 2);

        testbed.process_block();
        assert_eq!(testbed.pending_transactions(), 0);
    }
}

//! Transaction intake loop
//!
//! The runtime pulls transactions from the host one at a time, in queue
//! order, and runs each one to completion before reading the next. A ledger
//! fault aborts only the faulting transaction: the host journal is rolled
//! back and the contract scalars are restored.

use testbed_program_runtime::{Result, TxId, NO_TRANSACTION};
use testbed_syscalls::{Checkpoint, HostEnvironment};

use crate::methods::{dispatch, CurrentTx, Outcome};
use crate::state::ContractState;

/// Where the runtime is in its block cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    /// Between blocks
    Idle,
    /// Draining the transactions of a block
    Processing,
}

/// What happened to one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction id
    pub tx_id: TxId,
    /// Method code found in the message
    pub method: i64,
    /// Handler outcome, or the fault that aborted it
    pub result: Result<Outcome>,
}

impl Receipt {
    /// Whether the transaction's effects were rolled back
    pub fn is_aborted(&self) -> bool {
        self.result.is_err()
    }
}

/// Receipts of a processed block, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReport {
    /// Height of the processed block
    pub block_height: u64,
    /// One receipt per transaction
    pub receipts: Vec<Receipt>,
}

impl BlockReport {
    /// Number of transactions whose handler effects were kept
    pub fn applied(&self) -> usize {
        self.receipts
            .iter()
            .filter(|receipt| receipt.result == Ok(Outcome::Applied))
            .count()
    }

    /// Number of aborted transactions
    pub fn aborted(&self) -> usize {
        self.receipts.iter().filter(|receipt| receipt.is_aborted()).count()
    }
}

/// A deployed contract together with its block-processing state
#[derive(Debug, Clone)]
pub struct ContractRuntime {
    state: ContractState,
    status: RuntimeStatus,
}

impl ContractRuntime {
    /// Wrap a freshly constructed (or restored) contract state
    pub fn new(state: ContractState) -> Self {
        Self { state, status: RuntimeStatus::Idle }
    }

    /// Contract scalars
    pub fn state(&self) -> &ContractState {
        &self.state
    }

    /// Current position in the block cycle
    pub fn status(&self) -> RuntimeStatus {
        self.status
    }

    /// Drain the block's transactions through the dispatch table
    ///
    /// Returns to [`RuntimeStatus::Idle`] once the host yields the
    /// no-more-transactions sentinel.
    pub fn process_block<H>(&mut self, host: &mut H) -> BlockReport
    where
        H: HostEnvironment + Checkpoint + ?Sized,
    {
        let mut report = BlockReport { block_height: host.get_block_height(), receipts: Vec::new() };
        while let Some(receipt) = self.step(host) {
            report.receipts.push(receipt);
        }

        log::info!(
            "Contract {} processed block {}: {} transactions, {} applied, {} aborted",
            self.state.contract_id,
            report.block_height,
            report.receipts.len(),
            report.applied(),
            report.aborted()
        );
        report
    }

    /// Run the next transaction of the block, if any
    ///
    /// Moves to [`RuntimeStatus::Processing`] and stays there until the host
    /// yields the sentinel, at which point the runtime is back to
    /// [`RuntimeStatus::Idle`] and `None` is returned.
    pub fn step<H>(&mut self, host: &mut H) -> Option<Receipt>
    where
        H: HostEnvironment + Checkpoint + ?Sized,
    {
        self.status = RuntimeStatus::Processing;
        let tx_id = host.get_next_tx();
        if tx_id == NO_TRANSACTION {
            self.status = RuntimeStatus::Idle;
            return None;
        }
        Some(self.process_transaction(host, tx_id))
    }

    fn process_transaction<H>(&mut self, host: &mut H, tx_id: TxId) -> Receipt
    where
        H: HostEnvironment + Checkpoint + ?Sized,
    {
        let tx = CurrentTx::read(&*host, tx_id);
        let saved = self.state.clone();

        host.begin_transaction();
        let result = dispatch(&mut self.state, host, &tx);
        match &result {
            Ok(outcome) => {
                host.commit_transaction();
                log::trace!("Transaction {} (method {}): {:?}", tx_id, tx.code(), outcome);
            }
            Err(err) => {
                host.rollback_transaction();
                self.state = saved;
                log::warn!("Transaction {} (method {}) aborted: {}", tx_id, tx.code(), err);
            }
        }

        Receipt { tx_id, method: tx.code(), result }
    }
}

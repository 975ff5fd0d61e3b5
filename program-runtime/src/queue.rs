//! Ordered transactions addressed to a contract within a block
//!
//! The host appends, the contract reads. Each transaction is handed out once,
//! in arrival order, and dropped when the block is finished.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::ledger::{AccountId, Amount};

/// Transaction identifier assigned by the host
pub type TxId = u64;

/// Id returned by the intake loop when the block has no more transactions
pub const NO_TRANSACTION: TxId = 0;

/// Number of words in a transaction message
pub const MESSAGE_WORDS: usize = 4;

/// Fixed-size message payload; word 0 carries the method code
pub type Message = [i64; MESSAGE_WORDS];

/// A transaction delivered to the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Host-assigned id, never [`NO_TRANSACTION`]
    pub id: TxId,
    /// Sending account
    pub sender: AccountId,
    /// Native amount attached to the transaction
    pub amount: Amount,
    /// Message payload
    pub message: Message,
}

impl Transaction {
    /// Method code carried in the first message word
    pub fn method(&self) -> i64 {
        self.message[0]
    }
}

/// Append-only queue with a read cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQueue {
    /// Transactions of the current block: `transactions[..cursor]` have been read
    transactions: VecDeque<Transaction>,
    cursor: usize,
    next_id: TxId,
}

impl Default for TransactionQueue {
    fn default() -> Self {
        Self {
            transactions: VecDeque::new(),
            cursor: 0,
            next_id: 1,
        }
    }
}

impl TransactionQueue {
    /// Creates an empty queue; the first transaction gets id 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transaction and returns its id
    ///
    /// Ids increase monotonically for the lifetime of the queue, across
    /// blocks.
    pub fn push(&mut self, sender: AccountId, amount: Amount, message: Message) -> TxId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.transactions.push_back(Transaction { id, sender, amount, message });
        id
    }

    /// Returns the next unread transaction, or `None` once the block is drained
    pub fn next_transaction(&mut self) -> Option<&Transaction> {
        let tx = self.transactions.get(self.cursor)?;
        self.cursor = self.cursor.saturating_add(1);
        Some(tx)
    }

    /// Look up a transaction of the current block by id
    pub fn get(&self, id: TxId) -> Option<&Transaction> {
        // ids are pushed in increasing order
        let (front, back) = self.transactions.as_slices();
        front
            .binary_search_by_key(&id, |tx| tx.id)
            .map(|idx| &front[idx])
            .or_else(|_| back.binary_search_by_key(&id, |tx| tx.id).map(|idx| &back[idx]))
            .ok()
    }

    /// Number of transactions not yet read
    pub fn pending(&self) -> usize {
        self.transactions.len().saturating_sub(self.cursor)
    }

    /// Whether every queued transaction has been read
    pub fn is_exhausted(&self) -> bool {
        self.pending() == 0
    }

    /// Discards the transactions that have been read
    ///
    /// Unread transactions stay queued for the next block.
    pub fn finish_block(&mut self) {
        self.transactions.drain(..self.cursor);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut queue = TransactionQueue::new();
        assert_eq!(queue.push(10, 0, [1, 0, 0, 0]), 1);
        assert_eq!(queue.push(11, 0, [2, 0, 0, 0]), 2);
        queue.finish_block();
        assert_eq!(queue.push(12, 0, [3, 0, 0, 0]), 3);
    }

    #[test]
    fn test_arrival_order_and_exhaustion() {
        let mut queue = TransactionQueue::new();
        queue.push(10, 5, [1, 0, 0, 0]);
        queue.push(11, 6, [2, 0, 0, 0]);

        assert_eq!(queue.next_transaction().map(|tx| tx.sender), Some(10));
        assert_eq!(queue.next_transaction().map(|tx| tx.sender), Some(11));
        assert!(queue.next_transaction().is_none());
        // Still none: nothing is returned twice
        assert!(queue.next_transaction().is_none());
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_get_by_id() {
        let mut queue = TransactionQueue::new();
        let first = queue.push(10, 5, [1, 2, 3, 4]);
        let second = queue.push(11, 6, [2, 0, 0, 0]);

        assert_eq!(queue.get(first).map(|tx| tx.message), Some([1, 2, 3, 4]));
        assert_eq!(queue.get(second).map(|tx| tx.amount), Some(6));
        assert!(queue.get(NO_TRANSACTION).is_none());
        assert!(queue.get(99).is_none());
    }

    #[test]
    fn test_finish_block_keeps_unread() {
        let mut queue = TransactionQueue::new();
        queue.push(10, 0, [1, 0, 0, 0]);
        queue.push(11, 0, [1, 0, 0, 0]);
        queue.next_transaction();

        queue.finish_block();
        assert_eq!(queue.pending(), 1);
        assert!(queue.get(1).is_none());
        assert_eq!(queue.next_transaction().map(|tx| tx.id), Some(2));
    }

    #[test]
    fn test_method_code() {
        let tx = Transaction { id: 1, sender: 2, amount: 0, message: [4, 7, 0, 0] };
        assert_eq!(tx.method(), 4);
    }
}

//! Transaction and block intrinsics
//!
//! These give a contract its intake loop (`get_next_tx`) and read-only
//! access to the fields of each transaction and to the deployment record.

use testbed_program_runtime::{AccountId, Amount, InvokeContext, TxId};

use crate::syscall_names;

/// Advance to the next transaction of the block
///
/// # Returns
/// The transaction id, or `0` once the block has been drained
pub fn get_next_tx(invoke_context: &mut InvokeContext) -> TxId {
    let tx_id = invoke_context.next_transaction();
    if invoke_context.debug_mode {
        log::debug!("{}() -> {}", syscall_names::GET_NEXT_TX, tx_id);
    }
    tx_id
}

/// Sender of a transaction of the current block (0 if unknown)
pub fn get_sender(invoke_context: &InvokeContext, tx_id: TxId) -> AccountId {
    invoke_context
        .transaction(tx_id)
        .map(|tx| tx.sender)
        .unwrap_or(0)
}

/// Native amount attached to a transaction (0 if unknown)
pub fn get_amount(invoke_context: &InvokeContext, tx_id: TxId) -> Amount {
    invoke_context
        .transaction(tx_id)
        .map(|tx| tx.amount)
        .unwrap_or(0)
}

/// Copy message words into `buffer`
///
/// # Arguments
/// * `tx_id` - Transaction to read
/// * `offset` - Index of the first message word to copy
/// * `buffer` - Output; words past the end of the message read as 0
pub fn read_message(invoke_context: &InvokeContext, tx_id: TxId, offset: usize, buffer: &mut [i64]) {
    let message = invoke_context.transaction(tx_id).map(|tx| tx.message);
    for (idx, slot) in buffer.iter_mut().enumerate() {
        *slot = message
            .zip(offset.checked_add(idx))
            .and_then(|(words, pos)| words.get(pos).copied())
            .unwrap_or(0);
    }
    if invoke_context.debug_mode {
        log::debug!("{}({}, {}) -> {:?}", syscall_names::READ_MESSAGE, tx_id, offset, buffer);
    }
}

/// Account that deployed the running contract
pub fn get_creator(invoke_context: &InvokeContext) -> AccountId {
    invoke_context.creator
}

/// Height of the block being processed
pub fn get_block_height(invoke_context: &InvokeContext) -> u64 {
    invoke_context.block_height
}

//! Error types for the testbed runtime

use thiserror::Error;

use crate::ledger::{AccountId, Amount, AssetId};

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Faults raised by ledger operations and state persistence
///
/// Only the two ledger faults can occur while a contract is running. They
/// abort the effects of the transaction being processed, never the block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// A debit exceeded the account's balance
    #[error("Insufficient funds: account {account} holds {balance} of asset {asset}, needs {amount}")]
    InsufficientFunds {
        /// The account being debited
        account: AccountId,
        /// The asset being debited
        asset: AssetId,
        /// Balance at the time of the debit
        balance: Amount,
        /// Requested amount
        amount: Amount,
    },

    /// A credit would exceed the integer domain
    #[error("Balance overflow: crediting {amount} of asset {asset} to account {account}")]
    Overflow {
        /// The account being credited
        account: AccountId,
        /// The asset being credited
        asset: AssetId,
        /// Requested amount
        amount: Amount,
    },

    /// State snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl From<bincode::Error> for RuntimeError {
    fn from(err: bincode::Error) -> Self {
        RuntimeError::Snapshot(err.to_string())
    }
}

//! Testbed Syscalls
//!
//! This crate provides the host intrinsics testbed contracts call into.
//! Intrinsics let a contract pull its transactions, read their payload,
//! move funds out of its own account and write its persistent map.
//!
//! # Architecture
//!
//! Each intrinsic is a free function over [`InvokeContext`], grouped by
//! concern. [`HostEnvironment`] bundles them into the capability interface
//! contract code is written against, so a contract can run on the real
//! context or on any test double.
//!
//! # Available Intrinsics
//!
//! ## Transactions and block
//! - `getNextTx`, `getSender`, `getAmount`, `readMessage`
//! - `getCreator`, `getBlockHeight`
//!
//! ## Balance
//! - `getCurrentBalance`, `getAssetBalance`
//! - `sendAmount`, `sendBalance`, `sendQuantity`
//!
//! ## Storage
//! - `getMapValue`, `setMapValue`

#![warn(missing_docs)]
#![deny(clippy::arithmetic_side_effects)]

pub mod balance;
pub mod blockchain;
pub mod storage;

use testbed_program_runtime::{AccountId, Amount, AssetId, InvokeContext, Result, TxId};

pub use testbed_program_runtime::Checkpoint;

/// Capability interface exposed by the host to a running contract
///
/// Method names follow the contract language's intrinsics. Reads never
/// fail; sends fail only with ledger faults.
pub trait HostEnvironment {
    /// Next transaction id of the block, `0` when drained
    fn get_next_tx(&mut self) -> TxId;

    /// Sender of a transaction
    fn get_sender(&self, tx_id: TxId) -> AccountId;

    /// Native amount attached to a transaction
    fn get_amount(&self, tx_id: TxId) -> Amount;

    /// Copy message words starting at `offset` into `buffer`
    fn read_message(&self, tx_id: TxId, offset: usize, buffer: &mut [i64]);

    /// Account that deployed the contract
    fn get_creator(&self) -> AccountId;

    /// Height of the block being processed
    fn get_block_height(&self) -> u64;

    /// Contract's own native balance
    fn get_current_balance(&self) -> Amount;

    /// Contract's own balance of a secondary asset
    fn get_asset_balance(&self, asset: AssetId) -> Amount;

    /// Send native currency to `recipient`
    fn send_amount(&mut self, amount: Amount, recipient: AccountId) -> Result<()>;

    /// Send the whole native balance to `recipient`
    fn send_balance(&mut self, recipient: AccountId) -> Result<()>;

    /// Send `amount` of `asset` to `recipient`
    fn send_quantity(&mut self, amount: Amount, asset: AssetId, recipient: AccountId) -> Result<()>;

    /// Read a map entry (0 if absent)
    fn get_map_value(&self, key1: i64, key2: i64) -> i64;

    /// Write a map entry
    fn set_map_value(&mut self, key1: i64, key2: i64, value: i64);
}

impl HostEnvironment for InvokeContext<'_> {
    fn get_next_tx(&mut self) -> TxId {
        blockchain::get_next_tx(self)
    }

    fn get_sender(&self, tx_id: TxId) -> AccountId {
        blockchain::get_sender(self, tx_id)
    }

    fn get_amount(&self, tx_id: TxId) -> Amount {
        blockchain::get_amount(self, tx_id)
    }

    fn read_message(&self, tx_id: TxId, offset: usize, buffer: &mut [i64]) {
        blockchain::read_message(self, tx_id, offset, buffer)
    }

    fn get_creator(&self) -> AccountId {
        blockchain::get_creator(self)
    }

    fn get_block_height(&self) -> u64 {
        blockchain::get_block_height(self)
    }

    fn get_current_balance(&self) -> Amount {
        balance::get_current_balance(self)
    }

    fn get_asset_balance(&self, asset: AssetId) -> Amount {
        balance::get_asset_balance(self, asset)
    }

    fn send_amount(&mut self, amount: Amount, recipient: AccountId) -> Result<()> {
        balance::send_amount(self, amount, recipient)
    }

    fn send_balance(&mut self, recipient: AccountId) -> Result<()> {
        balance::send_balance(self, recipient)
    }

    fn send_quantity(&mut self, amount: Amount, asset: AssetId, recipient: AccountId) -> Result<()> {
        balance::send_quantity(self, amount, asset, recipient)
    }

    fn get_map_value(&self, key1: i64, key2: i64) -> i64 {
        storage::get_map_value(self, key1, key2)
    }

    fn set_map_value(&mut self, key1: i64, key2: i64, value: i64) {
        storage::set_map_value(self, key1, key2, value)
    }
}

/// Intrinsic identifiers
///
/// The names contract source uses for each intrinsic; used in debug logs.
pub mod syscall_names {
    /// Advance the intake loop
    pub const GET_NEXT_TX: &str = "getNextTx";
    /// Read transaction payload
    pub const READ_MESSAGE: &str = "readMessage";
    /// Send native currency
    pub const SEND_AMOUNT: &str = "sendAmount";
    /// Send whole native balance
    pub const SEND_BALANCE: &str = "sendBalance";
    /// Send an asset
    pub const SEND_QUANTITY: &str = "sendQuantity";
    /// Write contract map
    pub const SET_MAP_VALUE: &str = "setMapValue";
}

//! Durable state snapshots
//!
//! A snapshot captures the ledger and contract storage at a block boundary.
//! Hosts embed it in their own checkpoint format together with any
//! contract-local scalars.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::Result;
use crate::ledger::Ledger;
use crate::storage::MemoryStorage;

/// Chain state shared by every contract on the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Height of the last processed block
    pub block_height: u64,
    /// All account balances
    pub ledger: Ledger,
    /// All contract map entries
    pub storage: MemoryStorage,
}

/// Encode any snapshot value with the canonical binary layout
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Decode a snapshot value produced by [`encode`]
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

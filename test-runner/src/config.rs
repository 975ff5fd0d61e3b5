//! Scenario configuration
//!
//! A scenario is a JSON document describing the deployed contract, the
//! genesis balances, and the blocks to run with optional expectations checked
//! after each block.
//!
//! ```json
//! {
//!   "contract": { "id": 1000, "creator": 1, "activation_amount": 0 },
//!   "accounts": [ { "id": 1, "balance": 5000, "assets": { "7": 20 } } ],
//!   "blocks": [
//!     {
//!       "transactions": [ { "sender": 1, "amount": 100, "message": [2, 50] } ],
//!       "expect": { "percentage": 50 }
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use testbed_contract::MAP_KEY_EXAMPLE;
use testbed_program_runtime::{AccountId, Amount, AssetId, Message, MESSAGE_WORDS, NATIVE_ASSET};

/// Top-level scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Contract deployment
    pub contract: ContractConfig,
    /// Genesis balances
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    /// Blocks, processed in order
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

/// Deployment parameters of the contract under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Account id the contract is deployed at
    pub id: AccountId,
    /// Deploying account
    pub creator: AccountId,
    /// Initial forwarded percentage (clamped into 0..=100)
    #[serde(default)]
    pub percentage: i64,
    /// Minimum attached amount for a transaction to reach the contract
    #[serde(default)]
    pub activation_amount: Amount,
}

/// Genesis balances of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Account id
    pub id: AccountId,
    /// Native balance
    #[serde(default)]
    pub balance: Amount,
    /// Secondary asset balances
    #[serde(default)]
    pub assets: BTreeMap<AssetId, Amount>,
}

/// One block of transactions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockConfig {
    /// Transactions in arrival order
    #[serde(default)]
    pub transactions: Vec<TransactionConfig>,
    /// State checked once the block is processed
    #[serde(default)]
    pub expect: Option<Expectations>,
}

/// A transaction submitted to the contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionConfig {
    /// Sending account
    pub sender: AccountId,
    /// Attached native amount
    #[serde(default)]
    pub amount: Amount,
    /// Message words, method code first; missing words are 0
    #[serde(default)]
    pub message: Vec<i64>,
}

impl TransactionConfig {
    /// Message padded to the fixed payload size
    pub fn message_words(&self) -> anyhow::Result<Message> {
        if self.message.len() > MESSAGE_WORDS {
            bail!(
                "message from {} has {} words (max {})",
                self.sender,
                self.message.len(),
                MESSAGE_WORDS
            );
        }
        let mut words = Message::default();
        words[..self.message.len()].copy_from_slice(&self.message);
        Ok(words)
    }
}

/// Post-block assertions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectations {
    /// Expected balances
    #[serde(default)]
    pub balances: Vec<BalanceCheck>,
    /// Expected contract map entries
    #[serde(default)]
    pub map: Vec<MapCheck>,
    /// Expected forwarded percentage
    #[serde(default)]
    pub percentage: Option<i64>,
}

/// Expected balance of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BalanceCheck {
    /// Account id
    pub account: AccountId,
    /// Asset id, native when omitted
    #[serde(default = "native_asset")]
    pub asset: AssetId,
    /// Expected balance
    pub balance: Amount,
}

/// Expected contract map entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapCheck {
    /// Primary key, the example map when omitted
    #[serde(default = "example_map_key")]
    pub key1: i64,
    /// Secondary key
    pub key2: i64,
    /// Expected value
    pub value: i64,
}

fn native_asset() -> AssetId {
    NATIVE_ASSET
}

fn example_map_key() -> i64 {
    MAP_KEY_EXAMPLE
}

impl ScenarioConfig {
    /// Load a scenario from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    /// Parse a scenario from JSON text
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (height, block) in self.blocks.iter().enumerate() {
            for tx in &block.transactions {
                tx.message_words()
                    .with_context(|| format!("block {}", height.saturating_add(1)))?;
            }
        }
        Ok(())
    }
}

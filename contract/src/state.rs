//! Contract-local state

use serde::{Deserialize, Serialize};
use testbed_program_runtime::AccountId;

/// Upper bound of the forwarded percentage
pub const MAX_PERCENTAGE: i64 = 100;

/// Scalars owned by a deployed contract
///
/// The key-value map is not held here; it lives in contract storage under
/// `contract_id`. Both together form the contract's durable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// Account id the contract is deployed at
    pub contract_id: AccountId,
    /// Deploying account, fixed at construction
    pub creator: AccountId,
    /// Share of incoming amounts forwarded by `ForwardPercentage`, always 0..=100
    percentage: i64,
}

impl ContractState {
    /// State of a freshly deployed contract (percentage 0)
    pub fn new(contract_id: AccountId, creator: AccountId) -> Self {
        Self { contract_id, creator, percentage: 0 }
    }

    /// Deploy with an initial percentage, clamped into range
    pub fn with_percentage(mut self, percentage: i64) -> Self {
        self.set_percentage(percentage);
        self
    }

    /// Current forwarded percentage
    pub fn percentage(&self) -> i64 {
        self.percentage
    }

    /// Store a new percentage, clamped into `0..=100`
    pub fn set_percentage(&mut self, percentage: i64) {
        self.percentage = percentage.clamp(0, MAX_PERCENTAGE);
    }
}

//! Scenario execution and expectation checks

use testbed_contract::BlockReport;

use crate::config::{Expectations, ScenarioConfig};
use crate::testbed::Testbed;

/// Result of running a scenario
pub struct ScenarioOutcome {
    /// Final testbed state
    pub testbed: Testbed,
    /// One report per processed block
    pub blocks: Vec<BlockReport>,
    /// Failed expectations and rejected transactions, in order
    pub failures: Vec<String>,
}

impl ScenarioOutcome {
    /// Whether every expectation held and every transaction was accepted
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Deploy the scenario's contract and run all of its blocks
pub fn run_scenario(config: &ScenarioConfig, debug: bool) -> anyhow::Result<ScenarioOutcome> {
    let mut testbed = Testbed::from_config(config);
    if debug {
        testbed.enable_debug();
    }
    let mut blocks = Vec::with_capacity(config.blocks.len());
    let mut failures = Vec::new();

    for block in &config.blocks {
        let height = testbed.block_height().saturating_add(1);
        for tx in &block.transactions {
            let message = tx.message_words()?;
            if let Err(err) = testbed.submit(tx.sender, tx.amount, message) {
                failures.push(format!("block {}: transaction from {} rejected: {}", height, tx.sender, err));
            }
        }

        let report = testbed.process_block();
        if let Some(expect) = &block.expect {
            failures.extend(
                check(expect, &testbed)
                    .into_iter()
                    .map(|failure| format!("block {}: {}", height, failure)),
            );
        }
        blocks.push(report);
    }

    Ok(ScenarioOutcome { testbed, blocks, failures })
}

/// Compare the testbed against the expectations
///
/// Returns one message per mismatch.
pub fn check(expect: &Expectations, testbed: &Testbed) -> Vec<String> {
    let mut failures = Vec::new();

    for balance in &expect.balances {
        let actual = testbed.balance_of(balance.account, balance.asset);
        if actual != balance.balance {
            failures.push(format!(
                "balance of account {} (asset {}) is {}, expected {}",
                balance.account, balance.asset, actual, balance.balance
            ));
        }
    }

    for entry in &expect.map {
        let actual = testbed.map_value(entry.key1, entry.key2);
        if actual != entry.value {
            failures.push(format!(
                "map ({}, {}) is {}, expected {}",
                entry.key1, entry.key2, actual, entry.value
            ));
        }
    }

    if let Some(percentage) = expect.percentage {
        let actual = testbed.state().percentage();
        if actual != percentage {
            failures.push(format!("percentage is {}, expected {}", actual, percentage));
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_expectation_is_reported() {
        let raw = r#"{
            "contract": { "id": 1000, "creator": 1 },
            "blocks": [ { "expect": { "percentage": 5, "map": [ { "key2": 1, "value": 2 } ] } } ]
        }"#;
        let config = ScenarioConfig::from_json(raw).unwrap();

        let outcome = run_scenario(&config, false).unwrap();
        assert!(!outcome.passed());
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures[0].starts_with("block 1: map (1, 1)"));
        assert!(outcome.failures[1].starts_with("block 1: percentage"));
    }

    #[test]
    fn test_rejected_transaction_is_reported() {
        let raw = r#"{
            "contract": { "id": 1000, "creator": 1 },
            "blocks": [ { "transactions": [ { "sender": 2, "amount": 10, "message": [3, 1, 1] } ] } ]
        }"#;
        let config = ScenarioConfig::from_json(raw).unwrap();

        let outcome = run_scenario(&config, false).unwrap();
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome.blocks[0].receipts.is_empty());
    }
}

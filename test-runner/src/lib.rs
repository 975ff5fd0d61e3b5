//! Testbed scenario runner
//!
//! Hosts the sample contract on an in-memory chain and drives it through
//! JSON scenarios, checking balances, map entries and the forwarded
//! percentage after each block.

#![warn(missing_docs)]
#![deny(clippy::arithmetic_side_effects)]

pub mod config;
pub mod scenario;
pub mod testbed;

pub use config::ScenarioConfig;
pub use scenario::{run_scenario, ScenarioOutcome};
pub use testbed::{StateSummary, Testbed, TestbedSnapshot};

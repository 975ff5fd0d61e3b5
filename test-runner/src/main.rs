//! Run a testbed scenario from the command line

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use testbed_runner::{run_scenario, ScenarioConfig};

/// Testbed scenario runner
#[derive(Parser, Debug)]
#[command(name = "test-runner")]
#[command(about = "Run the sample contract through a JSON scenario", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file
    scenario: PathBuf,

    /// Write the final state snapshot to this path
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Log every host intrinsic call
    #[arg(short, long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::builder()
        .filter_level(if cli.debug { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let config = ScenarioConfig::load(&cli.scenario)?;
    let outcome = run_scenario(&config, cli.debug)?;

    for report in &outcome.blocks {
        println!(
            "block {}: {} transactions, {} applied, {} aborted",
            report.block_height,
            report.receipts.len(),
            report.applied(),
            report.aborted()
        );
    }

    let summary = serde_json::to_string_pretty(&outcome.testbed.summary())
        .context("Failed to render final state")?;
    println!("{}", summary);

    if let Some(path) = &cli.snapshot {
        outcome.testbed.save_snapshot(path)?;
        log::info!("Snapshot written to {}", path.display());
    }

    if !outcome.passed() {
        for failure in &outcome.failures {
            log::error!("{}", failure);
        }
        bail!("{} expectation(s) failed", outcome.failures.len());
    }
    Ok(())
}

//! Headless island runner.
//!
//! Runs one island scenario and prints the yearly statistics as JSON.

mod telemetry;

use anyhow::{Context, Result};
use biosim_core::SimulationConfig;
use biosim_world::Simulation;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Run an island simulation and print the per-year history as JSON
#[derive(Parser, Debug)]
#[command(name = "biosim-runner")]
#[command(about = "Simulate herbivores and carnivores on an island")]
struct Args {
    /// Scenario file (JSON). The built-in demonstration island is used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Years to simulate, overriding the scenario
    #[arg(long)]
    years: Option<u32>,

    /// Random seed, overriding the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Write log events as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            SimulationConfig::from_json(&text)
                .with_context(|| format!("invalid scenario {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };

    if let Some(years) = args.years {
        config.num_years = years;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_telemetry(args.json_logs)?;

    let config = load_config(&args)?;
    info!(
        seed = config.seed,
        years = config.num_years,
        "Starting BioSim runner"
    );

    let mut simulation = Simulation::new(config).context("failed to set up the island")?;
    let result = simulation.run();

    let output = serde_json::to_string_pretty(&result).context("failed to encode results")?;
    println!("{output}");
    Ok(())
}

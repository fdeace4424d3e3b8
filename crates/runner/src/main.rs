//! Scenario runner: baseline contagion run plus parameter sweeps, reported
//! as JSON on stdout.
//!
//! Usage: contagion-runner [dataset-path]
//!
//! Without an argument a bundled sample of EBA-style balance sheets is used.

mod sweep;

use abm::{Model, SimulationConfig, SimulationReport};
use anyhow::Context;
use log::info;
use serde::Serialize;

use sweep::{ClearingComparison, PolicyComparison, SweepPoint};

const BUNDLED_DATASET: &str = include_str!("../data/eba_sample.txt");

#[derive(Debug, Serialize)]
struct RunnerReport {
    baseline: SimulationReport,
    price_impact_sweep: Vec<SweepPoint>,
    initial_shock_sweep: Vec<SweepPoint>,
    leverage_policy: PolicyComparison,
    clearing_mode: ClearingComparison,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let dataset = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading dataset {path}"))?,
        None => BUNDLED_DATASET.to_string(),
    };

    let config = SimulationConfig::default();
    info!("baseline run");
    let baseline = Model::initialize(config.clone(), &dataset)
        .context("initializing baseline model")?
        .run();

    let report = RunnerReport {
        baseline,
        price_impact_sweep: sweep::price_impact_sweep(&config, &dataset, 0.1, 20)?,
        initial_shock_sweep: sweep::initial_shock_sweep(&config, &dataset, 0.3, 20)?,
        leverage_policy: sweep::leverage_policy_comparison(&config, &dataset)?,
        clearing_mode: sweep::clearing_mode_comparison(&config, &dataset)?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

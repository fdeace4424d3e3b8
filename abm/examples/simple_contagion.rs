//! Minimal contagion run: shock government bonds by 20% and watch the
//! cascade unfold over six rounds.
//!
//! Run with: cargo run --example simple_contagion

use abm::{AssetType, Model, SimulationConfig};

const DATASET: &str = "\
name cet1 leverage_pct debt_securities government_bonds
Alpha 4000 4.0 30000 20000
Beta 7000 7.0 25000 10000
Gamma 4100 4.1 32000 24000
Delta 9000 6.0 40000 15000
";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = SimulationConfig::default();
    println!(
        "shock: {} -{:.0}%, {} rounds, clearing {:?}",
        config.shocked_asset,
        100.0 * config.initial_shock,
        config.rounds,
        config.clearing_mode
    );

    let mut model = Model::initialize(config, DATASET)?;
    let report = model.run();

    println!("\nround  defaults  corp price  gov price");
    for round in &report.rounds {
        println!(
            "{:>5}  {:>8}  {:>10.4}  {:>9.4}",
            round.round,
            round.defaults,
            round.prices[&AssetType::CorporateBonds],
            round.prices[&AssetType::GovernmentBonds],
        );
    }

    println!("\nbank        status");
    for bank in model.banks() {
        println!("{:<10}  {:?}", bank.name(), bank.status());
    }
    println!(
        "\nsystemic risk: {:.2} ({}/{} banks defaulted)",
        report.systemic_risk, report.defaulted_banks, report.banks
    );
    Ok(())
}

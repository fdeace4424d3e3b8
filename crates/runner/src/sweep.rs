//! Parameter sweeps over the contagion model.
//!
//! Each sweep re-runs the full simulation from the same dataset while one
//! parameter moves across its range, recording how many banks default. This
//! is the main tool for studying how fragile a banking system is to the
//! price-impact and shock assumptions.

use abm::{ClearingMode, Model, ModelError, PriceImpacts, SimulationConfig};
use log::info;
use serde::Serialize;

/// One simulation outcome at one parameter value.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub parameter: f64,
    pub defaulted_banks: u32,
    pub systemic_risk: f64,
}

fn run_once(config: SimulationConfig, dataset: &str, parameter: f64) -> Result<SweepPoint, ModelError> {
    let report = Model::initialize(config, dataset)?.run();
    Ok(SweepPoint {
        parameter,
        defaulted_banks: report.defaulted_banks,
        systemic_risk: report.systemic_risk,
    })
}

/// Sweep the uniform price-impact coefficient from 0 to `max` in `steps`
/// increments (inclusive on both ends).
pub fn price_impact_sweep(
    base: &SimulationConfig,
    dataset: &str,
    max: f64,
    steps: usize,
) -> Result<Vec<SweepPoint>, ModelError> {
    info!("price-impact sweep: 0..{max} in {steps} steps");
    let mut points = Vec::with_capacity(steps + 1);
    for step in 0..=steps {
        let impact = max * step as f64 / steps as f64;
        let config = SimulationConfig {
            price_impacts: PriceImpacts::uniform(impact),
            ..base.clone()
        };
        points.push(run_once(config, dataset, impact)?);
    }
    Ok(points)
}

/// Sweep the initial shock fraction from 0 to `max`.
pub fn initial_shock_sweep(
    base: &SimulationConfig,
    dataset: &str,
    max: f64,
    steps: usize,
) -> Result<Vec<SweepPoint>, ModelError> {
    info!("initial-shock sweep: 0..{max} in {steps} steps");
    let mut points = Vec::with_capacity(steps + 1);
    for step in 0..=steps {
        let shock = max * step as f64 / steps as f64;
        let config = SimulationConfig {
            initial_shock: shock,
            ..base.clone()
        };
        points.push(run_once(config, dataset, shock)?);
    }
    Ok(points)
}

/// Baseline threshold behavior against pure leverage targeting (buffer set
/// to 1.0, so every bank below target delevers every round).
#[derive(Debug, Clone, Serialize)]
pub struct PolicyComparison {
    pub threshold: SweepPoint,
    pub targeting: SweepPoint,
}

pub fn leverage_policy_comparison(
    base: &SimulationConfig,
    dataset: &str,
) -> Result<PolicyComparison, ModelError> {
    let threshold = run_once(base.clone(), dataset, base.leverage.buffer)?;

    let mut targeting_config = base.clone();
    targeting_config.leverage.buffer = 1.0;
    let targeting = run_once(targeting_config, dataset, 1.0)?;

    Ok(PolicyComparison {
        threshold,
        targeting,
    })
}

/// Batched clearing against order-dependent sequential clearing.
#[derive(Debug, Clone, Serialize)]
pub struct ClearingComparison {
    pub simultaneous: SweepPoint,
    pub immediate: SweepPoint,
}

pub fn clearing_mode_comparison(
    base: &SimulationConfig,
    dataset: &str,
) -> Result<ClearingComparison, ModelError> {
    let simultaneous = run_once(
        SimulationConfig {
            clearing_mode: ClearingMode::Simultaneous,
            ..base.clone()
        },
        dataset,
        0.0,
    )?;
    let immediate = run_once(
        SimulationConfig {
            clearing_mode: ClearingMode::Immediate,
            ..base.clone()
        },
        dataset,
        1.0,
    )?;
    Ok(ClearingComparison {
        simultaneous,
        immediate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = "\
name cet1 leverage_pct debt_securities government_bonds
Alpha 4000 4.0 30000 20000
Beta 7000 7.0 25000 10000
";

    #[test]
    fn test_sweep_covers_both_endpoints() {
        let base = SimulationConfig::default();
        let points = price_impact_sweep(&base, DATASET, 0.1, 20).unwrap();
        assert_eq!(points.len(), 21);
        assert_eq!(points[0].parameter, 0.0);
        assert!((points[20].parameter - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_more_defaults_with_bigger_shocks() {
        let base = SimulationConfig::default();
        let points = initial_shock_sweep(&base, DATASET, 0.3, 10).unwrap();
        assert!(points[0].defaulted_banks <= points[10].defaulted_banks);
    }

    #[test]
    fn test_policy_comparison_runs() {
        let base = SimulationConfig::default();
        let comparison = leverage_policy_comparison(&base, DATASET).unwrap();
        assert!(comparison.targeting.systemic_risk >= 0.0);
        assert!(comparison.threshold.systemic_risk >= 0.0);
    }
}

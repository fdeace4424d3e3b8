//! Simulation configuration.

use crate::application::market::ClearingMode;
use crate::domain::PriceImpacts;
use contagion_core::AssetType;
use contagion_risk::LeverageConstraint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("initial shock must lie in [0, 1), got {0}")]
    InvalidShock(f64),
    #[error("price impact coefficient must lie in [0, 1), got {0}")]
    InvalidPriceImpact(f64),
    #[error("reference fraction must be positive, got {0}")]
    InvalidReferenceFraction(f64),
    #[error("leverage target must be positive, got {0}")]
    InvalidLeverageTarget(f64),
    #[error("round count must be positive")]
    NoRounds,
}

/// Everything a simulation run is parameterized by.
///
/// The default values reproduce the baseline scenario: a 20% shock to
/// government bonds, six rounds, simultaneous clearing, and a fixed seed for
/// the per-round agent shuffle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub leverage: LeverageConstraint,
    pub shocked_asset: AssetType,
    /// Fractional price drop applied to the shocked asset before round one.
    pub initial_shock: f64,
    pub rounds: u64,
    pub price_impacts: PriceImpacts,
    pub clearing_mode: ClearingMode,
    /// Seed for the agent-order shuffle. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            leverage: LeverageConstraint::default(),
            shocked_asset: AssetType::GovernmentBonds,
            initial_shock: 0.2,
            rounds: 6,
            price_impacts: PriceImpacts::default(),
            clearing_mode: ClearingMode::Simultaneous,
            seed: Some(1337),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.initial_shock) {
            return Err(ConfigError::InvalidShock(self.initial_shock));
        }
        let mut coefficients = vec![self.price_impacts.default];
        coefficients.extend(self.price_impacts.overrides.values().copied());
        for coefficient in coefficients {
            if !(0.0..1.0).contains(&coefficient) {
                return Err(ConfigError::InvalidPriceImpact(coefficient));
            }
        }
        if self.price_impacts.reference_fraction <= 0.0 {
            return Err(ConfigError::InvalidReferenceFraction(
                self.price_impacts.reference_fraction,
            ));
        }
        if self.leverage.target <= 0.0 {
            return Err(ConfigError::InvalidLeverageTarget(self.leverage.target));
        }
        if self.rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_shock_outside_unit_interval() {
        let config = SimulationConfig {
            initial_shock: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidShock(1.0)));
    }

    #[test]
    fn test_rejects_degenerate_price_impact() {
        let config = SimulationConfig {
            price_impacts: PriceImpacts::uniform(1.0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidPriceImpact(1.0)));
    }

    #[test]
    fn test_rejects_zero_rounds() {
        let config = SimulationConfig {
            rounds: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoRounds));
    }

    #[test]
    fn test_roundtrips_through_json() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}

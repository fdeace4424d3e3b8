//! Exponential price impact.
//!
//! Selling pressure moves prices through a calibrated exponential decay
//! (Greenwood-style): the decay rate `beta` is chosen so that selling the
//! reference fraction of an asset's market capitalization drops its price by
//! the configured impact coefficient. Prices decay multiplicatively across
//! rounds and can never go negative.

use contagion_core::AssetType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Impact coefficient applied to every asset class unless overridden.
pub const DEFAULT_PRICE_IMPACT: f64 = 0.05;

/// Fraction of market capitalization the coefficient is calibrated at:
/// selling 5% of the market at a 0.05 coefficient drops the price by 5%.
pub const DEFAULT_REFERENCE_FRACTION: f64 = 0.05;

/// Multiplier applied to the current price when `fraction_sold` of the
/// market capitalization is sold in one clearing pass.
pub fn price_decay_factor(price_impact: f64, reference_fraction: f64, fraction_sold: f64) -> f64 {
    let beta = -(1.0 - price_impact).ln() / reference_fraction;
    (-fraction_sold * beta).exp()
}

/// Per-asset-class price-impact calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceImpacts {
    /// Coefficient used when no per-class override exists.
    pub default: f64,
    pub overrides: BTreeMap<AssetType, f64>,
    pub reference_fraction: f64,
}

impl Default for PriceImpacts {
    fn default() -> Self {
        Self {
            default: DEFAULT_PRICE_IMPACT,
            overrides: BTreeMap::new(),
            reference_fraction: DEFAULT_REFERENCE_FRACTION,
        }
    }
}

impl PriceImpacts {
    /// One coefficient for every asset class, at the default calibration.
    pub fn uniform(price_impact: f64) -> Self {
        Self {
            default: price_impact,
            ..Default::default()
        }
    }

    pub fn coefficient(&self, asset_type: AssetType) -> f64 {
        self.overrides.get(&asset_type).copied().unwrap_or(self.default)
    }

    /// Price multiplier for selling `fraction_sold` of the given class.
    pub fn decay(&self, asset_type: AssetType, fraction_sold: f64) -> f64 {
        price_decay_factor(
            self.coefficient(asset_type),
            self.reference_fraction,
            fraction_sold,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_calibration_anchor() {
        // Selling the reference fraction drops the price by the coefficient.
        let factor = price_decay_factor(0.05, 0.05, 0.05);
        assert_abs_diff_eq!(factor, 0.95, epsilon = 1e-12);

        let factor = price_decay_factor(0.1, 0.1, 0.1);
        assert_abs_diff_eq!(factor, 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_sold_leaves_price_unchanged() {
        assert_abs_diff_eq!(price_decay_factor(0.05, 0.05, 0.0), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_strictly_decreasing_in_quantity_sold() {
        let mut last = 1.0;
        for i in 1..=100 {
            let fraction = i as f64 / 100.0;
            let factor = price_decay_factor(0.05, 0.05, fraction);
            assert!(factor < last, "factor not decreasing at fraction {fraction}");
            last = factor;
        }
    }

    #[test]
    fn test_price_stays_strictly_positive() {
        // The whole market sold at once (fraction 1.0, the most the
        // put-for-sale bookkeeping permits) still leaves a positive factor.
        for &fraction in &[0.25, 0.5, 0.75, 1.0] {
            let factor = price_decay_factor(0.2, 0.05, fraction);
            assert!(factor > 0.0, "factor vanished at fraction {fraction}");
        }
    }

    #[test]
    fn test_zero_coefficient_is_inert() {
        assert_abs_diff_eq!(price_decay_factor(0.0, 0.05, 0.3), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut impacts = PriceImpacts::uniform(0.05);
        impacts.overrides.insert(AssetType::GovernmentBonds, 0.01);
        assert_eq!(impacts.coefficient(AssetType::GovernmentBonds), 0.01);
        assert_eq!(impacts.coefficient(AssetType::CorporateBonds), 0.05);
    }
}

//! Bank leverage constraint.
//!
//! Leverage is defined as equity valuation over asset valuation. A bank is
//! insolvent below the minimum threshold; it starts deleveraging below the
//! looser buffer threshold, targeting the configured target ratio.

use contagion_core::Ledger;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a bank defaulted.
///
/// The general framework also knows liquidity and failed-margin-call
/// defaults; this model restricts the trigger to solvency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    Solvency,
}

impl fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultReason::Solvency => write!(f, "solvency"),
        }
    }
}

/// Leverage policy thresholds, as fractions (e.g. 0.03 = 3%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageConstraint {
    /// Below this the bank is insolvent.
    pub minimum: f64,
    /// Below this the bank starts deleveraging. Setting the buffer to 1.0
    /// turns the threshold model into pure leverage targeting.
    pub buffer: f64,
    /// The ratio deleveraging aims to restore.
    pub target: f64,
}

impl Default for LeverageConstraint {
    fn default() -> Self {
        Self {
            minimum: 0.03,
            buffer: 0.05,
            target: 0.07,
        }
    }
}

impl LeverageConstraint {
    /// Current leverage: equity valuation over asset valuation.
    pub fn leverage(&self, ledger: &Ledger) -> f64 {
        ledger.equity_valuation() / ledger.asset_valuation()
    }

    /// Insolvency test. A non-positive asset base leaves leverage undefined
    /// and is treated as insolvent.
    pub fn is_insolvent(&self, ledger: &Ledger) -> bool {
        let assets = ledger.asset_valuation();
        if assets <= 0.0 {
            return true;
        }
        ledger.equity_valuation() / assets < self.minimum
    }

    /// Amount of assets to shed to restore the target leverage ratio.
    ///
    /// Zero unless leverage has fallen below the buffer. Otherwise the gap
    /// between the current implied asset base (E/lambda) and the asset base
    /// the target ratio implies (E/target), floored at zero.
    pub fn amount_to_delever(&self, ledger: &Ledger) -> f64 {
        let leverage = self.leverage(ledger);
        if leverage >= self.buffer {
            return 0.0;
        }
        let equity = ledger.equity_valuation();
        let current = equity / leverage;
        let target = equity / self.target;
        let amount = (current - target).max(0.0);
        debug!(
            "deleverage check: leverage={:.4} buffer={:.4} amount={:.2}",
            leverage, self.buffer, amount
        );
        amount
    }
}

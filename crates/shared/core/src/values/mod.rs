//! Value objects shared across the contagion model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amounts below this floor are treated as zero to keep floating-point dust
/// out of ledgers and the order book.
pub const NEGLIGIBLE_AMOUNT: f64 = 1e-9;

/// Every tradable asset starts the simulation at unit price.
pub const DEFAULT_PRICE: f64 = 1.0;

/// Tradable asset classes.
///
/// The model restricts itself to two debt-security classes; everything else a
/// bank holds is an inert `Other` position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetType {
    CorporateBonds,
    GovernmentBonds,
}

impl AssetType {
    /// All asset classes traded on the market.
    pub const ALL: [AssetType; 2] = [AssetType::CorporateBonds, AssetType::GovernmentBonds];
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::CorporateBonds => write!(f, "corporate bonds"),
            AssetType::GovernmentBonds => write!(f, "government bonds"),
        }
    }
}

/// Index of a bank in the simulation roster.
///
/// Banks are never removed from the roster (a defaulted bank simply stops
/// acting), so the index is stable for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BankId(pub usize);

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bank#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_ordering_is_stable() {
        // Ordered maps keyed by asset type drive deterministic iteration.
        assert!(AssetType::CorporateBonds < AssetType::GovernmentBonds);
        assert_eq!(AssetType::ALL.len(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(AssetType::GovernmentBonds.to_string(), "government bonds");
        assert_eq!(BankId(3).to_string(), "bank#3");
    }
}

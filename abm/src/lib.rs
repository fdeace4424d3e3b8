//! Agent-Based Model (ABM) for fire-sale contagion
//!
//! This crate simulates financial contagion among bank agents connected
//! through shared tradable-asset markets and loan contracts. An initial price
//! shock triggers deleveraging; asset sales feed back into prices through an
//! exponential price-impact function, and defaults cascade.

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export key types at crate root
pub use application::agents::{Action, ActionKind, Bank, BankStatus, DecisionOutcome};
pub use application::market::{AssetMarket, ClearingMode, MarketClearing, SaleOrder, Trade};
pub use application::simulation::{
    ConfigError, Model, ModelError, RoundReport, SimulationConfig, SimulationReport,
};
pub use contagion_core::{AssetType, BankId};
pub use domain::{PriceImpacts, price_decay_factor};
pub use infrastructure::{
    BalanceSheetRow, DataError, OpeningBalances, load_balance_sheets, parse_balance_sheets,
};

//! Simulation driver.
//!
//! The model owns the bank roster, the market, and the round loop. Each
//! round it steps every bank (settling last round's pending defaults into
//! fire-sales), clears the market, applies the resulting settlements, and
//! then lets every active bank act. Agents are visited in a freshly shuffled
//! order every round; under simultaneous clearing the outcome does not
//! depend on that order.

use std::collections::BTreeMap;

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

use crate::application::agents::{Bank, BankStatus};
use crate::application::market::{AssetMarket, ClearingMode, MarketClearing};
use crate::application::simulation::config::{ConfigError, SimulationConfig};
use crate::infrastructure::{DataError, OpeningBalances, parse_balance_sheets};
use contagion_core::{AssetType, BankId, Contract, Ledger, Loan, Other, Tradable, DEFAULT_PRICE};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("dataset contains no banks")]
    EmptyRoster,
}

/// Snapshot of one round's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u64,
    /// Defaults triggered in this round.
    pub defaults: u32,
    pub prices: BTreeMap<AssetType, f64>,
    pub sold_this_round: BTreeMap<AssetType, f64>,
    pub cumulative_sold: BTreeMap<AssetType, f64>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub rounds: Vec<RoundReport>,
    pub banks: usize,
    pub defaulted_banks: u32,
    /// Fraction of the roster that defaulted.
    pub systemic_risk: f64,
    pub total_sold: BTreeMap<AssetType, f64>,
}

#[derive(Debug)]
pub struct Model {
    config: SimulationConfig,
    market: AssetMarket,
    banks: Vec<Bank>,
    rng: StdRng,
    round: u64,
    total_defaults: u32,
}

impl Model {
    /// Build a model from a configuration and a balance-sheet dataset in its
    /// text form.
    pub fn initialize(config: SimulationConfig, dataset: &str) -> Result<Self, ModelError> {
        config.validate()?;
        let rows = parse_balance_sheets(dataset)?;
        if rows.is_empty() {
            return Err(ModelError::EmptyRoster);
        }

        let mut market = AssetMarket::new(config.price_impacts.clone(), config.clearing_mode);
        let mut banks = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let balances = OpeningBalances::derive(row);
            let mut ledger = Ledger::new(balances.cash);
            ledger.add_asset(Contract::Tradable(Tradable::new(
                AssetType::CorporateBonds,
                balances.corporate_bonds,
                DEFAULT_PRICE,
            )));
            ledger.add_asset(Contract::Tradable(Tradable::new(
                AssetType::GovernmentBonds,
                balances.government_bonds,
                DEFAULT_PRICE,
            )));
            ledger.add_asset(Contract::Other(Other::new(balances.other_asset)));
            ledger.add_liability(Contract::Loan(Loan::new(balances.loan)));
            ledger.add_liability(Contract::Other(Other::new(balances.other_liability)));

            market.register_holding(AssetType::CorporateBonds, balances.corporate_bonds);
            market.register_holding(AssetType::GovernmentBonds, balances.government_bonds);
            banks.push(Bank::new(BankId(index), row.name.clone(), ledger, config.leverage));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!(
            "initialized {} banks, {} rounds, {:?} clearing",
            banks.len(),
            config.rounds,
            config.clearing_mode
        );
        Ok(Self {
            config,
            market,
            banks,
            rng,
            round: 0,
            total_defaults: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn banks(&self) -> &[Bank] {
        &self.banks
    }

    pub fn market(&self) -> &AssetMarket {
        &self.market
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Drop the price of one asset class by `fraction` and reprice every
    /// holder. This is the exogenous event that starts the cascade.
    pub fn apply_initial_shock(&mut self, asset_type: AssetType, fraction: f64) {
        let price = self.market.price(asset_type) * (1.0 - fraction);
        self.market.set_price(asset_type, price);
        self.refresh_holders(asset_type);
        info!("initial shock: {} repriced to {:.4}", asset_type, price);
    }

    /// Run one round visiting agents in a freshly shuffled order.
    pub fn advance_round(&mut self) -> RoundReport {
        let mut order: Vec<usize> = (0..self.banks.len()).collect();
        order.shuffle(&mut self.rng);
        self.run_round(&order)
    }

    /// Run one round visiting agents in the given order. Exposed so callers
    /// can compare permutations directly; [`Self::advance_round`] is the
    /// usual entry point.
    pub fn run_round(&mut self, order: &[usize]) -> RoundReport {
        self.round += 1;
        let sold_before = self.market.cumulative_sold().clone();

        // Settlement phase: pending defaults liquidate.
        for &index in order {
            self.banks[index].step(&mut self.market);
            if self.market.mode() == ClearingMode::Immediate {
                self.refresh_all_prices();
            }
        }

        let clearing = self.market.clear_the_market();
        self.apply_clearing(&clearing);

        // Decision phase.
        let mut defaults = 0;
        for &index in order {
            if self.banks[index].act(&mut self.market) {
                defaults += 1;
            }
            if self.market.mode() == ClearingMode::Immediate {
                self.refresh_all_prices();
            }
        }
        self.total_defaults += defaults;

        let cumulative_sold = self.market.cumulative_sold().clone();
        let mut sold_this_round = BTreeMap::new();
        let mut prices = BTreeMap::new();
        for asset_type in AssetType::ALL {
            let before = sold_before.get(&asset_type).copied().unwrap_or(0.0);
            let after = cumulative_sold.get(&asset_type).copied().unwrap_or(0.0);
            sold_this_round.insert(asset_type, after - before);
            prices.insert(asset_type, self.market.price(asset_type));
        }
        let report = RoundReport {
            round: self.round,
            defaults,
            prices,
            sold_this_round,
            cumulative_sold,
        };
        info!(
            "round {}: {} defaults triggered, {} alive",
            report.round,
            report.defaults,
            self.banks.iter().filter(|b| b.is_alive()).count()
        );
        report
    }

    /// Apply the initial shock and run the configured number of rounds.
    pub fn run(&mut self) -> SimulationReport {
        self.apply_initial_shock(self.config.shocked_asset, self.config.initial_shock);
        let mut rounds = Vec::with_capacity(self.config.rounds as usize);
        while self.round < self.config.rounds {
            rounds.push(self.advance_round());
        }
        SimulationReport {
            rounds,
            banks: self.banks.len(),
            defaulted_banks: self.total_defaults,
            systemic_risk: f64::from(self.total_defaults) / self.banks.len() as f64,
            total_sold: self.market.cumulative_sold().clone(),
        }
    }

    /// Count of banks currently defaulted or pending default.
    pub fn defaulted_banks(&self) -> usize {
        self.banks
            .iter()
            .filter(|b| b.status() != BankStatus::Active)
            .count()
    }

    /// Apply a clearing outcome: reprice every holder of a repriced class,
    /// then settle each trade into its bank's ledger.
    fn apply_clearing(&mut self, clearing: &MarketClearing) {
        for &asset_type in &clearing.repriced {
            self.refresh_holders(asset_type);
        }
        for trade in &clearing.trades {
            self.banks[trade.bank.0].settle(trade);
        }
    }

    fn refresh_holders(&mut self, asset_type: AssetType) {
        let price = self.market.price(asset_type);
        for bank in &mut self.banks {
            bank.refresh_price(asset_type, price);
        }
    }

    fn refresh_all_prices(&mut self) {
        for asset_type in AssetType::ALL {
            self.refresh_holders(asset_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const DATASET: &str = "\
name cet1 leverage_pct debt_securities government_bonds
Alpha 4000 4.0 30000 20000
Beta 7000 7.0 25000 10000
Gamma 4100 4.1 32000 24000
";

    #[test]
    fn test_initialize_builds_roster_and_market() {
        let model = Model::initialize(SimulationConfig::default(), DATASET).unwrap();
        assert_eq!(model.banks().len(), 3);
        assert_eq!(model.banks()[0].name(), "Alpha");

        // Capitalization is the sum of registered holdings.
        assert_abs_diff_eq!(
            model.market().capitalization(AssetType::GovernmentBonds),
            54000.0,
            epsilon = 1e-6
        );
        // Corporate bonds are the non-government remainder per bank:
        // 10000 + 15000 + 8000.
        assert_abs_diff_eq!(
            model.market().capitalization(AssetType::CorporateBonds),
            33000.0,
            epsilon = 1e-6
        );

        // Errors surface through Debug-formatted assertions, so the model
        // itself must be Debug.
        assert!(format!("{model:?}").starts_with("Model"));
    }

    #[test]
    fn test_initialize_rejects_empty_dataset() {
        let err = Model::initialize(SimulationConfig::default(), "header only\n").unwrap_err();
        assert!(matches!(err, ModelError::EmptyRoster));
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let config = SimulationConfig {
            initial_shock: -0.1,
            ..Default::default()
        };
        let err = Model::initialize(config, DATASET).unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }

    #[test]
    fn test_initial_shock_reprices_market_and_holders() {
        let mut model = Model::initialize(SimulationConfig::default(), DATASET).unwrap();
        model.apply_initial_shock(AssetType::GovernmentBonds, 0.2);

        assert_abs_diff_eq!(
            model.market().price(AssetType::GovernmentBonds),
            0.8,
            epsilon = 1e-12
        );
        let tradable = model.banks()[0]
            .ledger()
            .tradables()
            .find(|t| t.asset_type == AssetType::GovernmentBonds)
            .unwrap();
        assert_abs_diff_eq!(tradable.price, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_run_executes_configured_rounds() {
        let mut model = Model::initialize(SimulationConfig::default(), DATASET).unwrap();
        let report = model.run();
        assert_eq!(report.rounds.len(), 6);
        assert_eq!(report.banks, 3);
        assert_eq!(model.round(), 6);
    }

    #[test]
    fn test_shock_triggers_cascade_in_thin_banks() {
        // A 20% haircut on a gov-heavy 4%-leverage bank wipes its equity.
        let mut model = Model::initialize(SimulationConfig::default(), DATASET).unwrap();
        let report = model.run();
        assert!(report.defaulted_banks >= 1);
        assert!(report.systemic_risk > 0.0);
        assert!(model.defaulted_banks() >= 1);
    }
}

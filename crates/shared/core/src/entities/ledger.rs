//! Per-bank ledger: cash plus asset-side and liability-side contracts.

use super::contract::{Contract, Tradable};
use crate::values::AssetType;

/// Ownership record of everything a bank holds and owes.
///
/// Cash is tracked separately from contracts and counts toward the asset
/// valuation. Equity is the asset valuation net of liabilities.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    cash: f64,
    assets: Vec<Contract>,
    liabilities: Vec<Contract>,
}

impl Ledger {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            assets: Vec::new(),
            liabilities: Vec::new(),
        }
    }

    /// Add a contract to the asset side, returning its stable index.
    pub fn add_asset(&mut self, contract: Contract) -> usize {
        self.assets.push(contract);
        self.assets.len() - 1
    }

    /// Add a contract to the liability side, returning its stable index.
    pub fn add_liability(&mut self, contract: Contract) -> usize {
        self.liabilities.push(contract);
        self.liabilities.len() - 1
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn add_cash(&mut self, amount: f64) {
        self.cash += amount;
    }

    pub fn subtract_cash(&mut self, amount: f64) {
        self.cash -= amount;
    }

    pub fn assets(&self) -> &[Contract] {
        &self.assets
    }

    pub fn liabilities(&self) -> &[Contract] {
        &self.liabilities
    }

    pub fn asset_mut(&mut self, index: usize) -> &mut Contract {
        &mut self.assets[index]
    }

    pub fn liability_mut(&mut self, index: usize) -> &mut Contract {
        &mut self.liabilities[index]
    }

    /// Total asset valuation: cash plus marked-to-market asset contracts.
    pub fn asset_valuation(&self) -> f64 {
        self.cash + self.assets.iter().map(Contract::value).sum::<f64>()
    }

    /// Total liability valuation.
    pub fn liability_valuation(&self) -> f64 {
        self.liabilities.iter().map(Contract::value).sum::<f64>()
    }

    /// Equity: assets net of liabilities.
    pub fn equity_valuation(&self) -> f64 {
        self.asset_valuation() - self.liability_valuation()
    }

    /// Refresh the cached price on every tradable of the given asset class.
    pub fn refresh_price(&mut self, asset_type: AssetType, price: f64) {
        for tradable in self.tradables_mut() {
            if tradable.asset_type == asset_type {
                tradable.refresh_price(price);
            }
        }
    }

    /// Settle a cleared sale against the tradable of the given asset class,
    /// crediting the proceeds to cash. Returns the amount credited.
    pub fn settle_sale(
        &mut self,
        asset_type: AssetType,
        quantity: f64,
        old_price: f64,
        new_price: f64,
    ) -> f64 {
        let mut credited = 0.0;
        for tradable in self.tradables_mut() {
            if tradable.asset_type == asset_type {
                credited = tradable.settle_sale(quantity, old_price, new_price);
                break;
            }
        }
        self.cash += credited;
        credited
    }

    pub fn tradables(&self) -> impl Iterator<Item = &Tradable> {
        self.assets.iter().filter_map(Contract::as_tradable)
    }

    fn tradables_mut(&mut self) -> impl Iterator<Item = &mut Tradable> {
        self.assets.iter_mut().filter_map(Contract::as_tradable_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::contract::{Loan, Other};

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new(5.0);
        ledger.add_asset(Contract::Tradable(Tradable::new(
            AssetType::GovernmentBonds,
            40.0,
            1.0,
        )));
        ledger.add_asset(Contract::Other(Other::new(35.0)));
        ledger.add_liability(Contract::Loan(Loan::new(30.0)));
        ledger.add_liability(Contract::Other(Other::new(30.0)));
        ledger
    }

    #[test]
    fn test_valuations() {
        let ledger = sample_ledger();
        assert!((ledger.asset_valuation() - 80.0).abs() < 1e-12);
        assert!((ledger.liability_valuation() - 60.0).abs() < 1e-12);
        assert!((ledger.equity_valuation() - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_refresh_price_revalues_assets() {
        let mut ledger = sample_ledger();
        ledger.refresh_price(AssetType::GovernmentBonds, 0.8);
        // 5 cash + 40 * 0.8 + 35 other
        assert!((ledger.asset_valuation() - 72.0).abs() < 1e-12);
    }

    #[test]
    fn test_settle_sale_credits_cash() {
        let mut ledger = sample_ledger();
        let credited = ledger.settle_sale(AssetType::GovernmentBonds, 10.0, 1.0, 0.9);
        assert!((credited - 9.5).abs() < 1e-12);
        assert!((ledger.cash() - 14.5).abs() < 1e-12);
    }

    #[test]
    fn test_settle_sale_unknown_asset_is_noop() {
        let mut ledger = sample_ledger();
        let credited = ledger.settle_sale(AssetType::CorporateBonds, 10.0, 1.0, 0.9);
        assert_eq!(credited, 0.0);
        assert!((ledger.cash() - 5.0).abs() < 1e-12);
    }
}

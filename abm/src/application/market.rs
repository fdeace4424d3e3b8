//! Asset Market
//!
//! Tracks the feedback loop between aggregate selling pressure and price.
//! Sale orders queue in an order book and settle once per clearing pass; the
//! clearing result is returned to the driver, which applies settlements to
//! the banks' ledgers and refreshes cached prices on every holder.

use crate::domain::PriceImpacts;
use contagion_core::{AssetType, BankId, DEFAULT_PRICE};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// When sale orders settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearingMode {
    /// Orders queue and settle in one batch per round. The round's outcome is
    /// independent of agent processing order.
    Simultaneous,
    /// Every submission triggers a full clearing. Order-dependent by design;
    /// used to benchmark the batched mode against sequential execution.
    Immediate,
}

/// A queued, not-yet-settled sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleOrder {
    pub bank: BankId,
    pub asset_type: AssetType,
    pub quantity: f64,
}

/// Settlement instruction for one order: the named bank sells `quantity`
/// (clamped to its holding) at the midpoint of the pre- and post-impact price.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub bank: BankId,
    pub asset_type: AssetType,
    pub quantity: f64,
    pub old_price: f64,
    pub new_price: f64,
}

/// Outcome of one clearing pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketClearing {
    /// Asset classes whose price dropped. Holders must refresh their cached
    /// prices before settlement is applied.
    pub repriced: Vec<AssetType>,
    /// Quantity sold per asset class in this pass.
    pub sold: BTreeMap<AssetType, f64>,
    pub trades: Vec<Trade>,
}

/// Shared market state for one simulation run.
#[derive(Debug, Clone)]
pub struct AssetMarket {
    prices: BTreeMap<AssetType, f64>,
    old_prices: BTreeMap<AssetType, f64>,
    sold_this_round: BTreeMap<AssetType, f64>,
    cumulative_sold: BTreeMap<AssetType, f64>,
    /// Total market capitalization per class. Fixed at initialization.
    capitalizations: BTreeMap<AssetType, f64>,
    impacts: PriceImpacts,
    mode: ClearingMode,
    order_book: Vec<SaleOrder>,
}

impl AssetMarket {
    pub fn new(impacts: PriceImpacts, mode: ClearingMode) -> Self {
        Self {
            prices: BTreeMap::new(),
            old_prices: BTreeMap::new(),
            sold_this_round: BTreeMap::new(),
            cumulative_sold: BTreeMap::new(),
            capitalizations: BTreeMap::new(),
            impacts,
            mode,
            order_book: Vec::new(),
        }
    }

    pub fn mode(&self) -> ClearingMode {
        self.mode
    }

    /// Current price of an asset class (1.0 until repriced).
    pub fn price(&self, asset_type: AssetType) -> f64 {
        self.prices.get(&asset_type).copied().unwrap_or(DEFAULT_PRICE)
    }

    pub fn set_price(&mut self, asset_type: AssetType, price: f64) {
        self.prices.insert(asset_type, price);
    }

    /// Register quantity a bank contributes to an asset class at
    /// initialization. The sum becomes the class's fixed capitalization.
    pub fn register_holding(&mut self, asset_type: AssetType, quantity: f64) {
        *self.capitalizations.entry(asset_type).or_insert(0.0) += quantity;
    }

    pub fn capitalization(&self, asset_type: AssetType) -> f64 {
        self.capitalizations.get(&asset_type).copied().unwrap_or(0.0)
    }

    /// Cumulative quantity settled per asset class since the run began.
    pub fn cumulative_sold(&self) -> &BTreeMap<AssetType, f64> {
        &self.cumulative_sold
    }

    pub fn pending_orders(&self) -> &[SaleOrder] {
        &self.order_book
    }

    /// Queue a sale order. Under the immediate clearing mode the market
    /// clears on the spot and the outcome is returned to the caller.
    ///
    /// Panics on a non-positive quantity: that is an upstream logic defect,
    /// not a modeled financial event.
    pub fn put_for_sale(
        &mut self,
        bank: BankId,
        asset_type: AssetType,
        quantity: f64,
    ) -> Option<MarketClearing> {
        assert!(quantity > 0.0, "non-positive sale quantity: {quantity}");
        self.order_book.push(SaleOrder {
            bank,
            asset_type,
            quantity,
        });
        *self.sold_this_round.entry(asset_type).or_insert(0.0) += quantity;

        match self.mode {
            ClearingMode::Immediate => Some(self.clear_the_market()),
            ClearingMode::Simultaneous => None,
        }
    }

    /// Apply price impact for everything sold since the last clearing, then
    /// drain the order book into settlement instructions. Settlement values
    /// use the midpoint of the pre- and post-impact prices.
    pub fn clear_the_market(&mut self) -> MarketClearing {
        self.old_prices = self.prices.clone();

        let mut clearing = MarketClearing::default();
        let sold = std::mem::take(&mut self.sold_this_round);
        for (&asset_type, &quantity) in &sold {
            let old_price = self.price(asset_type);
            self.apply_price_impact(asset_type, quantity);
            if self.price(asset_type) < old_price {
                clearing.repriced.push(asset_type);
            }
            *self.cumulative_sold.entry(asset_type).or_insert(0.0) += quantity;
        }
        clearing.sold = sold;

        for order in std::mem::take(&mut self.order_book) {
            let old_price = self
                .old_prices
                .get(&order.asset_type)
                .copied()
                .unwrap_or(DEFAULT_PRICE);
            clearing.trades.push(Trade {
                bank: order.bank,
                asset_type: order.asset_type,
                quantity: order.quantity,
                old_price,
                new_price: self.price(order.asset_type),
            });
        }
        clearing
    }

    /// Reprice one asset class for the quantity sold this pass. A class with
    /// non-positive capitalization is degenerate and is left unchanged.
    fn apply_price_impact(&mut self, asset_type: AssetType, quantity_sold: f64) {
        let total = self.capitalization(asset_type);
        if total <= 0.0 {
            return;
        }
        let fraction_sold = quantity_sold / total;
        let current = self.price(asset_type);
        let new_price = current * self.impacts.decay(asset_type, fraction_sold);
        debug!(
            "price impact: {} sold {:.2} ({:.2}% of cap), {:.6} -> {:.6}",
            asset_type,
            quantity_sold,
            100.0 * fraction_sold,
            current,
            new_price
        );
        self.set_price(asset_type, new_price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn market() -> AssetMarket {
        let mut market = AssetMarket::new(PriceImpacts::uniform(0.05), ClearingMode::Simultaneous);
        market.register_holding(AssetType::CorporateBonds, 1000.0);
        market.register_holding(AssetType::GovernmentBonds, 1000.0);
        market
    }

    #[test]
    fn test_prices_default_to_one() {
        let market = market();
        assert_eq!(market.price(AssetType::CorporateBonds), 1.0);
        assert_eq!(market.price(AssetType::GovernmentBonds), 1.0);
    }

    #[test]
    fn test_selling_reference_fraction_drops_price_by_coefficient() {
        let mut market = market();
        // 5% of a 1000 capitalization at coefficient 0.05.
        market.put_for_sale(BankId(0), AssetType::CorporateBonds, 50.0);
        let clearing = market.clear_the_market();

        assert_abs_diff_eq!(market.price(AssetType::CorporateBonds), 0.95, epsilon = 1e-6);
        assert_eq!(clearing.repriced, vec![AssetType::CorporateBonds]);
        assert_eq!(clearing.trades.len(), 1);
        let trade = &clearing.trades[0];
        assert_eq!(trade.old_price, 1.0);
        assert_abs_diff_eq!(trade.new_price, 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_clearing_resets_book_and_round_counters() {
        let mut market = market();
        market.put_for_sale(BankId(0), AssetType::GovernmentBonds, 10.0);
        assert_eq!(market.pending_orders().len(), 1);

        let clearing = market.clear_the_market();
        assert_eq!(clearing.sold[&AssetType::GovernmentBonds], 10.0);
        assert!(market.pending_orders().is_empty());

        // A second clearing with nothing sold neither reprices nor trades.
        let clearing = market.clear_the_market();
        assert_eq!(clearing, MarketClearing::default());
    }

    #[test]
    fn test_cumulative_sold_accumulates_across_rounds() {
        let mut market = market();
        market.put_for_sale(BankId(0), AssetType::GovernmentBonds, 10.0);
        market.clear_the_market();
        market.put_for_sale(BankId(1), AssetType::GovernmentBonds, 5.0);
        market.clear_the_market();
        assert_abs_diff_eq!(
            market.cumulative_sold()[&AssetType::GovernmentBonds],
            15.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_impact_compounds_multiplicatively() {
        let mut market = market();
        market.put_for_sale(BankId(0), AssetType::CorporateBonds, 50.0);
        market.clear_the_market();
        market.put_for_sale(BankId(0), AssetType::CorporateBonds, 50.0);
        market.clear_the_market();
        assert_abs_diff_eq!(
            market.price(AssetType::CorporateBonds),
            0.95 * 0.95,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_zero_capitalization_leaves_price_unchanged() {
        let mut market = AssetMarket::new(PriceImpacts::uniform(0.05), ClearingMode::Simultaneous);
        market.put_for_sale(BankId(0), AssetType::CorporateBonds, 50.0);
        market.clear_the_market();
        assert_eq!(market.price(AssetType::CorporateBonds), 1.0);
    }

    #[test]
    fn test_immediate_mode_clears_on_submission() {
        let mut market = AssetMarket::new(PriceImpacts::uniform(0.05), ClearingMode::Immediate);
        market.register_holding(AssetType::GovernmentBonds, 1000.0);

        let clearing = market
            .put_for_sale(BankId(2), AssetType::GovernmentBonds, 50.0)
            .expect("immediate mode returns a clearing");
        assert_eq!(clearing.trades.len(), 1);
        assert_eq!(clearing.trades[0].bank, BankId(2));
        assert!(market.pending_orders().is_empty());
        assert_abs_diff_eq!(market.price(AssetType::GovernmentBonds), 0.95, epsilon = 1e-6);
    }

    #[test]
    #[should_panic(expected = "non-positive sale quantity")]
    fn test_non_positive_quantity_fails_fast() {
        let mut market = market();
        market.put_for_sale(BankId(0), AssetType::CorporateBonds, 0.0);
    }
}

//! Financial contracts held on bank ledgers.
//!
//! The model restricts the general contract framework to three kinds: a
//! tradable asset position, a loan owed to an external counterparty, and an
//! inert catch-all position that contributes to valuation only.

use crate::values::{AssetType, NEGLIGIBLE_AMOUNT};

/// A position in one tradable asset class.
#[derive(Debug, Clone, PartialEq)]
pub struct Tradable {
    pub asset_type: AssetType,
    /// Quantity currently held.
    pub quantity: f64,
    /// Market price cached at the last refresh. Refreshed explicitly by the
    /// driver whenever the market reprices this asset class.
    pub price: f64,
    /// Portion of `quantity` already queued for sale but not yet settled.
    /// Invariant: never exceeds `quantity`.
    pub quantity_put_for_sale: f64,
}

impl Tradable {
    pub fn new(asset_type: AssetType, quantity: f64, price: f64) -> Self {
        Self {
            asset_type,
            quantity,
            price,
            quantity_put_for_sale: 0.0,
        }
    }

    /// Mark-to-market value of the full position.
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }

    /// Value of the portion not yet queued for sale, at the cached price.
    pub fn sellable_value(&self) -> f64 {
        (self.quantity - self.quantity_put_for_sale) * self.price
    }

    /// Further sales are possible only while some quantity is unqueued.
    pub fn is_eligible(&self) -> bool {
        self.quantity > self.quantity_put_for_sale
    }

    /// Queue an additional quantity for sale.
    pub fn mark_for_sale(&mut self, quantity: f64) {
        self.quantity_put_for_sale += quantity;
    }

    pub fn refresh_price(&mut self, price: f64) {
        self.price = price;
    }

    /// Settle a cleared sale at the midpoint of the pre- and post-impact
    /// prices. The settled quantity is clamped to the remaining holding.
    /// Returns the cash value to credit, or 0.0 when it falls under the
    /// negligible-amount floor.
    pub fn settle_sale(&mut self, quantity_sold: f64, old_price: f64, new_price: f64) -> f64 {
        let quantity_sold = quantity_sold.min(self.quantity);
        self.quantity -= quantity_sold;
        self.quantity_put_for_sale -= quantity_sold;
        let value_sold = quantity_sold * (new_price + old_price) / 2.0;
        if value_sold >= NEGLIGIBLE_AMOUNT {
            value_sold
        } else {
            0.0
        }
    }
}

/// A loan owed by one party to the other.
///
/// In this model every loan has an external counterparty, so a bank only ever
/// sees a loan from one side of its ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    pub principal: f64,
}

impl Loan {
    pub fn new(principal: f64) -> Self {
        Self { principal }
    }

    pub fn value(&self) -> f64 {
        self.principal
    }

    /// A loan can be paid down while anything is outstanding.
    pub fn is_eligible(&self) -> bool {
        self.principal > 0.0
    }

    pub fn reduce_principal(&mut self, amount: f64) {
        self.principal -= amount;
    }
}

/// An inert fixed-value position (other assets, other liabilities).
#[derive(Debug, Clone, PartialEq)]
pub struct Other {
    pub amount: f64,
}

impl Other {
    pub fn new(amount: f64) -> Self {
        Self { amount }
    }

    pub fn value(&self) -> f64 {
        self.amount
    }
}

/// A financial contract on one side of a bank's ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Contract {
    Tradable(Tradable),
    Loan(Loan),
    Other(Other),
}

impl Contract {
    /// Mark-to-market value of the contract.
    pub fn value(&self) -> f64 {
        match self {
            Contract::Tradable(t) => t.value(),
            Contract::Loan(l) => l.value(),
            Contract::Other(o) => o.value(),
        }
    }

    /// Whether the contract currently offers its holder an action.
    /// `Other` positions are valuation-only and never eligible.
    pub fn is_eligible(&self) -> bool {
        match self {
            Contract::Tradable(t) => t.is_eligible(),
            Contract::Loan(l) => l.is_eligible(),
            Contract::Other(_) => false,
        }
    }

    pub fn as_tradable(&self) -> Option<&Tradable> {
        match self {
            Contract::Tradable(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tradable_mut(&mut self) -> Option<&mut Tradable> {
        match self {
            Contract::Tradable(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_loan_mut(&mut self) -> Option<&mut Loan> {
        match self {
            Contract::Loan(l) => Some(l),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tradable_eligibility_tracks_queued_quantity() {
        let mut t = Tradable::new(AssetType::GovernmentBonds, 10.0, 1.0);
        assert!(t.is_eligible());
        assert_eq!(t.sellable_value(), 10.0);

        t.mark_for_sale(4.0);
        assert!(t.is_eligible());
        assert_eq!(t.sellable_value(), 6.0);

        t.mark_for_sale(6.0);
        assert!(!t.is_eligible());
        assert!(t.quantity_put_for_sale <= t.quantity);
    }

    #[test]
    fn test_settle_sale_uses_midpoint_price() {
        let mut t = Tradable::new(AssetType::CorporateBonds, 10.0, 0.9);
        t.mark_for_sale(4.0);

        let credited = t.settle_sale(4.0, 1.0, 0.9);
        assert!((credited - 4.0 * (1.0 + 0.9) / 2.0).abs() < 1e-12);
        assert!((t.quantity - 6.0).abs() < 1e-12);
        assert!(t.quantity_put_for_sale.abs() < 1e-12);
    }

    #[test]
    fn test_settle_sale_clamps_to_holding() {
        let mut t = Tradable::new(AssetType::CorporateBonds, 3.0, 1.0);
        t.mark_for_sale(3.0);

        // Inconsistent upstream state: order for more than we hold.
        let credited = t.settle_sale(5.0, 1.0, 1.0);
        assert!((credited - 3.0).abs() < 1e-12);
        assert_eq!(t.quantity, 0.0);
        assert!(t.quantity_put_for_sale <= t.quantity);
    }

    #[test]
    fn test_settle_sale_skips_dust() {
        let mut t = Tradable::new(AssetType::CorporateBonds, 10.0, 1.0);
        t.mark_for_sale(1e-12);
        let credited = t.settle_sale(1e-12, 1.0, 1.0);
        assert_eq!(credited, 0.0);
    }

    #[test]
    fn test_loan_eligibility() {
        let mut loan = Loan::new(100.0);
        assert!(loan.is_eligible());
        loan.reduce_principal(100.0);
        assert!(!loan.is_eligible());
    }

    #[test]
    fn test_other_is_never_eligible() {
        let other = Contract::Other(Other::new(42.0));
        assert!(!other.is_eligible());
        assert_eq!(other.value(), 42.0);
    }
}

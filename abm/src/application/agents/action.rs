//! Bank balance-sheet actions.
//!
//! An action targets one contract on the bank's ledger and carries a
//! monetary amount to execute. Amounts are always clamped to the action's
//! current maximum, so callers can allocate optimistically.

use crate::application::market::{AssetMarket, MarketClearing};
use contagion_core::{BankId, Ledger, NEGLIGIBLE_AMOUNT};

/// Discriminant used to group actions when allocating proportionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionKind {
    SellAsset,
    PayLoan,
}

/// One executable balance-sheet move.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Sell up to `amount` (in monetary value) of the tradable asset at
    /// `asset_index` on the ledger.
    SellAsset { asset_index: usize, amount: f64 },
    /// Repay up to `amount` of the loan liability at `liability_index`.
    PayLoan { liability_index: usize, amount: f64 },
}

impl Action {
    pub fn sell_asset(asset_index: usize) -> Self {
        Self::SellAsset {
            asset_index,
            amount: 0.0,
        }
    }

    pub fn pay_loan(liability_index: usize) -> Self {
        Self::PayLoan {
            liability_index,
            amount: 0.0,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::SellAsset { .. } => ActionKind::SellAsset,
            Self::PayLoan { .. } => ActionKind::PayLoan,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Self::SellAsset { amount, .. } | Self::PayLoan { amount, .. } => *amount,
        }
    }

    pub fn set_amount(&mut self, value: f64) {
        match self {
            Self::SellAsset { amount, .. } | Self::PayLoan { amount, .. } => *amount = value,
        }
    }

    /// Largest monetary amount this action can currently execute.
    pub fn max(&self, ledger: &Ledger) -> f64 {
        match self {
            Self::SellAsset { asset_index, .. } => ledger.assets()[*asset_index]
                .as_tradable()
                .map(|t| t.sellable_value())
                .unwrap_or(0.0),
            Self::PayLoan {
                liability_index, ..
            } => ledger.liabilities()[*liability_index].value(),
        }
    }

    /// Execute against the ledger and, for sales, the market. The amount is
    /// clamped to [`Self::max`] before anything happens; sub-dust residues
    /// are dropped rather than traded.
    ///
    /// Under immediate clearing a sale returns the resulting
    /// [`MarketClearing`] for the caller to apply.
    pub fn perform(
        &self,
        bank: BankId,
        ledger: &mut Ledger,
        market: &mut AssetMarket,
    ) -> Option<MarketClearing> {
        let amount = self.amount().min(self.max(ledger));
        match self {
            Self::SellAsset { asset_index, .. } => {
                let Some(tradable) = ledger.asset_mut(*asset_index).as_tradable_mut() else {
                    return None;
                };
                if tradable.price <= NEGLIGIBLE_AMOUNT {
                    return None;
                }
                let quantity = amount / tradable.price;
                if quantity.abs() <= NEGLIGIBLE_AMOUNT {
                    return None;
                }
                tradable.mark_for_sale(quantity);
                let asset_type = tradable.asset_type;
                market.put_for_sale(bank, asset_type, quantity)
            }
            Self::PayLoan {
                liability_index, ..
            } => {
                if amount <= NEGLIGIBLE_AMOUNT {
                    return None;
                }
                if let Some(loan) = ledger.liability_mut(*liability_index).as_loan_mut() {
                    loan.reduce_principal(amount);
                    ledger.subtract_cash(amount);
                }
                None
            }
        }
    }
}

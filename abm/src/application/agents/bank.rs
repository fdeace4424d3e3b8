//! Bank agent.
//!
//! A bank holds a ledger, a leverage constraint, and the set of actions its
//! ledger currently permits. Each round the driver calls `step` (settle the
//! past, liquidate if a default was triggered last round) and then `act`
//! (evaluate the constraint and respond).

use std::collections::BTreeMap;

use crate::application::agents::{Action, ActionKind};
use crate::application::market::{AssetMarket, MarketClearing, Trade};
use contagion_core::{AssetType, BankId, Contract, Ledger, NEGLIGIBLE_AMOUNT};
use contagion_risk::{DefaultReason, LeverageConstraint};
use log::{debug, info, warn};

/// Lifecycle of a bank agent.
///
/// A breached constraint only flags the default; liquidation happens at the
/// start of the next round. The one-round delay keeps a round's outcome
/// independent of the order in which agents are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankStatus {
    Active,
    /// Default triggered this round; fire-sale starts next round.
    DefaultPending,
    Defaulted,
}

/// What a bank decided to do with its balance sheet this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    Continue,
    TriggerDefault(DefaultReason),
}

#[derive(Debug, Clone)]
pub struct Bank {
    id: BankId,
    name: String,
    ledger: Ledger,
    status: BankStatus,
    constraint: LeverageConstraint,
    available_actions: BTreeMap<ActionKind, Vec<Action>>,
}

impl Bank {
    pub fn new(id: BankId, name: impl Into<String>, ledger: Ledger, constraint: LeverageConstraint) -> Self {
        Self {
            id,
            name: name.into(),
            ledger,
            status: BankStatus::Active,
            constraint,
            available_actions: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> BankId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn status(&self) -> BankStatus {
        self.status
    }

    /// True only while the bank is still an active market participant; the
    /// flag clears as soon as a default is triggered, one round before
    /// liquidation.
    pub fn is_alive(&self) -> bool {
        self.status == BankStatus::Active
    }

    /// Refresh the cached price of one asset class across the ledger.
    pub fn refresh_price(&mut self, asset_type: AssetType, price: f64) {
        self.ledger.refresh_price(asset_type, price);
    }

    /// Apply one settlement instruction addressed to this bank.
    pub fn settle(&mut self, trade: &Trade) {
        debug_assert_eq!(trade.bank, self.id);
        let credited = self.ledger.settle_sale(
            trade.asset_type,
            trade.quantity,
            trade.old_price,
            trade.new_price,
        );
        debug!("{} settled {:.4} {} for {:.4}", self.id, trade.quantity, trade.asset_type, credited);
    }

    /// Start-of-round phase. A bank whose default was triggered last round
    /// liquidates now: every remaining tradable position is put up for sale.
    pub fn step(&mut self, market: &mut AssetMarket) {
        if self.status != BankStatus::DefaultPending {
            return;
        }
        self.status = BankStatus::Defaulted;
        info!("{} ({}) enters liquidation", self.id, self.name);
        self.collect_eligible_actions();
        self.sell_assets_proportionally(None, market);
    }

    /// Decision phase. Returns true when this call triggered a default.
    pub fn act(&mut self, market: &mut AssetMarket) -> bool {
        if self.status != BankStatus::Active {
            return false;
        }
        self.collect_eligible_actions();
        match self.decide(market) {
            DecisionOutcome::Continue => false,
            DecisionOutcome::TriggerDefault(reason) => {
                warn!(
                    "{} ({}) defaults on {} (leverage {:.4})",
                    self.id,
                    self.name,
                    reason,
                    self.constraint.leverage(&self.ledger)
                );
                self.status = BankStatus::DefaultPending;
                true
            }
        }
    }

    /// Evaluate the leverage constraint and respond: default when insolvent,
    /// otherwise pay down debt from cash first and fire-sell only for the
    /// shortfall.
    fn decide(&mut self, market: &mut AssetMarket) -> DecisionOutcome {
        if self.constraint.is_insolvent(&self.ledger) {
            return DecisionOutcome::TriggerDefault(DefaultReason::Solvency);
        }
        let to_delever = self.constraint.amount_to_delever(&self.ledger);
        if to_delever <= 0.0 {
            return DecisionOutcome::Continue;
        }

        let from_cash = self.ledger.cash().max(0.0).min(to_delever);
        let paid = self.pay_off_liabilities(from_cash, market);
        let remaining = to_delever - paid;
        if remaining > NEGLIGIBLE_AMOUNT && self.ledger.cash() < remaining {
            let shortfall = remaining - self.ledger.cash().max(0.0);
            self.sell_assets_proportionally(Some(shortfall), market);
        }
        DecisionOutcome::Continue
    }

    /// Pay down loans pro rata, up to `amount`. Returns the amount paid.
    fn pay_off_liabilities(&mut self, amount: f64, market: &mut AssetMarket) -> f64 {
        self.perform_proportionally(ActionKind::PayLoan, Some(amount), market)
    }

    /// Queue tradable sales pro rata. `None` sells everything sellable.
    fn sell_assets_proportionally(&mut self, amount: Option<f64>, market: &mut AssetMarket) -> f64 {
        self.perform_proportionally(ActionKind::SellAsset, amount, market)
    }

    /// Allocate `amount` (or the full capacity, for `None`) across all
    /// actions of one kind in proportion to each action's maximum, then
    /// execute them. Returns the total amount allocated.
    fn perform_proportionally(
        &mut self,
        kind: ActionKind,
        amount: Option<f64>,
        market: &mut AssetMarket,
    ) -> f64 {
        let Some(mut actions) = self.available_actions.remove(&kind) else {
            return 0.0;
        };
        let maximum: f64 = actions.iter().map(|a| a.max(&self.ledger)).sum();
        let target = amount.unwrap_or(maximum).min(maximum);
        if maximum <= 0.0 || target <= 0.0 {
            self.available_actions.insert(kind, actions);
            return 0.0;
        }

        for action in &mut actions {
            let share = action.max(&self.ledger) * target / maximum;
            if share <= 0.0 {
                continue;
            }
            action.set_amount(share);
            if let Some(clearing) = action.perform(self.id, &mut self.ledger, market) {
                self.apply_own_clearing(&clearing, market);
            }
        }
        self.available_actions.insert(kind, actions);
        target
    }

    /// Apply a clearing produced by this bank's own immediate-mode sale:
    /// refresh repriced asset classes and settle the trades, which are all
    /// ours since the book drains on every submission.
    fn apply_own_clearing(&mut self, clearing: &MarketClearing, market: &AssetMarket) {
        for &asset_type in &clearing.repriced {
            self.ledger.refresh_price(asset_type, market.price(asset_type));
        }
        for trade in &clearing.trades {
            debug_assert_eq!(trade.bank, self.id);
            self.ledger.settle_sale(
                trade.asset_type,
                trade.quantity,
                trade.old_price,
                trade.new_price,
            );
        }
    }

    /// Rebuild the action set from contracts currently eligible on the
    /// ledger.
    fn collect_eligible_actions(&mut self) {
        self.available_actions.clear();
        for (index, contract) in self.ledger.assets().iter().enumerate() {
            if contract.is_eligible() && contract.as_tradable().is_some() {
                self.available_actions
                    .entry(ActionKind::SellAsset)
                    .or_default()
                    .push(Action::sell_asset(index));
            }
        }
        for (index, contract) in self.ledger.liabilities().iter().enumerate() {
            if contract.is_eligible() && matches!(contract, Contract::Loan(_)) {
                self.available_actions
                    .entry(ActionKind::PayLoan)
                    .or_default()
                    .push(Action::pay_loan(index));
            }
        }
    }
}

//! Bank agents and their balance-sheet actions.

mod action;
mod bank;

pub use action::{Action, ActionKind};
pub use bank::{Bank, BankStatus, DecisionOutcome};

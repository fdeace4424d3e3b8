mod contract;
mod ledger;

pub use contract::{Contract, Loan, Other, Tradable};
pub use ledger::Ledger;

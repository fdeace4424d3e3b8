//! Contagion Core Domain
//!
//! Pure domain types for the contagion model: asset classes, financial
//! contracts, and the per-bank ledger. This crate contains no I/O and no
//! randomness, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Contract, Ledger, Loan, Other, Tradable};
pub use values::{AssetType, BankId, DEFAULT_PRICE, NEGLIGIBLE_AMOUNT};

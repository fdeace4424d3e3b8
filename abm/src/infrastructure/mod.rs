//! Infrastructure: loading bank balance-sheet data from disk.

mod balance_sheets;

pub use balance_sheets::{
    BalanceSheetRow, DataError, OpeningBalances, load_balance_sheets, parse_balance_sheets,
};

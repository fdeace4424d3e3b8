//! Balance-sheet dataset parsing.
//!
//! The dataset is a whitespace-separated table of bank stress-test
//! disclosures, one bank per line after a header: name, core equity tier 1,
//! leverage ratio in percent, total debt securities, and the government-bond
//! portion of those securities. Monetary columns share one unit (millions).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read balance-sheet data: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected 5 columns, found {found}")]
    MissingColumns { line: usize, found: usize },
    #[error("line {line}: column {column} is not a number: {value:?}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: leverage ratio must be positive, got {value}")]
    NonPositiveLeverage { line: usize, value: f64 },
}

/// One bank's reported figures, as they appear in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetRow {
    pub name: String,
    /// Core equity tier 1 capital.
    pub core_equity: f64,
    /// Reported leverage ratio, in percent.
    pub leverage_pct: f64,
    /// Total debt-security holdings.
    pub debt_securities: f64,
    /// Government bonds, a subset of `debt_securities`.
    pub government_bonds: f64,
}

/// Opening ledger positions derived from one reported row.
///
/// Total assets are implied by equity and the leverage ratio. Cash is set at
/// 5% of assets, corporate bonds are the non-government remainder of debt
/// securities, and everything else is an inert other-asset position.
/// Liabilities (assets net of equity) split evenly between a payable loan and
/// an inert other-liability position.
#[derive(Debug, Clone, PartialEq)]
pub struct OpeningBalances {
    pub cash: f64,
    pub corporate_bonds: f64,
    pub government_bonds: f64,
    pub other_asset: f64,
    pub loan: f64,
    pub other_liability: f64,
}

impl OpeningBalances {
    pub fn derive(row: &BalanceSheetRow) -> Self {
        let assets = row.core_equity / (row.leverage_pct / 100.0);
        let cash = 0.05 * assets;
        let corporate_bonds = row.debt_securities - row.government_bonds;
        let other_asset = assets - row.debt_securities - cash;
        let liabilities = assets - row.core_equity;
        Self {
            cash,
            corporate_bonds,
            government_bonds: row.government_bonds,
            other_asset,
            loan: liabilities / 2.0,
            other_liability: liabilities / 2.0,
        }
    }
}

fn parse_column(
    line: usize,
    column: &'static str,
    value: &str,
) -> Result<f64, DataError> {
    value.parse().map_err(|_| DataError::InvalidNumber {
        line,
        column,
        value: value.to_string(),
    })
}

/// Parse the dataset from its text form. The first line is a header and is
/// skipped; blank lines are ignored.
pub fn parse_balance_sheets(data: &str) -> Result<Vec<BalanceSheetRow>, DataError> {
    let mut rows = Vec::new();
    for (index, text) in data.lines().enumerate().skip(1) {
        let line = index + 1;
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let columns: Vec<&str> = text.split_whitespace().collect();
        // Bank names may themselves contain whitespace; the four numeric
        // columns are always the last four.
        if columns.len() < 5 {
            return Err(DataError::MissingColumns {
                line,
                found: columns.len(),
            });
        }
        let numeric = &columns[columns.len() - 4..];
        let name = columns[..columns.len() - 4].join(" ");
        let leverage_pct = parse_column(line, "leverage_pct", numeric[1])?;
        if leverage_pct <= 0.0 {
            return Err(DataError::NonPositiveLeverage {
                line,
                value: leverage_pct,
            });
        }
        rows.push(BalanceSheetRow {
            name,
            core_equity: parse_column(line, "core_equity", numeric[0])?,
            leverage_pct,
            debt_securities: parse_column(line, "debt_securities", numeric[2])?,
            government_bonds: parse_column(line, "government_bonds", numeric[3])?,
        });
    }
    Ok(rows)
}

/// Read and parse a dataset file.
pub fn load_balance_sheets(path: impl AsRef<Path>) -> Result<Vec<BalanceSheetRow>, DataError> {
    let data = std::fs::read_to_string(path)?;
    parse_balance_sheets(&data)
}

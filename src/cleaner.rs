use tracing::debug;

use crate::amount::parse_amount;
use crate::dates::resolve_date;
use crate::error::{CleanerError, Result};
use crate::mapping::CategoryMapping;
use crate::models::{CleanedTransaction, RawTable, TransactionMode};

const DATE: &str = "Date";
const DETAILS: &str = "Details";

/// Why rows were left out of the cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub input_rows: usize,
    /// Neither a date nor an amount.
    pub dropped_blank: usize,
    /// Repeated header rows from concatenated sheets.
    pub dropped_header_noise: usize,
    /// An amount but no date here or in any earlier row.
    pub dropped_undated: usize,
    /// Date-only rows such as balance lines.
    pub dropped_no_amount: usize,
    /// Amount text that did not repair into a number.
    pub dropped_bad_amount: usize,
    pub categorised: usize,
}

#[derive(Debug, Clone)]
pub struct CleanReport {
    pub mode: TransactionMode,
    /// Whether a category mapping was applied, i.e. the output carries an
    /// `Analysis` column.
    pub has_analysis: bool,
    pub transactions: Vec<CleanedTransaction>,
    pub stats: CleanStats,
}

fn require(table: &RawTable, column: &str, mode: TransactionMode) -> Result<usize> {
    table
        .column_index(column)
        .ok_or_else(|| CleanerError::MissingColumn {
            column: column.to_string(),
            context: format!("{mode} data"),
        })
}

/// Clean the concatenated statements into the Receipts or Payments table.
///
/// Rows are visited top to bottom because a blank date takes the date of
/// the row above it; the remaining steps only look at the current row.
pub fn clean(
    table: &RawTable,
    mode: TransactionMode,
    mapping: Option<&CategoryMapping>,
) -> Result<CleanReport> {
    let date_idx = require(table, DATE, mode)?;
    let amount_idx = require(table, mode.amount_column(), mode)?;
    let details_idx = table
        .column_index(DETAILS)
        .ok_or(CleanerError::MissingDetailsColumn { mode })?;

    let pruned: Vec<&str> = [mode.other_amount_column(), "Balance"]
        .into_iter()
        .filter(|c| table.has_column(c))
        .collect();
    debug!(?pruned, "columns left out of the cleaned table");

    let mut stats = CleanStats {
        input_rows: table.rows.len(),
        ..Default::default()
    };
    let mut transactions = Vec::new();
    let mut last_date = None;

    for i in 0..table.rows.len() {
        let date_cell = table.cell(i, Some(date_idx));
        let amount_cell = table.cell(i, Some(amount_idx));

        if date_cell.is_empty() && amount_cell.is_empty() {
            stats.dropped_blank += 1;
            continue;
        }
        if date_cell.as_string().to_lowercase() == "date" {
            stats.dropped_header_noise += 1;
            continue;
        }

        // Balance-only rows still carry their date forward.
        let date = resolve_date(date_cell).or(last_date);
        last_date = date;

        if amount_cell.is_empty() {
            stats.dropped_no_amount += 1;
            continue;
        }
        let Some(date) = date else {
            stats.dropped_undated += 1;
            continue;
        };
        let Some(amount) = parse_amount(&amount_cell.as_string()) else {
            stats.dropped_bad_amount += 1;
            continue;
        };

        let details = table.cell(i, Some(details_idx)).as_string();
        let category = mapping
            .and_then(|m| m.category_for(&details))
            .map(str::to_string);
        if category.is_some() {
            stats.categorised += 1;
        }
        transactions.push(CleanedTransaction {
            date,
            amount,
            details,
            category,
        });
    }

    debug!(?stats, %mode, kept = transactions.len(), "cleaned statements");
    Ok(CleanReport {
        mode,
        has_analysis: mapping.is_some(),
        transactions,
        stats,
    })
}

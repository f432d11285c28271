use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which side of the statement is being cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    #[default]
    Receipts,
    Payments,
}

impl TransactionMode {
    pub const ALL: [TransactionMode; 2] = [TransactionMode::Receipts, TransactionMode::Payments];

    /// Column holding the amount of interest for this mode.
    pub fn amount_column(&self) -> &'static str {
        match self {
            Self::Receipts => "Credit",
            Self::Payments => "Debit",
        }
    }

    /// The opposite amount column, pruned from the output.
    pub fn other_amount_column(&self) -> &'static str {
        match self {
            Self::Receipts => "Debit",
            Self::Payments => "Credit",
        }
    }

    /// Sheet of the previous year's workbook holding this mode's analysis.
    /// The two names really do differ in spacing.
    pub fn analysis_sheet(&self) -> &'static str {
        match self {
            Self::Receipts => "ReceiptsAnalysis",
            Self::Payments => "Payments Analysis",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Receipts => "Receipts",
            Self::Payments => "Payments",
        }
    }
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransactionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipts" | "receipt" | "credit" => Ok(Self::Receipts),
            "payments" | "payment" | "debit" => Ok(Self::Payments),
            other => Err(format!(
                "Invalid transaction type: {other} (must be 'receipts' or 'payments')"
            )),
        }
    }
}

/// A single spreadsheet cell as read from a CSV or workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawValue {
    pub fn text(s: &str) -> Self {
        if s.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// String form of the cell; empty cells become an empty string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Rows of cells under named columns. Columns present in one uploaded file
/// but not another are padded with `Empty` when tables are concatenated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Push a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.columns.len(), RawValue::Empty);
        self.rows.push(row);
    }

    pub fn cell(&self, row: usize, col: Option<usize>) -> &RawValue {
        const EMPTY: &RawValue = &RawValue::Empty;
        col.and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .unwrap_or(EMPTY)
    }

    /// Union of columns in first-seen order, rows stacked in input order.
    pub fn concat(tables: Vec<RawTable>) -> RawTable {
        let mut out = RawTable::default();
        for table in &tables {
            for col in &table.columns {
                if !out.has_column(col) {
                    out.columns.push(col.clone());
                }
            }
        }
        for table in tables {
            let positions: Vec<usize> = table
                .columns
                .iter()
                .filter_map(|c| out.column_index(c))
                .collect();
            for row in table.rows {
                let mut merged = vec![RawValue::Empty; out.columns.len()];
                for (value, &pos) in row.into_iter().zip(&positions) {
                    merged[pos] = value;
                }
                out.rows.push(merged);
            }
        }
        out
    }
}

/// One row of the cleaned output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedTransaction {
    #[serde(serialize_with = "serialize_day_first")]
    pub date: NaiveDate,
    pub amount: f64,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CleanedTransaction {
    pub fn date_string(&self) -> String {
        self.date.format(crate::dates::OUTPUT_FORMAT).to_string()
    }
}

fn serialize_day_first<S: serde::Serializer>(
    date: &NaiveDate,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(crate::dates::OUTPUT_FORMAT).to_string())
}

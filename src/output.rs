use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cleaner::CleanReport;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "Invalid output format: {other} (must be 'table', 'csv' or 'json')"
            )),
        }
    }
}

/// Output columns: `Date, Credit|Debit, Details` plus `Analysis` when a
/// mapping was applied.
pub fn headers(report: &CleanReport) -> Vec<&'static str> {
    let mut cols = vec!["Date", report.mode.amount_column(), "Details"];
    if report.has_analysis {
        cols.push("Analysis");
    }
    cols
}

pub fn write_csv<W: Write>(report: &CleanReport, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers(report))?;
    for txn in &report.transactions {
        let mut record = vec![
            txn.date_string(),
            format!("{:.2}", txn.amount),
            txn.details.clone(),
        ];
        if report.has_analysis {
            record.push(txn.category.clone().unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_json(report: &CleanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&report.transactions)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::CleanStats;
    use crate::models::{CleanedTransaction, TransactionMode};
    use chrono::NaiveDate;

    fn report(has_analysis: bool) -> CleanReport {
        CleanReport {
            mode: TransactionMode::Payments,
            has_analysis,
            transactions: vec![
                CleanedTransaction {
                    date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
                    amount: 1234.5,
                    details: "RENT, APRIL".to_string(),
                    category: Some("Premises".to_string()),
                },
                CleanedTransaction {
                    date: NaiveDate::from_ymd_opt(2024, 4, 4).unwrap(),
                    amount: 9.99,
                    details: "CAFE".to_string(),
                    category: None,
                },
            ],
            stats: CleanStats::default(),
        }
    }

    #[test]
    fn test_headers_follow_mode_and_mapping() {
        assert_eq!(headers(&report(false)), vec!["Date", "Debit", "Details"]);
        assert_eq!(headers(&report(true)), vec!["Date", "Debit", "Details", "Analysis"]);
    }

    #[test]
    fn test_write_csv() {
        let mut buf = Vec::new();
        write_csv(&report(true), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Date,Debit,Details,Analysis\n03/04/2024,1234.50,\"RENT, APRIL\",Premises\n04/04/2024,9.99,CAFE,\n"
        );
    }

    #[test]
    fn test_write_csv_without_analysis() {
        let mut buf = Vec::new();
        write_csv(&report(false), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Date,Debit,Details\n"));
        assert!(!text.contains("Premises"));
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&report(true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["date"], "03/04/2024");
        assert_eq!(value[0]["amount"], 1234.5);
        assert_eq!(value[0]["category"], "Premises");
        assert!(value[1].get("category").is_none());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}

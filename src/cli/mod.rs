pub mod clean;
pub mod config;
pub mod mapping;
pub mod shell;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::models::TransactionMode;
use crate::output::OutputFormat;

/// A directory stands for every statement file directly inside it.
pub(crate) fn expand_paths(inputs: &[String]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        let path = PathBuf::from(input.trim());
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(&path)
                .map(|rd| rd.filter_map(|e| e.ok().map(|e| e.path())).collect())
                .unwrap_or_default();
            entries.retain(|p| p.is_file() && is_statement_file(p));
            entries.sort();
            paths.extend(entries);
        } else {
            paths.push(path);
        }
    }
    paths
}

fn is_statement_file(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let e = e.to_string_lossy().to_lowercase();
            matches!(e.as_str(), "csv" | "xlsx" | "xlsm" | "xls" | "ods")
        })
        .unwrap_or(false)
}

#[derive(Parser)]
#[command(
    name = "clearbook",
    about = "Clean bank statement exports into Receipts or Payments tables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean one or more statement files (CSV/XLSX/XLS or a folder of them).
    Clean {
        /// Statement files or directories
        #[arg(required = true)]
        files: Vec<String>,
        /// Transaction type: receipts or payments
        #[arg(long)]
        mode: Option<TransactionMode>,
        /// Previous year's analysis workbook
        #[arg(long)]
        analysis: Option<String>,
        /// Output format: table, csv, json
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Write the cleaned table to a file (.csv or .json)
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Show the description -> category mapping built from last year's analysis.
    Mapping {
        /// Previous year's analysis workbook
        workbook: String,
        /// Transaction type: receipts or payments
        #[arg(long)]
        mode: Option<TransactionMode>,
    },
    /// View or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print current settings.
    Show,
    /// Change a setting: default_mode, retain_uploads, output_format.
    Set {
        key: String,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_paths_reads_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.xlsx", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let inputs = vec![
            dir.path().to_string_lossy().to_string(),
            "elsewhere.csv".to_string(),
        ];
        let paths = expand_paths(&inputs);
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.csv", "elsewhere.csv"]);
    }

    #[test]
    fn test_cli_parses_clean() {
        let cli = Cli::try_parse_from([
            "clearbook", "clean", "jan.csv", "feb.csv", "--mode", "payments", "--format", "csv",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Clean { files, mode, format, .. }) => {
                assert_eq!(files, vec!["jan.csv", "feb.csv"]);
                assert_eq!(mode, Some(TransactionMode::Payments));
                assert_eq!(format, Some(OutputFormat::Csv));
            }
            _ => panic!("expected clean command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["clearbook", "clean", "a.csv", "--mode", "transfers"]).is_err());
    }
}

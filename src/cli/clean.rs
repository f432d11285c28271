use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cleaner::CleanReport;
use crate::error::Result;
use crate::fmt::amount;
use crate::models::TransactionMode;
use crate::output::{headers, to_json, write_csv, OutputFormat};
use crate::session::{ProcessOutcome, Session};
use crate::settings::load_settings;

pub fn run(
    files: &[String],
    mode: Option<TransactionMode>,
    analysis: Option<&str>,
    format: Option<OutputFormat>,
    output: Option<&str>,
) -> Result<()> {
    let settings = load_settings();
    let mode = mode.unwrap_or(settings.default_mode);
    let format = format.unwrap_or(settings.output_format);

    let mut session = Session::new(mode, settings.retain_uploads);
    if let Some(workbook) = analysis {
        match session.load_mapping(Path::new(workbook)) {
            Ok(keys) => eprintln!(
                "{}",
                format!("Previous year's analysis loaded ({keys} descriptions).").green()
            ),
            Err(e) => eprintln!(
                "{}",
                format!("No previous year's analysis available: {e}").red()
            ),
        }
    }
    session.add_files(super::expand_paths(files));

    let outcome = session.process()?;
    print_skipped(&outcome);

    match output {
        Some(path) => {
            write_file(&outcome.report, Path::new(path))?;
            println!(
                "Wrote {} {} to {path}",
                outcome.report.transactions.len(),
                mode.name().to_lowercase()
            );
        }
        None => match format {
            OutputFormat::Table => print_report(&outcome.report),
            OutputFormat::Csv => write_csv(&outcome.report, std::io::stdout().lock())?,
            OutputFormat::Json => println!("{}", to_json(&outcome.report)?),
        },
    }
    Ok(())
}

fn write_file(report: &CleanReport, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));
    if is_json {
        std::fs::write(path, format!("{}\n", to_json(report)?))?;
    } else {
        let file = std::fs::File::create(path)?;
        write_csv(report, std::io::BufWriter::new(file))?;
    }
    Ok(())
}

pub(crate) fn print_skipped(outcome: &ProcessOutcome) {
    for failure in &outcome.skipped {
        eprintln!("{}", format!("Warning: {failure}").yellow());
    }
}

pub(crate) fn print_report(report: &CleanReport) {
    let mut table = Table::new();
    table.set_header(headers(report));
    for txn in &report.transactions {
        let mut row = vec![
            Cell::new(txn.date_string()),
            Cell::new(amount(txn.amount)),
            Cell::new(&txn.details),
        ];
        if report.has_analysis {
            row.push(Cell::new(txn.category.as_deref().unwrap_or("")));
        }
        table.add_row(row);
    }
    println!("Cleaned {}\n{table}", report.mode);

    let stats = &report.stats;
    let skipped = stats.input_rows - report.transactions.len();
    let total: f64 = report.transactions.iter().map(|t| t.amount).sum();
    println!(
        "{} transactions totalling {}, {} rows skipped",
        report.transactions.len(),
        amount(total),
        skipped
    );
    if skipped > 0 {
        println!(
            "  {} blank, {} repeated headers, {} without an amount, {} without a date",
            stats.dropped_blank,
            stats.dropped_header_noise,
            stats.dropped_no_amount,
            stats.dropped_undated
        );
    }
    if stats.dropped_bad_amount > 0 {
        println!(
            "{}",
            format!(
                "{} rows had an amount that could not be read",
                stats.dropped_bad_amount
            )
            .yellow()
        );
    }
    if report.has_analysis {
        println!(
            "{} of {} matched last year's analysis",
            stats.categorised,
            report.transactions.len()
        );
    }
}

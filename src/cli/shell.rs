use std::path::Path;

use colored::Colorize;
use dialoguer::{Input, Select};

use crate::error::Result;
use crate::models::TransactionMode;
use crate::reader::file_label;
use crate::session::Session;
use crate::settings::load_settings;

const ACTIONS: &[&str] = &[
    "Select transaction type",
    "Upload previous year's analysis",
    "Add bank statements",
    "Show uploaded files",
    "Process statements",
    "Clear uploaded files",
    "Quit",
];

/// Interactive session: queue statements, optionally load last year's
/// analysis, then process. Everything is forgotten on exit.
pub fn run() -> Result<()> {
    let settings = load_settings();
    let mut session = Session::from_settings(&settings);

    println!("{}", "Bank Statement Cleaner".bold());
    println!(
        "Files are processed in alphabetical order. If necessary, rename them by period \
         (e.g. '1 Jan-May', '2 Jun-Dec')."
    );

    loop {
        println!();
        println!("{}", status_line(&session).dimmed());
        let choice = Select::new()
            .with_prompt("What next?")
            .items(ACTIONS)
            .default(0)
            .interact()
            .unwrap_or(ACTIONS.len() - 1);

        match choice {
            0 => select_mode(&mut session),
            1 => upload_analysis(&mut session),
            2 => add_statements(&mut session),
            3 => show_files(&session),
            4 => process(&mut session),
            5 => {
                session.clear();
                println!(
                    "{}",
                    "Uploaded files and previous year's analysis cleared.".green()
                );
            }
            _ => return Ok(()),
        }
    }
}

fn status_line(session: &Session) -> String {
    let analysis = match (session.mapping(), session.mapping_source()) {
        (Some(m), _) if m.is_empty() => "loaded, no descriptions".to_string(),
        (Some(m), Some(src)) => format!("{} ({} descriptions)", file_label(src), m.len()),
        (Some(m), None) => format!("{} descriptions", m.len()),
        (None, _) => "none".to_string(),
    };
    format!(
        "Type: {} | Files: {} | Previous year's analysis: {}",
        session.mode(),
        session.files().len(),
        analysis
    )
}

fn select_mode(session: &mut Session) {
    let current = TransactionMode::ALL
        .iter()
        .position(|m| *m == session.mode())
        .unwrap_or(0);
    let names: Vec<&str> = TransactionMode::ALL.iter().map(|m| m.name()).collect();
    let Ok(idx) = Select::new()
        .with_prompt("Transaction type")
        .items(&names)
        .default(current)
        .interact()
    else {
        return;
    };
    if let Err(e) = session.set_mode(TransactionMode::ALL[idx]) {
        println!(
            "{}",
            format!("Error processing previous year's analysis: {e}").red()
        );
    }
}

fn upload_analysis(session: &mut Session) {
    let path: String = Input::new()
        .with_prompt(format!(
            "Previous year's workbook (sheet '{}')",
            session.mode().analysis_sheet()
        ))
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    if path.trim().is_empty() {
        return;
    }
    match session.load_mapping(Path::new(path.trim())) {
        Ok(keys) => println!(
            "{}",
            format!("Previous year's analysis loaded successfully ({keys} descriptions).").green()
        ),
        Err(e) => println!(
            "{}",
            format!("Error processing previous year's analysis: {e}").red()
        ),
    }
}

fn add_statements(session: &mut Session) {
    println!("Enter one file or folder per line; leave blank to finish.");
    loop {
        let input: String = Input::new()
            .with_prompt("Statement")
            .allow_empty(true)
            .interact_text()
            .unwrap_or_default();
        if input.trim().is_empty() {
            break;
        }
        let added = session.add_files(super::expand_paths(&[input]));
        println!("{added} file(s) added");
    }
    show_files(session);
}

fn show_files(session: &Session) {
    if session.files().is_empty() {
        println!("{}", "No files uploaded.".yellow());
        return;
    }
    println!("Uploaded files:");
    for path in session.files() {
        println!("  - {}", file_label(path));
    }
}

fn process(session: &mut Session) {
    if session.files().is_empty() {
        println!(
            "{}",
            "Please upload bank statements before processing.".yellow()
        );
        return;
    }
    match session.process() {
        Ok(outcome) => {
            super::clean::print_skipped(&outcome);
            super::clean::print_report(&outcome.report);
        }
        Err(e) => println!("{}", format!("Error: {e}").red()),
    }
}

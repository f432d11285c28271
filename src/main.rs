mod amount;
mod cleaner;
mod cli;
mod dates;
mod error;
mod fmt;
mod mapping;
mod models;
mod output;
mod reader;
mod session;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigCommands};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        None => cli::shell::run(),
        Some(Commands::Clean {
            files,
            mode,
            analysis,
            format,
            output,
        }) => cli::clean::run(&files, mode, analysis.as_deref(), format, output.as_deref()),
        Some(Commands::Mapping { workbook, mode }) => cli::mapping::run(&workbook, mode),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

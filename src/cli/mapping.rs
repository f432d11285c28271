use std::path::Path;

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::mapping::load_mapping;
use crate::models::TransactionMode;
use crate::settings::load_settings;

pub fn run(workbook: &str, mode: Option<TransactionMode>) -> Result<()> {
    let mode = mode.unwrap_or(load_settings().default_mode);
    let mapping = load_mapping(Path::new(workbook), mode)?;

    let mut table = Table::new();
    table.set_header(vec!["Match", "Analysis"]);
    for (key, category) in mapping.iter() {
        table.add_row(vec![Cell::new(key), Cell::new(category)]);
    }
    println!("{} ({})\n{table}", mode.analysis_sheet(), workbook);
    println!("{} descriptions", mapping.len());
    Ok(())
}

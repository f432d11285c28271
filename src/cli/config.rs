use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        Cell::new("default_mode"),
        Cell::new(settings.default_mode.name().to_lowercase()),
    ]);
    table.add_row(vec![
        Cell::new("retain_uploads"),
        Cell::new(settings.retain_uploads),
    ]);
    table.add_row(vec![
        Cell::new("output_format"),
        Cell::new(settings.output_format),
    ]);
    println!("Settings ({})\n{table}", settings_path().display());
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("Set {key} = {value}");
    Ok(())
}

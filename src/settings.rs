use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CleanerError, Result};
use crate::models::TransactionMode;
use crate::output::OutputFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub default_mode: TransactionMode,
    /// Keep uploaded statements queued after a process action instead of
    /// starting the next one empty.
    #[serde(default = "default_retain_uploads")]
    pub retain_uploads: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_retain_uploads() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_mode: TransactionMode::default(),
            retain_uploads: default_retain_uploads(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 3] = ["default_mode", "retain_uploads", "output_format"];

    /// Update one setting from its string form, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_mode" | "mode" => {
                self.default_mode = value.parse().map_err(CleanerError::Settings)?;
            }
            "retain_uploads" => {
                self.retain_uploads = match value.trim().to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    other => {
                        return Err(CleanerError::Settings(format!(
                            "retain_uploads must be true or false, got '{other}'"
                        )))
                    }
                };
            }
            "output_format" | "format" => {
                self.output_format = value.parse().map_err(CleanerError::Settings)?;
            }
            other => {
                return Err(CleanerError::Settings(format!(
                    "Unknown setting: {other} (expected one of {})",
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("clearbook")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or malformed files fall back to defaults.
fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CleanerError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

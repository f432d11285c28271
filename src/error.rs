use thiserror::Error;

use crate::models::TransactionMode;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "xlsx")]
    #[error("Workbook error: {0}")]
    Xlsx(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No header row containing 'Date' found in sheet '{sheet}'")]
    HeaderNotFound { sheet: String },

    #[error("'{column}' column not found in {context}")]
    MissingColumn { column: String, context: String },

    #[error("'Details' column not found in {mode} data")]
    MissingDetailsColumn { mode: TransactionMode },

    #[error("Sheet '{sheet}' not found in {file}")]
    SheetNotFound { sheet: String, file: String },

    #[error("Failed to read {file}: {reason}")]
    FileRead { file: String, reason: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("No statement files to process")]
    NoFiles,

    #[error("None of the uploaded files could be read ({0})")]
    NoReadableFiles(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, CleanerError>;

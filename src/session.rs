use std::path::{Path, PathBuf};

use tracing::info;

use crate::cleaner::{clean, CleanReport};
use crate::error::{CleanerError, Result};
use crate::mapping::{load_mapping, CategoryMapping};
use crate::models::TransactionMode;
use crate::reader::read_statements;
use crate::settings::Settings;

/// What one process action produced.
#[derive(Debug)]
pub struct ProcessOutcome {
    pub report: CleanReport,
    pub files_read: Vec<String>,
    /// Files that could not be read; the rest were still processed.
    pub skipped: Vec<CleanerError>,
}

/// Uploaded statements and last year's mapping for one working session.
/// Owned by the caller; nothing here outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    mode: TransactionMode,
    retain_uploads: bool,
    files: Vec<PathBuf>,
    mapping: Option<CategoryMapping>,
    mapping_source: Option<PathBuf>,
}

impl Session {
    pub fn new(mode: TransactionMode, retain_uploads: bool) -> Self {
        Self {
            mode,
            retain_uploads,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.default_mode, settings.retain_uploads)
    }

    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn mapping(&self) -> Option<&CategoryMapping> {
        self.mapping.as_ref()
    }

    pub fn mapping_source(&self) -> Option<&Path> {
        self.mapping_source.as_deref()
    }

    /// Queue statements for the next process action. A path already queued
    /// is not added twice.
    pub fn add_files<I: IntoIterator<Item = PathBuf>>(&mut self, paths: I) -> usize {
        let mut added = 0;
        for path in paths {
            if !self.files.contains(&path) {
                self.files.push(path);
                added += 1;
            }
        }
        added
    }

    /// Build the mapping from last year's workbook for the current mode.
    /// On failure no mapping is held and the error is returned.
    pub fn load_mapping(&mut self, path: &Path) -> Result<usize> {
        self.mapping = None;
        self.mapping_source = None;
        let mapping = load_mapping(path, self.mode)?;
        let keys = mapping.len();
        self.mapping = Some(mapping);
        self.mapping_source = Some(path.to_path_buf());
        Ok(keys)
    }

    /// Switch between Receipts and Payments. Each mode reads a different
    /// sheet of last year's workbook, so a loaded mapping is rebuilt.
    pub fn set_mode(&mut self, mode: TransactionMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }
        self.mode = mode;
        match self.mapping_source.take() {
            Some(source) => self.load_mapping(&source).map(|_| ()),
            None => {
                self.mapping = None;
                Ok(())
            }
        }
    }

    /// Forget all uploaded files and the mapping.
    pub fn clear(&mut self) {
        self.files.clear();
        self.mapping = None;
        self.mapping_source = None;
        info!("session cleared");
    }

    /// Read every queued statement and clean it. Unless uploads are
    /// retained, the queue is emptied whether or not processing succeeds.
    pub fn process(&mut self) -> Result<ProcessOutcome> {
        let files = if self.retain_uploads {
            self.files.clone()
        } else {
            std::mem::take(&mut self.files)
        };
        let ingested = read_statements(&files)?;
        let report = clean(&ingested.table, self.mode, self.mapping.as_ref())?;
        Ok(ProcessOutcome {
            report,
            files_read: ingested.files_read,
            skipped: ingested.failures,
        })
    }
}

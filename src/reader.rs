use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{CleanerError, Result};
use crate::models::{RawTable, RawValue};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn is_workbook(path: &Path) -> bool {
    matches!(extension(path).as_str(), "xlsx" | "xlsm" | "xls" | "ods")
}

/// Header cells become column names; blanks and repeats get the same
/// `Unnamed: n` / `Name.1` treatment spreadsheet tools give them.
fn header_names(cells: &[RawValue]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        let raw = cell.as_string();
        let base = raw.trim_start_matches('\u{feff}').trim().to_string();
        let base = if base.is_empty() {
            format!("Unnamed: {i}")
        } else {
            base
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}

/// First row of the grid is the header, the rest are data rows.
fn table_from_grid(mut grid: Vec<Vec<RawValue>>) -> RawTable {
    if grid.is_empty() {
        return RawTable::default();
    }
    let header = grid.remove(0);
    let mut table = RawTable::new(header_names(&header));
    for row in grid {
        table.push_row(row);
    }
    table
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv_grid(path: &Path) -> Result<Vec<Vec<RawValue>>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(record.iter().map(RawValue::text).collect());
    }
    Ok(grid)
}

// ---------------------------------------------------------------------------
// Workbooks (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn cell_to_raw(cell: &calamine::Data) -> RawValue {
    use calamine::Data;
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Empty,
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::text(s),
        Data::Bool(b) => RawValue::Text(b.to_string()),
        Data::DateTime(dt) => crate::dates::excel_serial_to_date(dt.as_f64())
            .map(RawValue::Date)
            .unwrap_or(RawValue::Number(dt.as_f64())),
    }
}

#[cfg(feature = "xlsx")]
fn read_workbook_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<RawValue>>> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(path)?;
    let sheet_name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(CleanerError::SheetNotFound {
                    sheet: name.to_string(),
                    file: file_label(path),
                });
            }
            name.to_string()
        }
        None => match workbook.sheet_names().first() {
            Some(first) => first.clone(),
            None => return Ok(Vec::new()),
        },
    };
    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_raw).collect())
        .collect())
}

#[cfg(not(feature = "xlsx"))]
fn read_workbook_grid(path: &Path, _sheet: Option<&str>) -> Result<Vec<Vec<RawValue>>> {
    Err(CleanerError::UnsupportedFile(format!(
        "{} (built without workbook support)",
        file_label(path)
    )))
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Read one statement file; its first row names the columns.
pub fn read_table(path: &Path) -> Result<RawTable> {
    let grid = match extension(path).as_str() {
        "csv" => read_csv_grid(path)?,
        _ if is_workbook(path) => read_workbook_grid(path, None)?,
        _ => return Err(CleanerError::UnsupportedFile(file_label(path))),
    };
    Ok(table_from_grid(grid))
}

/// Read a named sheet without assuming where its header row is. A CSV has
/// no sheets, so its only grid is returned whatever the name.
pub fn read_sheet_grid(path: &Path, sheet: &str) -> Result<Vec<Vec<RawValue>>> {
    match extension(path).as_str() {
        "csv" => read_csv_grid(path),
        _ if is_workbook(path) => read_workbook_grid(path, Some(sheet)),
        _ => Err(CleanerError::UnsupportedFile(file_label(path))),
    }
}

/// Result of reading every uploaded statement.
#[derive(Debug, Default)]
pub struct Ingested {
    pub table: RawTable,
    pub files_read: Vec<String>,
    /// One `FileRead` error per file that could not be parsed.
    pub failures: Vec<CleanerError>,
}

/// Read and concatenate statements in file-name order. A file that fails
/// to parse is reported and skipped; only when none can be read is this an
/// error.
pub fn read_statements(paths: &[PathBuf]) -> Result<Ingested> {
    if paths.is_empty() {
        return Err(CleanerError::NoFiles);
    }
    let mut ordered: Vec<&PathBuf> = paths.iter().collect();
    ordered.sort_by_key(|p| file_label(p));

    let mut tables = Vec::new();
    let mut ingested = Ingested::default();
    for path in ordered {
        let label = file_label(path);
        match read_table(path) {
            Ok(table) => {
                info!(file = %label, rows = table.rows.len(), "read statement");
                tables.push(table);
                ingested.files_read.push(label);
            }
            Err(e) => {
                warn!(file = %label, error = %e, "skipping unreadable statement");
                ingested.failures.push(CleanerError::FileRead {
                    file: label,
                    reason: e.to_string(),
                });
            }
        }
    }

    if tables.is_empty() {
        let names: Vec<String> = ingested
            .failures
            .iter()
            .map(|f| match f {
                CleanerError::FileRead { file, .. } => file.clone(),
                other => other.to_string(),
            })
            .collect();
        return Err(CleanerError::NoReadableFiles(names.join(", ")));
    }
    ingested.table = RawTable::concat(tables);
    Ok(ingested)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_csv_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "jan.csv",
            "Date,Details,Debit,Credit,Balance\n01/01/2024,SALARY,,\"2,000.00\",2500.00\n,,,,\n",
        );
        let table = read_table(&path).unwrap();
        assert_eq!(table.columns, vec!["Date", "Details", "Debit", "Credit", "Balance"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][3], RawValue::text("2,000.00"));
        assert!(table.rows[0][2].is_empty());
        assert!(table.rows[1].iter().all(RawValue::is_empty));
    }

    #[test]
    fn test_header_names_blank_and_duplicate() {
        let cells = vec![
            RawValue::text("\u{feff}Date"),
            RawValue::Empty,
            RawValue::text(" Details "),
            RawValue::text("Details"),
        ];
        assert_eq!(
            header_names(&cells),
            vec!["Date", "Unnamed: 1", "Details", "Details.1"]
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "notes.txt", "hello");
        assert!(matches!(read_table(&path), Err(CleanerError::UnsupportedFile(_))));
    }

    #[test]
    fn test_read_statements_sorted_by_name_and_concatenated() {
        let dir = tempfile::tempdir().unwrap();
        let b = write(dir.path(), "2 Jun-Dec.csv", "Date,Credit,Details\n01/06/2024,5,B\n");
        let a = write(dir.path(), "1 Jan-May.csv", "Date,Details,Credit\n01/01/2024,A,7\n");
        let ingested = read_statements(&[b, a]).unwrap();
        assert_eq!(ingested.files_read, vec!["1 Jan-May.csv", "2 Jun-Dec.csv"]);
        assert!(ingested.failures.is_empty());
        let table = ingested.table;
        assert_eq!(table.columns, vec!["Date", "Details", "Credit"]);
        assert_eq!(table.rows[0][1], RawValue::text("A"));
        assert_eq!(table.rows[1][1], RawValue::text("B"));
        assert_eq!(table.rows[1][2], RawValue::text("5"));
    }

    #[test]
    fn test_read_statements_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.csv", "Date,Credit,Details\n01/01/2024,5,A\n");
        let missing = dir.path().join("missing.csv");
        let ingested = read_statements(&[good, missing]).unwrap();
        assert_eq!(ingested.files_read, vec!["good.csv"]);
        assert_eq!(ingested.failures.len(), 1);
        match &ingested.failures[0] {
            CleanerError::FileRead { file, .. } => assert_eq!(file, "missing.csv"),
            other => panic!("unexpected failure: {other}"),
        }
    }

    #[test]
    fn test_read_statements_all_bad() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "scan.pdf", "%PDF");
        let err = read_statements(&[bad]).unwrap_err();
        assert!(err.to_string().contains("scan.pdf"));
        assert!(matches!(read_statements(&[]), Err(CleanerError::NoFiles)));
    }

    #[test]
    fn test_read_sheet_grid_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "analysis.csv", "Title\nDate,Details,Analysis\n");
        let grid = read_sheet_grid(&path, "ReceiptsAnalysis").unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][2], RawValue::text("Analysis"));
    }
}

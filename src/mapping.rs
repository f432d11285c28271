use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{CleanerError, Result};
use crate::models::{RawValue, TransactionMode};

const DETAILS: &str = "Details";
const ANALYSIS: &str = "Analysis";

/// Join key between a statement row and last year's analysis: lowercase,
/// all whitespace removed. Both sides must go through this function.
pub fn match_key(details: &str) -> String {
    details
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized description -> most common historical category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMapping {
    keys: Vec<String>,
    categories: HashMap<String, String>,
}

impl CategoryMapping {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.categories.get(key).map(String::as_str)
    }

    /// Look up the category for a raw description.
    pub fn category_for(&self, details: &str) -> Option<&str> {
        self.get(&match_key(details))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Entries in the order their key was first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keys
            .iter()
            .filter_map(|k| self.categories.get(k).map(|c| (k.as_str(), c.as_str())))
    }
}

/// Tally of categories seen for one key, kept in first-seen order so that
/// ties resolve to whichever category appeared first.
#[derive(Default)]
struct Votes(Vec<(String, usize)>);

impl Votes {
    fn add(&mut self, category: String) {
        match self.0.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => self.0.push((category, 1)),
        }
    }

    fn winner(self) -> Option<String> {
        let mut best: Option<(String, usize)> = None;
        for (category, n) in self.0 {
            if best.as_ref().map_or(true, |(_, top)| n > *top) {
                best = Some((category, n));
            }
        }
        best.map(|(c, _)| c)
    }
}

/// Build the mapping from one headerless sheet of last year's workbook.
///
/// The header row is the first row whose first cell mentions "date"; it
/// must name both a `Details` and an `Analysis` column.
pub fn build_mapping(grid: &[Vec<RawValue>], mode: TransactionMode) -> Result<CategoryMapping> {
    let sheet = mode.analysis_sheet();

    let header_row = grid
        .iter()
        .position(|row| {
            row.first()
                .map(|c| c.as_string().to_lowercase().contains("date"))
                .unwrap_or(false)
        })
        .ok_or_else(|| CleanerError::HeaderNotFound {
            sheet: sheet.to_string(),
        })?;

    let headers: Vec<String> = grid[header_row].iter().map(RawValue::as_string).collect();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CleanerError::MissingColumn {
                column: name.to_string(),
                context: format!("analysis sheet '{sheet}'"),
            })
    };
    let details_idx = find(DETAILS)?;
    let analysis_idx = find(ANALYSIS)?;

    let mut keys: Vec<String> = Vec::new();
    let mut votes: HashMap<String, Votes> = HashMap::new();
    for row in &grid[header_row + 1..] {
        let details = row.get(details_idx).map(RawValue::as_string).unwrap_or_default();
        let key = match_key(&details);
        // Blank labels cast no vote; labels are otherwise kept as written.
        let category = row.get(analysis_idx).map(RawValue::as_string).unwrap_or_default();
        if category.trim().is_empty() {
            continue;
        }
        if !votes.contains_key(&key) {
            keys.push(key.clone());
        }
        votes.entry(key).or_default().add(category);
    }

    let mut mapping = CategoryMapping::default();
    for key in keys {
        if let Some(winner) = votes.remove(&key).and_then(Votes::winner) {
            mapping.categories.insert(key.clone(), winner);
            mapping.keys.push(key);
        }
    }
    debug!(header_row, sheet, "located analysis header");
    info!(keys = mapping.len(), sheet, "built category mapping");
    Ok(mapping)
}

/// Open last year's workbook, pick the sheet for `mode` and build the mapping.
pub fn load_mapping(path: &Path, mode: TransactionMode) -> Result<CategoryMapping> {
    let grid = crate::reader::read_sheet_grid(path, mode.analysis_sheet())?;
    build_mapping(&grid, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<RawValue> {
        cells.iter().map(|c| RawValue::text(c)).collect()
    }

    fn sheet(body: &[(&str, &str)]) -> Vec<Vec<RawValue>> {
        let mut grid = vec![
            row(&["Receipts analysis 2023"]),
            row(&[]),
            row(&["Date", "Details", "Amount", "Analysis"]),
        ];
        for (details, analysis) in body {
            grid.push(row(&["01/01/2023", details, "10.00", analysis]));
        }
        grid
    }

    #[test]
    fn test_match_key_normalizes_case_and_whitespace() {
        assert_eq!(match_key("Tesco 123"), "tesco123");
        assert_eq!(match_key("  TESCO\t1 2 3\n"), "tesco123");
        assert_eq!(match_key(""), "");
    }

    #[test]
    fn test_majority_category_wins() {
        let grid = sheet(&[
            ("Tesco 123", "Groceries"),
            ("tesco123", "Groceries"),
            ("TESCO 123", "Fuel"),
        ]);
        let mapping = build_mapping(&grid, TransactionMode::Receipts).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("tesco123"), Some("Groceries"));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let grid = sheet(&[
            ("ESB", "Light & Heat"),
            ("esb", "Utilities"),
            ("E S B", "Utilities"),
            ("Esb", "Light & Heat"),
        ]);
        let mapping = build_mapping(&grid, TransactionMode::Payments).unwrap();
        assert_eq!(mapping.get("esb"), Some("Light & Heat"));
    }

    #[test]
    fn test_keys_keep_first_seen_order() {
        let grid = sheet(&[("B Corp", "X"), ("A Corp", "Y"), ("b corp", "X")]);
        let mapping = build_mapping(&grid, TransactionMode::Receipts).unwrap();
        let keys: Vec<&str> = mapping.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bcorp", "acorp"]);
    }

    #[test]
    fn test_blank_details_keyed_and_blank_analysis_skipped() {
        let grid = sheet(&[("", "Bank charges"), ("Shop", ""), ("Other", "Misc"), ("  ", "Fees")]);
        let mapping = build_mapping(&grid, TransactionMode::Receipts).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(""), Some("Bank charges"));
        assert_eq!(mapping.category_for(""), Some("Bank charges"));
        assert_eq!(mapping.get("shop"), None);
        assert_eq!(mapping.category_for("OTHER"), Some("Misc"));
    }

    #[test]
    fn test_labels_vote_as_written() {
        let grid = sheet(&[
            ("Tesco", "Groceries "),
            ("Tesco", "Groceries"),
            ("Tesco", "Groceries"),
        ]);
        let mapping = build_mapping(&grid, TransactionMode::Payments).unwrap();
        assert_eq!(mapping.get("tesco"), Some("Groceries"));

        let grid = sheet(&[("Tesco", "Groceries "), ("Tesco", "Fuel")]);
        let mapping = build_mapping(&grid, TransactionMode::Payments).unwrap();
        assert_eq!(mapping.get("tesco"), Some("Groceries "));
    }

    #[test]
    fn test_header_row_detection_is_case_insensitive() {
        let grid = vec![
            row(&["Title"]),
            row(&["Posting DATE", "Details", "Analysis"]),
            row(&["x", "Rent", "Premises"]),
        ];
        let mapping = build_mapping(&grid, TransactionMode::Payments).unwrap();
        assert_eq!(mapping.get("rent"), Some("Premises"));
    }

    #[test]
    fn test_missing_header_row() {
        let grid = vec![row(&["Details", "Analysis"]), row(&["Rent", "Premises"])];
        let err = build_mapping(&grid, TransactionMode::Payments).unwrap_err();
        match err {
            CleanerError::HeaderNotFound { sheet } => assert_eq!(sheet, "Payments Analysis"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_analysis_column() {
        let grid = vec![row(&["Date", "Details", "Category"]), row(&["x", "Rent", "Premises"])];
        let err = build_mapping(&grid, TransactionMode::Receipts).unwrap_err();
        match err {
            CleanerError::MissingColumn { column, context } => {
                assert_eq!(column, "Analysis");
                assert!(context.contains("ReceiptsAnalysis"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_column_names_are_exact() {
        let grid = vec![row(&["Date", "details", "Analysis"])];
        assert!(matches!(
            build_mapping(&grid, TransactionMode::Receipts),
            Err(CleanerError::MissingColumn { .. })
        ));
    }
}

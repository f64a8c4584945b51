// src/extractors/anchor.rs
use crate::grid::{Cell, Grid};
use crate::utils::error::ExtractError;

/// Column holding section labels.
const LABEL_COLUMN: usize = 0;
/// Keyword hits read their value from the column after the label.
const VALUE_COLUMN: usize = 1;

/// Returns the first row whose column-0 text equals `label` exactly (case-sensitive).
///
/// An absent label is an `AnchorNotFound` error for `section`; it never falls back to row 0.
pub fn locate(grid: &Grid, section: &'static str, label: &str) -> Result<usize, ExtractError> {
    let found = grid
        .rows()
        .position(|row| matches!(row.get(LABEL_COLUMN), Some(Cell::Text(text)) if text == label));

    match found {
        Some(row) => {
            tracing::debug!("Resolved anchor '{}' for section '{}' at row {}", label, section, row);
            Ok(row)
        }
        None => Err(ExtractError::AnchorNotFound {
            section,
            label: label.to_string(),
        }),
    }
}

/// Scans every cell for a case-insensitive substring match on `keyword` and
/// returns the column-1 cell of the first matching row.
///
/// Text and number cells are matched on their display text. `None` means no
/// row matched, which callers treat as an optional value being absent.
pub fn find_value(grid: &Grid, keyword: &str) -> Option<Cell> {
    let needle = keyword.to_lowercase();

    let row = grid.rows().find(|row| {
        row.iter()
            .filter(|cell| !cell.is_empty())
            .any(|cell| cell.to_string().to_lowercase().contains(&needle))
    })?;

    let value = row.get(VALUE_COLUMN).cloned();
    if value.is_none() {
        tracing::debug!("Keyword '{}' matched a row without a value column", keyword);
    }
    value
}

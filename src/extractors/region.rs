// src/extractors/region.rs
use crate::grid::{Cell, Grid};

/// Which columns must be non-empty for a row to survive extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Required {
    /// The first declared column (the row's label).
    FirstColumn,
    /// Every declared column.
    AllColumns,
}

/// A rectangular slice of the grid with positionally assigned column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn retain_required(&mut self, required: Required) {
        self.rows.retain(|row| match required {
            Required::FirstColumn => row.first().is_some_and(|c| !c.is_empty()),
            Required::AllColumns => row.iter().all(|c| !c.is_empty()),
        });
    }
}

/// Copies `n_rows` rows from (`origin_row`, `origin_col`), one column per name
/// in `columns`, then drops rows missing a `required` value.
///
/// Source column order must match `columns` order; headers are never inspected.
/// Rows or columns beyond the grid edge are truncated away.
pub fn extract_fixed(
    grid: &Grid,
    origin_row: usize,
    origin_col: usize,
    n_rows: usize,
    columns: &[&'static str],
    required: Required,
) -> Table {
    let end_row = origin_row.saturating_add(n_rows).min(grid.height());
    let mut table = slice(grid, origin_row, end_row, origin_col, columns);
    table.retain_required(required);
    table
}

/// Copies rows from `start_row` up to (excluding) the first row whose first
/// `columns.len()` cells are all empty, or to the end of the grid.
///
/// A `start_row` that is itself empty gives an empty table.
pub fn extract_dynamic(
    grid: &Grid,
    start_row: usize,
    columns: &[&'static str],
    required: Required,
) -> Table {
    let end_row = region_end(grid, start_row, columns.len());
    tracing::debug!("Dynamic region spans rows {}..{}", start_row, end_row);

    let mut table = slice(grid, start_row, end_row, 0, columns);
    table.retain_required(required);
    table
}

/// Exclusive end of a dynamic region.
pub fn region_end(grid: &Grid, start_row: usize, n_cols: usize) -> usize {
    (start_row..grid.height())
        .find(|&row| {
            grid.row(row)
                .map(|cells| cells.iter().take(n_cols).all(Cell::is_empty))
                .unwrap_or(true)
        })
        .unwrap_or_else(|| grid.height().max(start_row))
}

fn slice(
    grid: &Grid,
    start_row: usize,
    end_row: usize,
    origin_col: usize,
    columns: &[&'static str],
) -> Table {
    let rows = (start_row..end_row)
        .map(|row| {
            (0..columns.len())
                .map(|offset| {
                    grid.get(row, origin_col + offset)
                        .cloned()
                        .unwrap_or(Cell::Empty)
                })
                .collect()
        })
        .collect();

    Table {
        columns: columns.to_vec(),
        rows,
    }
}

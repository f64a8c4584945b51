// src/grid/mod.rs
pub mod loader;

use serde::{Serialize, Serializer};
use std::fmt;

/// Largest magnitude at which an f64 still holds every integer exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single spreadsheet value. Comparisons only make sense within a variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Empty cells and zero-length text both count as missing.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Numeric coercion: numbers pass through, text is parsed after trimming,
    /// anything else (including NaN/inf text) fails.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Integral values that fit an i64 exactly, used to print "42" instead of "42.0".
    fn as_exact_int(n: f64) -> Option<i64> {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_EXACT_INT {
            Some(n as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => match Cell::as_exact_int(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
        }
    }
}

// Type-preserving: text stays a string, numbers stay numbers, empty is a null.
impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Text(s) if s.is_empty() => serializer.serialize_none(),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => match Cell::as_exact_int(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// The loaded report: a rectangular, 0-indexed, immutable block of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Grid {
    /// Builds a grid, padding short rows with `Cell::Empty` so every row has the same length.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in rows.iter_mut() {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// Shorthand for building grids in tests: `""` is empty, numerals parse as numbers.
#[cfg(test)]
pub(crate) fn grid_of(rows: &[&[&str]]) -> Grid {
    Grid::from_rows(
        rows.iter()
            .map(|row| {
                row.iter()
                    .map(|v| match v.parse::<f64>() {
                        Ok(n) if n.is_finite() => Cell::Number(n),
                        _ => Cell::from(*v),
                    })
                    .collect()
            })
            .collect(),
    )
}

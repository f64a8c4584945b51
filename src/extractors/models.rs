// src/extractors/models.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::grid::Cell;

// Separator between booth labels in the visit order cell, with any surrounding whitespace
static VISIT_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*->\s*").expect("Failed to compile VISIT_SEPARATOR_RE"));

/// A named, exportable relation: one row per value, columns in declared order.
pub trait Relation: Serialize {
    /// File stem used when the relation is written out.
    const NAME: &'static str;
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoothVisit {
    pub booth_type: Cell,
    /// Raw cell, type preserved.
    pub visit_count: Cell,
}

impl Relation for BoothVisit {
    const NAME: &'static str = "booth_visits";
    const COLUMNS: &'static [&'static str] = &["booth_type", "visit_count"];
}

impl BoothVisit {
    pub fn from_row(row: &[Cell]) -> Self {
        Self {
            booth_type: row.first().cloned().unwrap_or_default(),
            visit_count: row.get(1).cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTimeEntry {
    pub product: Cell,
    /// `None` when the source value was not numeric.
    #[serde(rename = "time_spent", serialize_with = "serialize_seconds")]
    pub time_spent_sec: Option<f64>,
}

impl Relation for ProductTimeEntry {
    const NAME: &'static str = "product_time";
    const COLUMNS: &'static [&'static str] = &["product", "time_spent"];
}

// Coerced seconds are written like any other numeric cell ("90", not "90.0")
fn serialize_seconds<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    value.map(Cell::Number).serialize(serializer)
}

impl ProductTimeEntry {
    /// Coerces the time column; failures become `None` rather than errors.
    pub fn from_row(row: &[Cell]) -> Self {
        Self {
            product: row.first().cloned().unwrap_or_default(),
            time_spent_sec: row.get(1).and_then(Cell::to_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingItem {
    pub product_name: Cell,
    pub total_count: Cell,
    pub unit_price: Cell,
    pub status: Cell,
    pub subtotal: Cell,
}

impl Relation for ShoppingItem {
    const NAME: &'static str = "shopping_table";
    const COLUMNS: &'static [&'static str] =
        &["product_name", "total_count", "unit_price", "status", "subtotal"];
}

impl ShoppingItem {
    pub fn from_row(row: &[Cell]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
        Self {
            product_name: row.first().cloned().unwrap_or_default(),
            total_count: cell(1),
            unit_price: cell(2),
            status: cell(3),
            subtotal: cell(4),
        }
    }
}

/// Ordered booth path. Always holds at least one non-empty step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitSequence(Vec<String>);

impl VisitSequence {
    /// Splits `"A -> B -> C"` into trimmed steps. Empty steps are skipped; a
    /// text with no steps at all yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let steps: Vec<String> = VISIT_SEPARATOR_RE
            .split(text.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        if steps.is_empty() {
            None
        } else {
            Some(Self(steps))
        }
    }

    pub fn steps(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// One exportable row per step.
    pub fn rows(&self) -> Vec<VisitStep<'_>> {
        self.0
            .iter()
            .map(|s| VisitStep { visit_sequence: s })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitStep<'a> {
    pub visit_sequence: &'a str,
}

impl Relation for VisitStep<'_> {
    const NAME: &'static str = "visit_order";
    const COLUMNS: &'static [&'static str] = &["visit_sequence"];
}

/// Scalar summary, exported as a single-row relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Raw keyword hits, `None` when the keyword is absent.
    pub total_items: Option<Cell>,
    pub total_price: Option<Cell>,
    pub show_list_count: Option<Cell>,
    pub total_task_time_sec: i64,
}

impl Relation for SummaryMetrics {
    const NAME: &'static str = "summary_metrics";
    const COLUMNS: &'static [&'static str] = &[
        "total_items",
        "total_price",
        "show_list_count",
        "total_task_time_sec",
    ];
}

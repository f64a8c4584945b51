// src/extractors/cleaning.rs
use serde::Serialize;

use crate::extractors::models::ProductTimeEntry;
use crate::grid::Cell;

/// Rows removed by each cleaning rule. Rules run in order, so a row is
/// counted under the first rule it fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub missing_label: usize,
    pub not_numeric: usize,
    pub below_threshold: usize,
    pub excluded_label: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.missing_label + self.not_numeric + self.below_threshold + self.excluded_label
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cleaned {
    pub rows: Vec<ProductTimeEntry>,
    pub dropped: DropCounts,
}

pub fn has_label(entry: &ProductTimeEntry) -> bool {
    !entry.product.is_empty()
}

pub fn is_numeric(entry: &ProductTimeEntry) -> bool {
    entry.time_spent_sec.is_some()
}

pub fn meets_threshold(entry: &ProductTimeEntry, min_threshold: f64) -> bool {
    entry.time_spent_sec.is_some_and(|t| t >= min_threshold)
}

/// Both the row label and each excluded label are trimmed and lower-cased
/// before comparing.
pub fn is_excluded(entry: &ProductTimeEntry, excluded_labels: &[String]) -> bool {
    let label = normalize_label(&entry.product);
    excluded_labels.iter().any(|l| l.trim().to_lowercase() == label)
}

fn normalize_label(label: &Cell) -> String {
    label.to_string().trim().to_lowercase()
}

/// Filters product time rows down to the ones that count toward task time.
///
/// Non-numeric times are dropped silently; the per-rule counts are logged at
/// debug level and returned alongside the surviving rows.
pub fn clean(rows: &[ProductTimeEntry], min_threshold: f64, excluded_labels: &[String]) -> Cleaned {
    let mut dropped = DropCounts::default();

    let kept: Vec<ProductTimeEntry> = rows
        .iter()
        .filter(|entry| {
            if !has_label(entry) {
                dropped.missing_label += 1;
                false
            } else if !is_numeric(entry) {
                dropped.not_numeric += 1;
                false
            } else if !meets_threshold(entry, min_threshold) {
                dropped.below_threshold += 1;
                false
            } else if is_excluded(entry, excluded_labels) {
                dropped.excluded_label += 1;
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();

    if dropped.not_numeric > 0 {
        tracing::debug!("Dropped {} product time rows with non-numeric time", dropped.not_numeric);
    }
    tracing::debug!(
        "Cleaned product time: kept {} of {} (missing label {}, below {}s {}, excluded {})",
        kept.len(),
        rows.len(),
        dropped.missing_label,
        min_threshold,
        dropped.below_threshold,
        dropped.excluded_label
    );

    Cleaned { rows: kept, dropped }
}

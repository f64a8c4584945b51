// src/extractors/aggregate.rs
use crate::extractors::models::ProductTimeEntry;

/// Total seconds over cleaned rows, truncated toward zero. Empty input is 0.
pub fn sum_time(cleaned_rows: &[ProductTimeEntry]) -> i64 {
    let total: f64 = cleaned_rows.iter().filter_map(|e| e.time_spent_sec).sum();
    total.trunc() as i64
}

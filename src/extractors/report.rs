// src/extractors/report.rs
use crate::config::{ExtractionConfig, MissingSectionPolicy};
use crate::extractors::aggregate::sum_time;
use crate::extractors::anchor::{find_value, locate};
use crate::extractors::cleaning::{clean, DropCounts};
use crate::extractors::models::{
    BoothVisit, ProductTimeEntry, Relation, ShoppingItem, SummaryMetrics, VisitSequence,
};
use crate::extractors::region::{extract_dynamic, extract_fixed, Required};
use crate::grid::{Cell, Grid};
use crate::utils::error::ExtractError;

// --- Section layout ---
const BOOTH_VISIT_ROWS: usize = 4;

const VISIT_ORDER_SECTION: &str = "visit_order";
const VISIT_ORDER_ANCHOR: &str = "Visit Order of Booths";

const PRODUCT_TIME_SECTION: &str = "product_time";
const PRODUCT_TIME_ANCHOR: &str = "Product";

const SHOPPING_SECTION: &str = "shopping_table";
const SHOPPING_ANCHOR: &str = "Product Name";
const SHOPPING_ROWS: usize = 5;

const TOTAL_ITEMS_KEYWORD: &str = "total items";
const TOTAL_PRICE_KEYWORD: &str = "total price";
const SHOW_LIST_KEYWORD: &str = "show list";

/// Everything extracted from one report grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub booth_visits: Vec<BoothVisit>,
    pub visit_sequence: Option<VisitSequence>,
    /// Uncleaned rows; this is what gets exported.
    pub product_time: Vec<ProductTimeEntry>,
    pub shopping_items: Vec<ShoppingItem>,
    pub summary: SummaryMetrics,
    /// Rows the cleaner removed before the task time was summed.
    pub cleaning: DropCounts,
    /// Sections left empty under `MissingSectionPolicy::Skip`, with the reason.
    pub skipped_sections: Vec<SkippedSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSection {
    pub section: &'static str,
    pub reason: String,
}

/// Assembles a `Report` from a grid. Sections are extracted independently
/// and never cross-checked against each other.
pub struct ReportExtractor {
    config: ExtractionConfig,
}

impl ReportExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn extract(&self, grid: &Grid) -> Result<Report, ExtractError> {
        tracing::info!("Extracting report from {}x{} grid", grid.height(), grid.width());
        let mut skipped = Vec::new();

        // 1. Booth visits (absolute origin, no anchor)
        let booth_visits = extract_booth_visits(grid);
        tracing::info!("Booth visits: {} rows", booth_visits.len());

        // 2. Visit order
        let visit_sequence = self.resolve(extract_visit_sequence(grid), &mut skipped)?;
        if let Some(seq) = &visit_sequence {
            tracing::info!("Visit order: {} steps", seq.len());
            tracing::debug!("Visit path: {}", seq.steps().join(" -> "));
        }

        // 3. Product time (exported uncleaned, cleaned only for the total)
        let product_time = self
            .resolve(extract_product_time(grid), &mut skipped)?
            .unwrap_or_default();
        let cleaned = clean(
            &product_time,
            self.config.min_product_time_sec,
            &self.config.excluded_products,
        );
        let total_task_time_sec = sum_time(&cleaned.rows);
        tracing::info!(
            "Product time: {} rows exported, {} counted ({} dropped), {}s total",
            product_time.len(),
            cleaned.rows.len(),
            cleaned.dropped.total(),
            total_task_time_sec
        );

        // 4. Shopping table
        let shopping_items = self
            .resolve(extract_shopping_items(grid), &mut skipped)?
            .unwrap_or_default();
        tracing::info!("Shopping table: {} rows", shopping_items.len());

        // 5. Summary metrics
        let summary = extract_summary(grid, total_task_time_sec);

        Ok(Report {
            booth_visits,
            visit_sequence,
            product_time,
            shopping_items,
            summary,
            cleaning: cleaned.dropped,
            skipped_sections: skipped,
        })
    }

    /// Applies the missing-section policy to a section result.
    fn resolve<T>(
        &self,
        result: Result<T, ExtractError>,
        skipped: &mut Vec<SkippedSection>,
    ) -> Result<Option<T>, ExtractError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self.config.on_missing_section {
                MissingSectionPolicy::Abort => Err(e),
                MissingSectionPolicy::Skip => {
                    tracing::warn!("Skipping section '{}': {}", e.section(), e);
                    skipped.push(SkippedSection {
                        section: e.section(),
                        reason: e.to_string(),
                    });
                    Ok(None)
                }
            },
        }
    }
}

/// Fixed 4x2 block at the top-left corner; rows missing either field are dropped.
pub fn extract_booth_visits(grid: &Grid) -> Vec<BoothVisit> {
    extract_fixed(grid, 0, 0, BOOTH_VISIT_ROWS, BoothVisit::COLUMNS, Required::AllColumns)
        .rows()
        .iter()
        .map(|row| BoothVisit::from_row(row))
        .collect()
}

/// The sequence lives in column 0 of the row right after its anchor.
pub fn extract_visit_sequence(grid: &Grid) -> Result<VisitSequence, ExtractError> {
    let anchor = locate(grid, VISIT_ORDER_SECTION, VISIT_ORDER_ANCHOR)?;
    let invalid = |reason: String| ExtractError::InvalidSection {
        section: VISIT_ORDER_SECTION,
        reason,
    };

    match grid.get(anchor + 1, 0) {
        Some(Cell::Text(text)) => VisitSequence::parse(text)
            .ok_or_else(|| invalid(format!("row {} has no booth labels", anchor + 1))),
        Some(other) if !other.is_empty() => Err(invalid(format!(
            "row {} holds '{}' instead of a text sequence",
            anchor + 1,
            other
        ))),
        _ => Err(invalid(format!("no sequence below anchor row {}", anchor))),
    }
}

/// Dynamic region after the "Product" anchor, rows without a product removed.
pub fn extract_product_time(grid: &Grid) -> Result<Vec<ProductTimeEntry>, ExtractError> {
    let start = locate(grid, PRODUCT_TIME_SECTION, PRODUCT_TIME_ANCHOR)? + 1;
    let table = extract_dynamic(grid, start, ProductTimeEntry::COLUMNS, Required::FirstColumn);
    if table.is_empty() {
        tracing::debug!("Product time section below row {} is empty", start - 1);
    }
    Ok(table.rows().iter().map(|row| ProductTimeEntry::from_row(row)).collect())
}

/// Fixed 5-row region after the "Product Name" anchor.
pub fn extract_shopping_items(grid: &Grid) -> Result<Vec<ShoppingItem>, ExtractError> {
    let start = locate(grid, SHOPPING_SECTION, SHOPPING_ANCHOR)? + 1;
    let table = extract_fixed(
        grid,
        start,
        0,
        SHOPPING_ROWS,
        ShoppingItem::COLUMNS,
        Required::FirstColumn,
    );
    tracing::debug!("Shopping table {:?}: {} rows kept", table.columns(), table.len());
    Ok(table.rows().iter().map(|row| ShoppingItem::from_row(row)).collect())
}

pub fn extract_summary(grid: &Grid, total_task_time_sec: i64) -> SummaryMetrics {
    let lookup = |keyword: &str| {
        let value = find_value(grid, keyword);
        if value.is_none() {
            tracing::info!("Summary keyword '{}' not found", keyword);
        }
        value
    };

    SummaryMetrics {
        total_items: lookup(TOTAL_ITEMS_KEYWORD),
        total_price: lookup(TOTAL_PRICE_KEYWORD),
        show_list_count: lookup(SHOW_LIST_KEYWORD),
        total_task_time_sec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::grid_of;

    fn sample_grid() -> Grid {
        grid_of(&[
            &["Gaming", "5", "", "", ""],
            &["Fashion", "3", "", "", ""],
            &["Food", "", "", "", ""],
            &["Books", "2", "", "", ""],
            &["", "", "", "", ""],
            &["Visit Order of Booths", "", "", "", ""],
            &["Entrance -> Gaming -> Fashion -> Exit", "", "", "", ""],
            &["", "", "", "", ""],
            &["Product", "Time Spent", "", "", ""],
            &["Phone", "120.7", "", "", ""],
            &["Laptop", "n/a", "", "", ""],
            &["Mouse", "15", "", "", ""],
            &["Total Items", "3", "", "", ""],
            &["Headset", "75", "", "", ""],
            &["", "", "", "", ""],
            &["Product Name", "Total Count", "Unit Price", "Status", "Subtotal"],
            &["Phone", "1", "299.99", "Bought", "299.99"],
            &["", "", "", "", ""],
            &["Headset", "2", "50", "Bought", "100"],
            &["Total Price", "399.99", "", "", ""],
            &["Show List", "4", "", "", ""],
        ])
    }

    #[test]
    fn test_full_report() {
        let report = ReportExtractor::new(ExtractionConfig::default())
            .extract(&sample_grid())
            .unwrap();

        let booths: Vec<String> = report.booth_visits.iter().map(|b| b.booth_type.to_string()).collect();
        assert_eq!(booths, vec!["Gaming", "Fashion", "Books"]);

        assert_eq!(
            report.visit_sequence.as_ref().unwrap().steps(),
            &["Entrance", "Gaming", "Fashion", "Exit"]
        );

        // Exported relation is the uncleaned one
        let products: Vec<String> = report.product_time.iter().map(|e| e.product.to_string()).collect();
        assert_eq!(products, vec!["Phone", "Laptop", "Mouse", "Total Items", "Headset"]);
        assert_eq!(report.product_time[1].time_spent_sec, None);

        // Phone (120.7) + Headset (75)
        assert_eq!(report.summary.total_task_time_sec, 195);
        assert_eq!(report.cleaning.not_numeric, 1);
        // Mouse (15) and the echoed "Total Items" row (3)
        assert_eq!(report.cleaning.below_threshold, 2);
        assert_eq!(report.cleaning.excluded_label, 0);

        let shopping: Vec<String> = report.shopping_items.iter().map(|s| s.product_name.to_string()).collect();
        assert_eq!(shopping, vec!["Phone", "Headset", "Total Price", "Show List"]);

        assert_eq!(report.summary.total_items, Some(Cell::Number(3.0)));
        assert_eq!(report.summary.total_price, Some(Cell::Number(399.99)));
        assert_eq!(report.summary.show_list_count, Some(Cell::Number(4.0)));
        assert!(report.skipped_sections.is_empty());
    }

    #[test]
    fn test_excluded_meta_row_not_counted() {
        let grid = grid_of(&[
            &["Product", ""],
            &["Phone", "100"],
            &["Total Items", "500"],
            &["total price", "700"],
        ]);
        let items = extract_product_time(&grid).unwrap();
        let cleaned = clean(&items, 60.0, &ExtractionConfig::default().excluded_products);
        assert_eq!(sum_time(&cleaned.rows), 100);
        assert_eq!(cleaned.dropped.excluded_label, 2);
    }

    #[test]
    fn test_missing_product_anchor_aborts() {
        let grid = grid_of(&[
            &["Visit Order of Booths", ""],
            &["Entrance -> Exit", ""],
            &["Product Name", ""],
            &["Phone", "1"],
        ]);
        let err = ReportExtractor::new(ExtractionConfig::default())
            .extract(&grid)
            .unwrap_err();
        assert_eq!(
            err,
            ExtractError::AnchorNotFound {
                section: "product_time",
                label: "Product".to_string()
            }
        );
    }

    #[test]
    fn test_missing_anchor_does_not_use_row_zero() {
        // Row 0 would look like a plausible product row if the lookup defaulted
        let grid = grid_of(&[&["Phone", "300"], &["Tablet", "200"]]);
        assert!(matches!(
            extract_product_time(&grid),
            Err(ExtractError::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn test_skip_policy_emits_empty_sections() {
        let grid = grid_of(&[&["Gaming", "5"], &["Total Items", "2"]]);
        let config = ExtractionConfig {
            on_missing_section: MissingSectionPolicy::Skip,
            ..ExtractionConfig::default()
        };
        let report = ReportExtractor::new(config).extract(&grid).unwrap();

        assert!(report.visit_sequence.is_none());
        assert!(report.product_time.is_empty());
        assert!(report.shopping_items.is_empty());
        assert_eq!(report.summary.total_task_time_sec, 0);
        assert_eq!(report.summary.total_items, Some(Cell::Number(2.0)));
        assert_eq!(report.summary.show_list_count, None);

        let sections: Vec<&str> = report.skipped_sections.iter().map(|s| s.section).collect();
        assert_eq!(sections, vec!["visit_order", "product_time", "shopping_table"]);
    }

    #[test]
    fn test_visit_order_must_be_text() {
        let grid = grid_of(&[&["Visit Order of Booths"], &["12"]]);
        assert!(matches!(
            extract_visit_sequence(&grid),
            Err(ExtractError::InvalidSection { section: "visit_order", .. })
        ));

        let trailing = grid_of(&[&["Visit Order of Booths"]]);
        assert!(extract_visit_sequence(&trailing).is_err());
    }

    #[test]
    fn test_empty_product_section_is_not_an_error() {
        let grid = grid_of(&[&["Product", ""], &["", ""], &["Phone", "90"]]);
        assert_eq!(extract_product_time(&grid), Ok(vec![]));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let grid = sample_grid();
        let extractor = ReportExtractor::new(ExtractionConfig::default());
        let first = extractor.extract(&grid).unwrap();
        let second = extractor.extract(&grid).unwrap();
        assert_eq!(first, second);
    }
}

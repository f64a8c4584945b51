// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ExtractionConfig;
use crate::extractors::models::{Relation, VisitStep};
use crate::extractors::report::Report;
use crate::utils::error::StorageError;

const METADATA_FILE: &str = "report_meta.json";

/// Where a report came from, recorded in the metadata file.
#[derive(Debug, Clone)]
pub struct ReportSource {
    pub path: String,
    pub sheet: Option<String>,
    pub rows: usize,
    pub columns: usize,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified output directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the output directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes every relation of the report as its own CSV file.
    pub fn save_report(&self, report: &Report) -> Result<Vec<PathBuf>, StorageError> {
        let visit_rows: Vec<VisitStep<'_>> = report
            .visit_sequence
            .as_ref()
            .map(|seq| seq.rows())
            .unwrap_or_default();

        Ok(vec![
            self.save_relation(&report.booth_visits)?,
            self.save_relation(&report.product_time)?,
            self.save_relation(&report.shopping_items)?,
            self.save_relation(&visit_rows)?,
            self.save_relation(std::slice::from_ref(&report.summary))?,
        ])
    }

    /// Saves one relation to `<base_dir>/<name>.csv`
    pub fn save_relation<R: Relation>(&self, rows: &[R]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.csv", R::NAME));
        let file = fs::File::create(&file_path).map_err(StorageError::IoError)?;

        write_relation(file, rows)?;

        tracing::info!("Saved {} ({} rows) to {}", R::NAME, rows.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves extraction metadata in JSON format
    pub fn save_report_metadata(
        &self,
        report: &Report,
        source: &ReportSource,
        config: &ExtractionConfig,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(METADATA_FILE);

        let skipped: Vec<serde_json::Value> = report
            .skipped_sections
            .iter()
            .map(|s| serde_json::json!({ "section": s.section, "reason": s.reason }))
            .collect();

        let metadata = serde_json::json!({
            "source": source.path,
            "sheet": source.sheet,
            "grid_shape": [source.rows, source.columns],
            "row_counts": {
                "booth_visits": report.booth_visits.len(),
                "visit_order": report.visit_sequence.as_ref().map_or(0, |s| s.len()),
                "product_time": report.product_time.len(),
                "shopping_table": report.shopping_items.len(),
            },
            "product_time_dropped": report.cleaning,
            "skipped_sections": skipped,
            "summary": report.summary,
            "config": config,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

/// Writes `rows` as CSV with a header of the declared columns. The header is
/// written even when there are no rows.
pub fn write_relation<W: Write, R: Relation>(writer: W, rows: &[R]) -> Result<(), StorageError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(R::COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(StorageError::IoError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::models::{BoothVisit, ProductTimeEntry, SummaryMetrics, VisitSequence};
    use crate::extractors::report::ReportExtractor;
    use crate::grid::{grid_of, Cell};

    fn to_csv<R: Relation>(rows: &[R]) -> String {
        let mut buf = Vec::new();
        write_relation(&mut buf, rows).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("booth_report_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_header_matches_declared_columns() {
        let rows = vec![BoothVisit {
            booth_type: Cell::from("Gaming"),
            visit_count: Cell::Number(5.0),
        }];
        assert_eq!(to_csv(&rows), "booth_type,visit_count\nGaming,5\n");
    }

    #[test]
    fn test_empty_relation_still_has_header() {
        let rows: Vec<ProductTimeEntry> = Vec::new();
        assert_eq!(to_csv(&rows), "product,time_spent\n");
    }

    #[test]
    fn test_invalid_time_written_as_empty_field() {
        let rows = vec![
            ProductTimeEntry { product: Cell::from("Phone"), time_spent_sec: Some(120.5) },
            ProductTimeEntry { product: Cell::from("Laptop, 15\""), time_spent_sec: None },
        ];
        assert_eq!(
            to_csv(&rows),
            "product,time_spent\nPhone,120.5\n\"Laptop, 15\"\"\",\n"
        );
    }

    #[test]
    fn test_integral_time_written_without_fraction() {
        let rows = vec![
            ProductTimeEntry { product: Cell::from("Phone"), time_spent_sec: Some(90.0) },
            ProductTimeEntry { product: Cell::Number(1001.0), time_spent_sec: Some(60.0) },
        ];
        assert_eq!(to_csv(&rows), "product,time_spent\nPhone,90\n1001,60\n");
    }

    #[test]
    fn test_summary_single_row() {
        let summary = SummaryMetrics {
            total_items: Some(Cell::Number(3.0)),
            total_price: Some(Cell::from("$12.50")),
            show_list_count: None,
            total_task_time_sec: 195,
        };
        assert_eq!(
            to_csv(std::slice::from_ref(&summary)),
            "total_items,total_price,show_list_count,total_task_time_sec\n3,$12.50,,195\n"
        );
    }

    #[test]
    fn test_visit_order_one_step_per_row() {
        let seq = VisitSequence::parse("Entrance -> Booth1 -> Exit").unwrap();
        assert_eq!(to_csv(&seq.rows()), "visit_sequence\nEntrance\nBooth1\nExit\n");
    }

    #[test]
    fn test_save_report_writes_all_files_identically_twice() {
        let grid = grid_of(&[
            &["Gaming", "5"],
            &["Visit Order of Booths", ""],
            &["Entrance -> Exit", ""],
            &["Product", ""],
            &["Phone", "90"],
            &["", ""],
            &["Product Name", "Total Count"],
            &["Phone", "1"],
            &["Total Items", "1"],
        ]);
        let report = ReportExtractor::new(ExtractionConfig::default()).extract(&grid).unwrap();

        let dir = temp_dir("save_report");
        let storage = StorageManager::new(&dir).unwrap();
        let paths = storage.save_report(&report).unwrap();
        let first: Vec<String> = paths.iter().map(|p| fs::read_to_string(p).unwrap()).collect();

        let again = storage.save_report(&report).unwrap();
        let second: Vec<String> = again.iter().map(|p| fs::read_to_string(p).unwrap()).collect();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "booth_visits.csv",
                "product_time.csv",
                "shopping_table.csv",
                "visit_order.csv",
                "summary_metrics.csv"
            ]
        );
        assert_eq!(first, second);
        assert_eq!(first[4], "total_items,total_price,show_list_count,total_task_time_sec\n1,,,90\n");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_metadata_written_as_json() {
        let grid = grid_of(&[&["Gaming", "5"]]);
        let config = ExtractionConfig {
            on_missing_section: crate::config::MissingSectionPolicy::Skip,
            ..ExtractionConfig::default()
        };
        let report = ReportExtractor::new(config.clone()).extract(&grid).unwrap();

        let dir = temp_dir("metadata");
        let storage = StorageManager::new(&dir).unwrap();
        let source = ReportSource {
            path: "report.xlsx".to_string(),
            sheet: None,
            rows: grid.height(),
            columns: grid.width(),
        };
        let path = storage.save_report_metadata(&report, &source, &config).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["source"], "report.xlsx");
        assert_eq!(json["row_counts"]["booth_visits"], 1);
        assert_eq!(json["skipped_sections"].as_array().unwrap().len(), 3);
        assert_eq!(json["config"]["on_missing_section"], "skip");
        assert_eq!(json["summary"]["total_task_time_sec"], 0);

        let _ = fs::remove_dir_all(&dir);
    }
}

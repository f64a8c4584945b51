// src/main.rs
mod config;
mod extractors;
mod grid;
mod storage;
mod utils;

use clap::Parser;
use config::{ExtractionConfig, MissingSectionPolicy, DEFAULT_MIN_PRODUCT_TIME_SEC};
use extractors::ReportExtractor;
use storage::{ReportSource, StorageManager};
use utils::AppError;

/// Command Line Interface for the booth visit report extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report document to read (.xlsx, .xls, .xlsb, .ods or .csv)
    #[arg(short, long)]
    input: String,

    /// Sheet to read (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Output directory for the extracted tables
    #[arg(short, long, default_value = "./output_data")]
    output_dir: String,

    /// Minimum time in seconds for a product to count toward task time
    #[arg(long, env = "MIN_PRODUCT_TIME_SEC", default_value_t = DEFAULT_MIN_PRODUCT_TIME_SEC)]
    min_product_time: f64,

    /// Product label excluded from task time (repeatable, replaces the defaults)
    #[arg(long = "exclude", value_name = "LABEL")]
    excluded_products: Vec<String>,

    /// Emit sections whose anchor is missing as empty instead of aborting
    #[arg(long)]
    skip_missing_sections: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn extraction_config(&self) -> Result<ExtractionConfig, AppError> {
        if !self.min_product_time.is_finite() || self.min_product_time < 0.0 {
            return Err(AppError::Config(format!(
                "Minimum product time must be a non-negative number, got {}",
                self.min_product_time
            )));
        }

        let mut config = ExtractionConfig {
            min_product_time_sec: self.min_product_time,
            on_missing_section: if self.skip_missing_sections {
                MissingSectionPolicy::Skip
            } else {
                MissingSectionPolicy::Abort
            },
            ..ExtractionConfig::default()
        };
        if !self.excluded_products.is_empty() {
            config = config.with_excluded_products(&self.excluded_products);
        }
        Ok(config)
    }
}

fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);
    tracing::info!("Starting processing for args: {:?}", args);

    let config = args.extraction_config()?;
    tracing::debug!("Extraction config: {:?}", config);

    // 3. Load the report into memory
    let grid = grid::loader::load_grid(&args.input, args.sheet.as_deref())?;

    // 4. Extract all sections
    let extractor = ReportExtractor::new(config);
    let report = match extractor.extract(&grid) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Failed to extract report from {}: {}", args.input, e);
            return Err(e.into());
        }
    };
    tracing::info!("Summary metrics: {:?}", report.summary);

    // 5. Save the relations and metadata
    let storage = StorageManager::new(&args.output_dir)?;
    let paths = storage.save_report(&report)?;

    let source = ReportSource {
        path: args.input.clone(),
        sheet: args.sheet.clone(),
        rows: grid.height(),
        columns: grid.width(),
    };
    storage.save_report_metadata(&report, &source, extractor.config())?;

    if !report.skipped_sections.is_empty() {
        tracing::warn!(
            "{} section(s) were missing and written empty",
            report.skipped_sections.len()
        );
    }
    tracing::info!(
        "Data extracted successfully: {} tables saved in {}",
        paths.len(),
        args.output_dir
    );

    Ok(())
}

// src/config.rs
use serde::Serialize;

/// Product time entries shorter than this are treated as noise.
pub const DEFAULT_MIN_PRODUCT_TIME_SEC: f64 = 60.0;

/// Labels of meta rows that show up inside the product time section.
pub const DEFAULT_EXCLUDED_PRODUCTS: &[&str] = &["product", "total items", "total price"];

/// What the report assembler does when a section's anchor cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSectionPolicy {
    /// Stop the whole run with the anchor error.
    #[default]
    Abort,
    /// Emit the section as empty/absent and carry on with the others.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionConfig {
    pub min_product_time_sec: f64,
    /// Compared lower-cased and trimmed.
    pub excluded_products: Vec<String>,
    pub on_missing_section: MissingSectionPolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_product_time_sec: DEFAULT_MIN_PRODUCT_TIME_SEC,
            excluded_products: DEFAULT_EXCLUDED_PRODUCTS.iter().map(|s| s.to_string()).collect(),
            on_missing_section: MissingSectionPolicy::default(),
        }
    }
}

impl ExtractionConfig {
    /// Replaces the exclusion list, normalising each label the way rows are compared.
    pub fn with_excluded_products<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.excluded_products = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .collect();
        self
    }
}

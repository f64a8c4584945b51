// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error), // Automatically convert calamine errors

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook has no sheets: {0}")]
    NoSheets(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Anchor not found for section '{section}': no row labeled '{label}' in column 0")]
    AnchorNotFound { section: &'static str, label: String },

    #[error("Invalid content in section '{section}': {reason}")]
    InvalidSection { section: &'static str, reason: String },
}

impl ExtractError {
    /// Name of the report section the error belongs to.
    pub fn section(&self) -> &'static str {
        match self {
            ExtractError::AnchorNotFound { section, .. } => section,
            ExtractError::InvalidSection { section, .. } => section,
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Loading report failed: {0}")]
    Load(#[from] LoadError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

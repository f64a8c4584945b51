// src/extractors/mod.rs
pub mod aggregate;
pub mod anchor;
pub mod cleaning;
pub mod models;
pub mod region;
pub mod report;

pub use report::ReportExtractor;

//! Exporter trait and error types

use crate::catalogue::ProductRecord;
use thiserror::Error;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Serializes records into a tabular artifact
///
/// Implementations write a header row with `ProductRecord::COLUMNS` followed by
/// one row per record, with an empty cell for every empty field.
pub trait RecordExporter {
    /// File extension of the produced artifact
    fn extension(&self) -> &'static str;

    /// Renders the full artifact in memory
    fn render(&self, records: &[ProductRecord]) -> ExportResult<Vec<u8>>;
}

//! Result collection and export
//!
//! This module handles:
//! - Merging per-worker record lists into the final, capped dataset
//! - Serializing the dataset to a spreadsheet artifact (XLSX or CSV)

mod csv_export;
mod traits;
mod xlsx_export;

pub use csv_export::CsvExporter;
pub use traits::{ExportError, ExportResult, RecordExporter};
pub use xlsx_export::XlsxExporter;

use crate::catalogue::ProductRecord;
use crate::config::ExportFormat;
use crate::progress::write_atomic;
use std::path::Path;

/// Merges worker outputs into the final dataset
///
/// Lists are concatenated in worker-index order, independent of which worker
/// finished first, and the result is cut to the first `cap` records. This is
/// the only place the cap is strictly enforced.
pub fn collect_records(per_worker: Vec<Vec<ProductRecord>>, cap: usize) -> Vec<ProductRecord> {
    let mut records: Vec<ProductRecord> = per_worker.into_iter().flatten().collect();

    if records.len() > cap {
        tracing::debug!(
            "Dropping {} records collected past the cap of {}",
            records.len() - cap,
            cap
        );
        records.truncate(cap);
    }

    records
}

/// Returns the exporter for a configured format
pub fn exporter_for(format: ExportFormat) -> Box<dyn RecordExporter> {
    match format {
        ExportFormat::Xlsx => Box::new(XlsxExporter),
        ExportFormat::Csv => Box::new(CsvExporter),
    }
}

/// Writes `records` to `path` in the given format
///
/// The artifact replaces any previous file at `path` atomically.
pub fn export_records(
    records: &[ProductRecord],
    path: &Path,
    format: ExportFormat,
) -> ExportResult<()> {
    let exporter = exporter_for(format);
    let content = exporter.render(records)?;
    write_atomic(path, &content)?;

    tracing::info!(
        "Exported {} records to {} ({})",
        records.len(),
        path.display(),
        exporter.extension()
    );
    Ok(())
}

use crate::catalogue::ProductRecord;
use crate::output::traits::{ExportError, ExportResult, RecordExporter};

/// Comma-separated export
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl RecordExporter for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(&self, records: &[ProductRecord]) -> ExportResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        writer.write_record(ProductRecord::COLUMNS)?;
        for record in records {
            writer.write_record(record.values())?;
        }

        writer
            .into_inner()
            .map_err(|e| ExportError::Write(e.to_string()))
    }
}

use crate::catalogue::ProductRecord;
use crate::output::traits::{ExportError, ExportResult, RecordExporter};
use rust_xlsxwriter::{Format, Workbook};

/// Longest string an Excel cell accepts
const MAX_CELL_CHARS: usize = 32_767;

/// Excel workbook export, one worksheet
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxExporter;

impl RecordExporter for XlsxExporter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn render(&self, records: &[ProductRecord]) -> ExportResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Products")?;

        for (col, name) in (0u16..).zip(ProductRecord::COLUMNS) {
            worksheet.write_string_with_format(0, col, name, &header)?;
        }

        for (index, record) in records.iter().enumerate() {
            let row = u32::try_from(index + 1)
                .map_err(|_| ExportError::Write("too many rows for a worksheet".to_string()))?;

            for (col, value) in (0u16..).zip(record.values()) {
                worksheet.write_string(row, col, cell_text(value))?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn cell_text(value: &str) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &value[..end],
        None => value,
    }
}

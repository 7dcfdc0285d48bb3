use std::io::Write;
use std::path::Path;

use crate::PipelineError;
use crate::rank::RankedTable;

/// UTF-8 byte-order mark written ahead of the header so spreadsheet tools pick the encoding.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";
pub const DELIMITER: u8 = b';';

/// Write `table` as `;`-separated UTF-8 text with a BOM and a header row.
pub fn write_report(table: &RankedTable, path: impl AsRef<Path>) -> Result<(), PipelineError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(PipelineError::io(parent))?;
    }
    let file = std::fs::File::create(path).map_err(PipelineError::io(path))?;
    write_report_to(table, file)?;
    tracing::info!(path = %path.display(), rows = table.rows.len(), "report.written");
    Ok(())
}

pub fn write_report_to<W: Write>(table: &RankedTable, mut out: W) -> Result<(), PipelineError> {
    out.write_all(BOM).map_err(csv::Error::from)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(out);
    wtr.write_record(table.schema.headers())?;
    for row in &table.rows {
        wtr.write_record(row.cells(&table.schema))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::report::row::{header, ReportRow};

/// Writes the header on creation, then one record per row.
///
/// Every record must have exactly as many fields as the header; the
/// underlying writer rejects anything else.
pub struct CsvReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl<W: Write> CsvReportWriter<W> {
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(inner);
        writer.write_record(header())?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.write_fields(&row.to_record())
    }

    pub fn write_fields(&mut self, fields: &[String]) -> Result<()> {
        self.writer.write_record(fields)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

/// Create `path` and write the full report to it.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<usize> {
    let file = File::create(path)?;
    let mut writer = CsvReportWriter::new(file)?;
    for row in rows {
        writer.write_row(row)?;
    }
    let written = writer.rows_written();
    writer.finish()?;
    tracing::info!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}

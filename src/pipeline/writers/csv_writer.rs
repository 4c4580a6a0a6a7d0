use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::QuoteStyle;

use crate::data_model::{Dataset, Record, RemovalLog};
use crate::error::{PipelineError, Result};
use crate::pipeline::readers::csv_reader::FIELD_DELIMITER;
use crate::pipeline::writers::BaseWriter;

/// Name of the provenance column appended to persisted removal logs.
pub const REMOVED_BY_COLUMN: &str = "removed_by";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `|`-delimited UTF-8 with a byte-order mark, quoting every field.
pub struct CsvWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Self::from_writer(BufWriter::new(file))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn from_writer(mut inner: W) -> Result<Self> {
        inner.write_all(UTF8_BOM)?;
        let writer = csv::WriterBuilder::new()
            .delimiter(FIELD_DELIMITER)
            .quote_style(QuoteStyle::Always)
            .from_writer(inner);
        Ok(CsvWriter { writer })
    }

    fn write_row(&mut self, record: &Record, width: usize, extra: Option<&str>) -> Result<()> {
        let cells = (0..width).map(|i| record.get(i).unwrap_or("")).chain(extra);
        self.writer.write_record(cells)?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| PipelineError::IoError {
            source: std::io::Error::new(e.error().kind(), e.error().to_string()),
        })
    }
}

impl<W: Write> BaseWriter for CsvWriter<W> {
    fn write_dataset(&mut self, dataset: &Dataset) -> Result<()> {
        let width = dataset.columns().len();
        self.writer.write_record(dataset.columns())?;
        for record in dataset.rows() {
            self.write_row(record, width, None)?;
        }
        Ok(())
    }

    fn write_removal_log(&mut self, log: &RemovalLog) -> Result<()> {
        let width = log.columns().len();
        self.writer.write_record(
            log.columns()
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(REMOVED_BY_COLUMN)),
        )?;
        for entry in log.entries() {
            self.write_row(&entry.record, width, Some(entry.stage.as_str()))?;
        }
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

//! CSV output of statistics records

use csv::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use super::{OutputError, OutputResult, OutputWriter, StatisticsWriter};
use crate::statistics::{StatisticRecord, StatisticsField};

const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Writes the selected columns of each record, header first
pub struct StatisticsCsvWriter<W: Write> {
    writer: Writer<W>,
    fields: Vec<StatisticsField>,
    header_written: bool,
    records_written: u64,
}

impl StatisticsCsvWriter<BufWriter<File>> {
    /// Create a writer for `path`, creating parent directories
    pub fn create<P: AsRef<Path>>(path: P, fields: Vec<StatisticsField>) -> OutputResult<Self> {
        let path = path.as_ref();
        info!("Creating CSV writer: path={}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = File::create(path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {e}")))?;

        Ok(Self::new(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file), fields))
    }
}

impl<W: Write> StatisticsCsvWriter<W> {
    /// Wrap any byte sink
    pub fn new(inner: W, fields: Vec<StatisticsField>) -> Self {
        Self {
            writer: Writer::from_writer(inner),
            fields,
            header_written: false,
            records_written: 0,
        }
    }

    /// Number of records written so far
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    fn write_header(&mut self) -> OutputResult<()> {
        if self.header_written {
            return Ok(());
        }
        self.writer
            .write_record(self.fields.iter().map(|f| f.as_str()))
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;
        self.header_written = true;
        Ok(())
    }

    /// Finish writing and hand back the sink
    pub fn into_inner(mut self) -> OutputResult<W> {
        self.write_header()?;
        self.writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get inner writer: {e}")))
    }
}

impl<W: Write> StatisticsWriter for StatisticsCsvWriter<W> {
    fn write_record(&mut self, record: &StatisticRecord) -> OutputResult<()> {
        self.write_header()?;

        let row: Vec<String> = self.fields.iter().map(|f| record.field_value(*f)).collect();
        self.writer
            .write_record(&row)
            .map_err(|e| OutputError::CsvError(format!("Failed to write record: {e}")))?;

        self.records_written += 1;
        Ok(())
    }
}

impl<W: Write> OutputWriter for StatisticsCsvWriter<W> {
    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("Failed to flush: {e}")))
    }

    fn close(mut self) -> OutputResult<()> {
        self.write_header()?;
        self.flush()?;
        debug!("CSV writer closed: {} records written", self.records_written);
        Ok(())
    }
}

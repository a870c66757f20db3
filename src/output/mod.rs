//! Writers for exported statistics

use crate::statistics::StatisticRecord;

pub mod csv;

pub use self::csv::StatisticsCsvWriter;

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    FlushError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Generic output writer
pub trait OutputWriter {
    /// Flush any buffered data
    fn flush(&mut self) -> OutputResult<()>;

    /// Close the writer and finalize output
    fn close(self) -> OutputResult<()>;
}

/// Sink for decoded statistics rows
pub trait StatisticsWriter: OutputWriter {
    /// Write a single record
    fn write_record(&mut self, record: &StatisticRecord) -> OutputResult<()>;

    /// Write multiple records at once
    fn write_records(&mut self, records: &[StatisticRecord]) -> OutputResult<()> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }
}

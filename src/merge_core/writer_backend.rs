//! Writer backend trait for the merged report
//!
//! Defines the interface for delivering the sorted output rows to a
//! destination table.

use super::formatter::OutputRow;
use async_trait::async_trait;

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Csv(csv::Error),
    Database(String),
    InvalidDestination(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err)
    }
}

impl From<csv::Error> for SinkError {
    fn from(err: csv::Error) -> Self {
        SinkError::Csv(err)
    }
}

impl From<rusqlite::Error> for SinkError {
    fn from(err: rusqlite::Error) -> Self {
        SinkError::Database(err.to_string())
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "IO error: {}", e),
            SinkError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SinkError::Csv(e) => write!(f, "CSV error: {}", e),
            SinkError::Database(e) => write!(f, "Database error: {}", e),
            SinkError::InvalidDestination(e) => write!(f, "Invalid destination: {}", e),
        }
    }
}

impl std::error::Error for SinkError {}

/// Backend trait for writing the merged report
#[async_trait]
pub trait ReportSinkBackend: Send {
    /// Emit the fixed header row. Called once per run, before any rows.
    async fn write_header(&mut self) -> Result<(), SinkError>;

    /// Append already-sorted rows after any existing content
    async fn append_rows(&mut self, rows: &[OutputRow]) -> Result<(), SinkError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), SinkError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}

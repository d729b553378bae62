//! Unified writer interface for the merged report
//!
//! Routes writes to the CSV, JSONL or SQLite backend based on configuration.

use super::csv_writer::CsvReportWriter;
use super::formatter::OutputRow;
use super::jsonl_writer::JsonlReportWriter;
use super::sqlite_writer::SqliteReportWriter;
use super::writer_backend::{ReportSinkBackend, SinkError};
use crate::config::BackendType;
use std::path::Path;

pub enum ReportWriter {
    Csv(CsvReportWriter),
    Jsonl(JsonlReportWriter),
    Sqlite(SqliteReportWriter),
}

impl ReportWriter {
    /// `table_name` only applies to the SQLite backend
    pub fn new(
        backend: BackendType,
        output_path: impl AsRef<Path>,
        table_name: &str,
    ) -> Result<Self, SinkError> {
        match backend {
            BackendType::Csv => Ok(ReportWriter::Csv(CsvReportWriter::new(output_path)?)),
            BackendType::Jsonl => Ok(ReportWriter::Jsonl(JsonlReportWriter::new(output_path)?)),
            BackendType::Sqlite => Ok(ReportWriter::Sqlite(SqliteReportWriter::new(
                output_path,
                table_name,
            )?)),
        }
    }

    fn backend_ref(&self) -> &dyn ReportSinkBackend {
        match self {
            ReportWriter::Csv(w) => w,
            ReportWriter::Jsonl(w) => w,
            ReportWriter::Sqlite(w) => w,
        }
    }

    fn backend(&mut self) -> &mut dyn ReportSinkBackend {
        match self {
            ReportWriter::Csv(w) => w,
            ReportWriter::Jsonl(w) => w,
            ReportWriter::Sqlite(w) => w,
        }
    }

    pub async fn write_header(&mut self) -> Result<(), SinkError> {
        self.backend().write_header().await
    }

    pub async fn append_rows(&mut self, rows: &[OutputRow]) -> Result<(), SinkError> {
        self.backend().append_rows(rows).await
    }

    pub async fn flush(&mut self) -> Result<(), SinkError> {
        self.backend().flush().await
    }

    pub fn backend_type(&self) -> &'static str {
        self.backend_ref().backend_type()
    }
}

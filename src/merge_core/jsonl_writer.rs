//! JSONL writer for the merged report - one object per row, keyed by header name

use super::formatter::OutputRow;
use super::writer_backend::{ReportSinkBackend, SinkError};
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JsonlReportWriter {
    file: BufWriter<File>,
}

impl JsonlReportWriter {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        log::info!("📝 Writing merged report to: {}", path.display());

        Ok(Self {
            file: BufWriter::new(file),
        })
    }

    pub fn write_row(&mut self, row: &OutputRow) -> Result<(), SinkError> {
        let json = serde_json::to_string(row)?;
        writeln!(self.file, "{}", json)?;
        Ok(())
    }
}

impl Drop for JsonlReportWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}

#[async_trait]
impl ReportSinkBackend for JsonlReportWriter {
    async fn write_header(&mut self) -> Result<(), SinkError> {
        // Every object already carries the header names as keys
        Ok(())
    }

    async fn append_rows(&mut self, rows: &[OutputRow]) -> Result<(), SinkError> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.file.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

//! CSV writer for the merged report
//!
//! Appends to a single table file. The header goes in only when the file
//! starts out empty, so repeated runs extend the same table.

use super::formatter::{OutputRow, OUTPUT_HEADER};
use super::writer_backend::{ReportSinkBackend, SinkError};
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::path::Path;

pub struct CsvReportWriter {
    writer: csv::Writer<File>,
    needs_header: bool,
}

impl CsvReportWriter {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        let needs_header = file.metadata()?.len() == 0;

        if needs_header {
            log::info!("📄 Creating report table: {}", path.display());
        } else {
            log::info!("📄 Appending to existing report table: {}", path.display());
        }

        Ok(Self {
            writer: csv::WriterBuilder::new().from_writer(file),
            needs_header,
        })
    }
}

#[async_trait]
impl ReportSinkBackend for CsvReportWriter {
    async fn write_header(&mut self) -> Result<(), SinkError> {
        if self.needs_header {
            self.writer.write_record(OUTPUT_HEADER)?;
            self.needs_header = false;
        }
        Ok(())
    }

    async fn append_rows(&mut self, rows: &[OutputRow]) -> Result<(), SinkError> {
        for row in rows {
            self.writer.write_record(row.cells())?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_row(date: &str, campaign: &str, cost: f64) -> OutputRow {
        OutputRow {
            date: date.to_string(),
            campaign_name: campaign.to_string(),
            get_estimate: 2,
            whatsapp_button_click: 0,
            begin_booking: 1,
            submit_booking: 0,
            clicks: 10,
            conversions: 1.0,
            impressions: 100,
            ctr: 1.0,
            avg_cpc: 0.5,
            cost,
        }
    }

    #[tokio::test]
    async fn test_csv_header_then_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("report.csv");
        let mut writer = CsvReportWriter::new(&path).unwrap();

        writer.write_header().await.unwrap();
        writer
            .append_rows(&[create_test_row("20240101", "Brand, Search", 5.0)])
            .await
            .unwrap();
        writer.flush().await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "Date,Campaign Name,Get Estimate,Whatsapp Button Click,Begin Booking,Submit Booking,Clicks,Conversions,Impressions,CTR,Avg CPC,Cost"
        );
        assert_eq!(lines[1], "20240101,\"Brand, Search\",2,0,1,0,10,1,100,1,0.5,5");
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_csv_header_written_once_across_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");

        for day in ["20240101", "20240102"] {
            let mut writer = CsvReportWriter::new(&path).unwrap();
            writer.write_header().await.unwrap();
            writer
                .append_rows(&[create_test_row(day, "C1", 3.25)])
                .await
                .unwrap();
            writer.flush().await.unwrap();
        }

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), OUTPUT_HEADER.len());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], "20240101");
        assert_eq!(&records[1][0], "20240102");
        assert_eq!(&records[1][11], "3.25");
    }
}

//! Merge Core - Conversion / Performance Report Merge
//!
//! Combines the conversion-type report and the campaign performance report
//! into one row per (date, campaign), with conversion categories pivoted
//! into fixed columns and performance metrics summed.
//!
//! # Architecture
//!
//! ```text
//! ReportSource (conversions) ──┐
//!                              ├─→ aggregate → AccumulatorTable
//! ReportSource (performance) ──┘        ↓
//!                              format (sort by date, campaign)
//!                                       ↓
//!                   ReportWriter → CSV, JSONL or SQLite backend
//! ```

pub mod accumulator;
pub mod category;
pub mod csv_writer;
pub mod formatter;
pub mod jsonl_writer;
pub mod records;
pub mod source;
pub mod sqlite_writer;
pub mod writer;
pub mod writer_backend;

pub use accumulator::{aggregate, AccumulatorTable, MergeError, MergeKey, MergeStats, MergedRecord};
pub use category::ConversionCategory;
pub use csv_writer::CsvReportWriter;
pub use formatter::{format, OutputRow, OUTPUT_HEADER};
pub use jsonl_writer::JsonlReportWriter;
pub use records::{
    ConversionEvent, MetricOverflowError, MetricParseError, MetricRow, ParsedMetrics, ReportRow,
};
pub use source::{ReportFormat, ReportSource, SourceError};
pub use sqlite_writer::SqliteReportWriter;
pub use writer::ReportWriter;
pub use writer_backend::{ReportSinkBackend, SinkError};

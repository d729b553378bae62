//! One end-to-end merge run: load, aggregate, format, write

use crate::config::MergeConfig;
use crate::merge_core::{
    aggregate, format, MergeError, ReportSource, ReportWriter, SinkError, SourceError,
};

#[derive(Debug)]
pub enum RunError {
    Source(SourceError),
    Merge(MergeError),
    Sink(SinkError),
}

impl From<SourceError> for RunError {
    fn from(err: SourceError) -> Self {
        RunError::Source(err)
    }
}

impl From<MergeError> for RunError {
    fn from(err: MergeError) -> Self {
        RunError::Merge(err)
    }
}

impl From<SinkError> for RunError {
    fn from(err: SinkError) -> Self {
        RunError::Sink(err)
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Source(e) => write!(f, "Report source error: {}", e),
            RunError::Merge(e) => write!(f, "Merge error: {}", e),
            RunError::Sink(e) => write!(f, "Report sink error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub conversion_rows: usize,
    pub metric_rows: usize,
    pub unknown_category_rows: usize,
    pub rows_written: usize,
}

fn open_source(config: &MergeConfig, path: &std::path::Path) -> Result<ReportSource, SourceError> {
    let source = ReportSource::new(path)?;
    if config.apply_date_filter {
        Ok(source.with_date_range(config.date_range.clone()))
    } else {
        Ok(source)
    }
}

/// Everything is read and merged before the destination is opened, so a
/// failed run leaves the destination untouched.
pub async fn run_report(config: &MergeConfig) -> Result<RunSummary, RunError> {
    let conversions = open_source(config, &config.conversions_path)?.read_conversions()?;
    let metrics = open_source(config, &config.performance_path)?.read_metrics()?;

    let table = aggregate(&conversions, &metrics)?;
    let rows = format(&table);
    let stats = table.stats();

    if stats.unknown_category_rows > 0 {
        log::warn!(
            "⚠️  {} conversion rows had an unknown category and were not counted",
            stats.unknown_category_rows
        );
    }

    let mut writer = ReportWriter::new(config.backend, &config.output_path, &config.table_name)?;
    log::info!("📊 Backend: {}", writer.backend_type());

    writer.write_header().await?;
    writer.append_rows(&rows).await?;
    writer.flush().await?;

    let summary = RunSummary {
        conversion_rows: stats.conversion_rows,
        metric_rows: stats.metric_rows,
        unknown_category_rows: stats.unknown_category_rows,
        rows_written: rows.len(),
    };

    log::info!(
        "✅ Wrote {} merged rows ({} conversion rows, {} performance rows) to {}",
        summary.rows_written,
        summary.conversion_rows,
        summary.metric_rows,
        config.output_path.display()
    );

    Ok(summary)
}

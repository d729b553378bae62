//! Report export loading (JSONL or CSV) for both input streams

use super::category::ConversionCategory;
use super::records::{ConversionEvent, MetricRow, ReportRow};
use crate::config::ReportDateRange;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SourceError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, line: usize, message: String },
    UnsupportedFormat(PathBuf),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io { path, source } => {
                write!(f, "IO error reading {}: {}", path.display(), source)
            }
            SourceError::Parse { path, line, message } => {
                write!(f, "Parse error in {} line {}: {}", path.display(), line, message)
            }
            SourceError::UnsupportedFormat(path) => write!(
                f,
                "Unsupported report format for {} (expected .jsonl, .json or .csv)",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Jsonl,
    Csv,
}

impl ReportFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jsonl" | "json" => Some(ReportFormat::Jsonl),
            "csv" => Some(ReportFormat::Csv),
            _ => None,
        }
    }
}

/// One report export on disk
pub struct ReportSource {
    path: PathBuf,
    format: ReportFormat,
    date_range: Option<ReportDateRange>,
}

impl ReportSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, SourceError> {
        let path = path.into();
        let format =
            ReportFormat::from_path(&path).ok_or_else(|| SourceError::UnsupportedFormat(path.clone()))?;

        Ok(Self {
            path,
            format,
            date_range: None,
        })
    }

    /// Only keep rows dated inside `range`
    pub fn with_date_range(mut self, range: ReportDateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Conversion rows, with report labels mapped to canonical tags.
    /// Labels that match no category are left untouched.
    pub fn read_conversions(&self) -> Result<Vec<ConversionEvent>, SourceError> {
        let mut events: Vec<ConversionEvent> = self.read_rows()?;

        for event in events.iter_mut() {
            if let Some(category) = ConversionCategory::from_report_label(&event.category) {
                event.category = category.as_tag().to_string();
            }
        }

        log::info!(
            "📥 Loaded {} conversion rows from {}",
            events.len(),
            self.path.display()
        );
        Ok(events)
    }

    pub fn read_metrics(&self) -> Result<Vec<MetricRow>, SourceError> {
        let rows: Vec<MetricRow> = self.read_rows()?;
        log::info!(
            "📥 Loaded {} performance rows from {}",
            rows.len(),
            self.path.display()
        );
        Ok(rows)
    }

    fn read_rows<T: ReportRow>(&self) -> Result<Vec<T>, SourceError> {
        let rows: Vec<T> = match self.format {
            ReportFormat::Jsonl => self.read_jsonl()?,
            ReportFormat::Csv => self.read_csv()?,
        };

        let Some(range) = &self.date_range else {
            return Ok(rows);
        };

        let total = rows.len();
        let kept: Vec<T> = rows.into_iter().filter(|r| range.contains(r.date())).collect();
        if kept.len() < total {
            log::debug!(
                "Skipped {} rows outside {}..{} in {}",
                total - kept.len(),
                range.start,
                range.end,
                self.path.display()
            );
        }
        Ok(kept)
    }

    fn io_error(&self, source: std::io::Error) -> SourceError {
        SourceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_jsonl<T: ReportRow>(&self) -> Result<Vec<T>, SourceError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let reader = BufReader::new(file);
        let mut rows = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }

            let row = T::from_jsonl(&line).map_err(|e| SourceError::Parse {
                path: self.path.clone(),
                line: idx + 1,
                message: e.to_string(),
            })?;
            rows.push(row);
        }

        Ok(rows)
    }

    fn read_csv<T: ReportRow>(&self) -> Result<Vec<T>, SourceError> {
        let file = File::open(&self.path).map_err(|e| self.io_error(e))?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        let mut rows = Vec::new();

        for result in reader.deserialize::<T>() {
            let row = result.map_err(|e| {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                SourceError::Parse {
                    path: self.path.clone(),
                    line,
                    message: e.to_string(),
                }
            })?;
            rows.push(row);
        }

        Ok(rows)
    }
}

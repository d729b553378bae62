//! Run configuration from environment variables and command line

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::env;
use std::path::PathBuf;

const REPORT_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Csv,
    Jsonl,
    Sqlite,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Csv => "csv",
            BackendType::Jsonl => "jsonl",
            BackendType::Sqlite => "sqlite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(BackendType::Csv),
            "jsonl" => Some(BackendType::Jsonl),
            "sqlite" => Some(BackendType::Sqlite),
            _ => None,
        }
    }

    fn default_output_path(&self) -> &'static str {
        match self {
            BackendType::Csv => "output/campaign_report.csv",
            BackendType::Jsonl => "output/campaign_report.jsonl",
            BackendType::Sqlite => "data/adflow.db",
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Inclusive report window in fixed-width `yyyyMMdd` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDateRange {
    pub start: String,
    pub end: String,
}

impl ReportDateRange {
    /// The previous UTC calendar day, used as both start and end
    pub fn yesterday(now: DateTime<Utc>) -> Self {
        let day = (now - Duration::days(1))
            .format(REPORT_DATE_FORMAT)
            .to_string();
        Self {
            start: day.clone(),
            end: day,
        }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ConfigError> {
        let start_date = parse_report_date(start)?;
        let end_date = parse_report_date(end)?;

        if start_date > end_date {
            return Err(ConfigError::InvalidValue(format!(
                "report start date {} is after end date {}",
                start, end
            )));
        }

        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Fixed-width dates compare chronologically as strings
    pub fn contains(&self, date: &str) -> bool {
        date.len() == self.start.len()
            && self.start.as_str() <= date
            && date <= self.end.as_str()
    }
}

fn parse_report_date(s: &str) -> Result<NaiveDate, ConfigError> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidValue(format!(
            "report date {:?} must be 8 digits (yyyyMMdd)",
            s
        )));
    }

    NaiveDate::parse_from_str(s, REPORT_DATE_FORMAT)
        .map_err(|e| ConfigError::InvalidValue(format!("report date {:?}: {}", s, e)))
}

/// Configuration for one merge run
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Conversion-type report export (JSONL or CSV)
    pub conversions_path: PathBuf,

    /// Campaign performance report export (JSONL or CSV)
    pub performance_path: PathBuf,

    pub backend: BackendType,

    /// Output file, or database file for the SQLite backend
    pub output_path: PathBuf,

    /// Destination table inside the SQLite database
    pub table_name: String,

    pub date_range: ReportDateRange,

    /// Drop report rows dated outside `date_range` while loading
    pub apply_date_filter: bool,
}

impl MergeConfig {
    /// Load configuration from the process environment and arguments
    ///
    /// Environment variables:
    /// - `CONVERSIONS_REPORT_PATH` (default: reports/conversions.jsonl)
    /// - `PERFORMANCE_REPORT_PATH` (default: reports/performance.jsonl)
    /// - `REPORT_OUTPUT_PATH` (default depends on backend)
    /// - `REPORT_TABLE_NAME` (default: Main)
    /// - `REPORT_START_DATE` / `REPORT_END_DATE` (default: yesterday, UTC)
    /// - `REPORT_APPLY_DATE_FILTER` (default: true)
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        Self::from_env_and_args(&args, Utc::now())
    }

    pub fn from_env_and_args(args: &[String], now: DateTime<Utc>) -> Result<Self, ConfigError> {
        let backend = parse_backend_from_args(args)?;

        let output_path = env::var("REPORT_OUTPUT_PATH")
            .unwrap_or_else(|_| backend.default_output_path().to_string());

        let default_range = ReportDateRange::yesterday(now);
        let start = env::var("REPORT_START_DATE").ok();
        let end = env::var("REPORT_END_DATE").ok();
        let date_range = match (start, end) {
            (None, None) => default_range,
            (Some(start), None) => ReportDateRange::parse(&start, &start)?,
            (None, Some(end)) => ReportDateRange::parse(&end, &end)?,
            (Some(start), Some(end)) => ReportDateRange::parse(&start, &end)?,
        };

        let apply_date_filter = match env::var("REPORT_APPLY_DATE_FILTER") {
            Ok(value) => value.to_lowercase().parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(format!(
                    "REPORT_APPLY_DATE_FILTER must be true or false, got {:?}",
                    value
                ))
            })?,
            Err(_) => true,
        };

        let config = Self {
            conversions_path: env::var("CONVERSIONS_REPORT_PATH")
                .unwrap_or_else(|_| "reports/conversions.jsonl".to_string())
                .into(),
            performance_path: env::var("PERFORMANCE_REPORT_PATH")
                .unwrap_or_else(|_| "reports/performance.jsonl".to_string())
                .into(),
            backend,
            output_path: output_path.into(),
            table_name: env::var("REPORT_TABLE_NAME").unwrap_or_else(|_| "Main".to_string()),
            date_range,
            apply_date_filter,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "REPORT_TABLE_NAME cannot be empty".to_string(),
            ));
        }

        if self.conversions_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingVariable("CONVERSIONS_REPORT_PATH".to_string()));
        }

        if self.performance_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingVariable("PERFORMANCE_REPORT_PATH".to_string()));
        }

        Ok(())
    }
}

/// `--backend csv|jsonl|sqlite`, CSV when absent
pub fn parse_backend_from_args(args: &[String]) -> Result<BackendType, ConfigError> {
    match args.iter().position(|x| x == "--backend") {
        Some(idx) => {
            let value = args.get(idx + 1).map(|s| s.as_str()).unwrap_or("");
            BackendType::from_str(value).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "--backend must be one of csv, jsonl, sqlite; got {:?}",
                    value
                ))
            })
        }
        None => Ok(BackendType::Csv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ENV_VARS: [&str; 7] = [
        "CONVERSIONS_REPORT_PATH",
        "PERFORMANCE_REPORT_PATH",
        "REPORT_OUTPUT_PATH",
        "REPORT_TABLE_NAME",
        "REPORT_START_DATE",
        "REPORT_END_DATE",
        "REPORT_APPLY_DATE_FILTER",
    ];

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap()
    }

    #[test]
    fn test_yesterday_crosses_month_boundary() {
        let range = ReportDateRange::yesterday(fixed_now());
        assert_eq!(range.start, "20240229");
        assert_eq!(range.end, "20240229");
    }

    #[test]
    fn test_date_range_parse_and_contains() {
        let range = ReportDateRange::parse("20240101", "20240131").unwrap();
        assert!(range.contains("20240101"));
        assert!(range.contains("20240115"));
        assert!(range.contains("20240131"));
        assert!(!range.contains("20240201"));
        assert!(!range.contains("2024011"));
    }

    #[test]
    fn test_date_range_rejects_bad_input() {
        assert!(ReportDateRange::parse("2024-01-01", "20240101").is_err());
        assert!(ReportDateRange::parse("20240230", "20240301").is_err());
        assert!(ReportDateRange::parse("20240105", "20240101").is_err());
    }

    #[test]
    fn test_parse_backend_from_args() {
        assert_eq!(parse_backend_from_args(&args(&["merge_report"])).unwrap(), BackendType::Csv);
        assert_eq!(
            parse_backend_from_args(&args(&["merge_report", "--backend", "sqlite"])).unwrap(),
            BackendType::Sqlite
        );
        assert_eq!(
            parse_backend_from_args(&args(&["merge_report", "--backend", "jsonl"])).unwrap(),
            BackendType::Jsonl
        );
        assert!(parse_backend_from_args(&args(&["merge_report", "--backend"])).is_err());
        assert!(parse_backend_from_args(&args(&["merge_report", "--backend", "sheets"])).is_err());
    }

    // Env-var cases run in one test so they cannot race each other
    #[test]
    fn test_config_from_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }

        let config = MergeConfig::from_env_and_args(&args(&["merge_report"]), fixed_now()).unwrap();
        assert_eq!(config.conversions_path, PathBuf::from("reports/conversions.jsonl"));
        assert_eq!(config.performance_path, PathBuf::from("reports/performance.jsonl"));
        assert_eq!(config.backend, BackendType::Csv);
        assert_eq!(config.output_path, PathBuf::from("output/campaign_report.csv"));
        assert_eq!(config.table_name, "Main");
        assert_eq!(config.date_range, ReportDateRange::parse("20240229", "20240229").unwrap());
        assert!(config.apply_date_filter);

        let sqlite = MergeConfig::from_env_and_args(
            &args(&["merge_report", "--backend", "sqlite"]),
            fixed_now(),
        )
        .unwrap();
        assert_eq!(sqlite.output_path, PathBuf::from("data/adflow.db"));

        env::set_var("REPORT_START_DATE", "20240101");
        env::set_var("REPORT_END_DATE", "20240107");
        env::set_var("REPORT_TABLE_NAME", "Weekly");
        env::set_var("REPORT_APPLY_DATE_FILTER", "FALSE");
        env::set_var("REPORT_OUTPUT_PATH", "/tmp/weekly.csv");

        let custom = MergeConfig::from_env_and_args(&args(&["merge_report"]), fixed_now()).unwrap();
        assert_eq!(custom.date_range.start, "20240101");
        assert_eq!(custom.date_range.end, "20240107");
        assert_eq!(custom.table_name, "Weekly");
        assert!(!custom.apply_date_filter);
        assert_eq!(custom.output_path, PathBuf::from("/tmp/weekly.csv"));

        env::set_var("REPORT_END_DATE", "not-a-date");
        assert!(MergeConfig::from_env_and_args(&args(&["merge_report"]), fixed_now()).is_err());

        for var in ENV_VARS {
            env::remove_var(var);
        }
    }
}

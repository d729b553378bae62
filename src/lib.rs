pub mod config;
pub mod merge_core;
pub mod run;
pub mod sqlite_pragma;

pub use config::{BackendType, ConfigError, MergeConfig, ReportDateRange};
pub use run::{run_report, RunError, RunSummary};

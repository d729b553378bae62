//! Merge Report Binary - Campaign Conversion / Performance Merge
//!
//! Reads the conversion-type report and the campaign performance report,
//! merges them per (date, campaign) and appends the sorted rows to the
//! destination table.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin merge_report -- --backend sqlite
//! ```
//!
//! ## Environment Variables
//!
//! - CONVERSIONS_REPORT_PATH - Conversion report export, .jsonl or .csv (default: reports/conversions.jsonl)
//! - PERFORMANCE_REPORT_PATH - Performance report export, .jsonl or .csv (default: reports/performance.jsonl)
//! - REPORT_OUTPUT_PATH - Output file or SQLite database (default depends on --backend)
//! - REPORT_TABLE_NAME - SQLite destination table (default: Main)
//! - REPORT_START_DATE / REPORT_END_DATE - yyyyMMdd window (default: yesterday, UTC)
//! - REPORT_APPLY_DATE_FILTER - Drop rows outside the window (default: true)
//! - RUST_LOG - Logging level (optional, default: info)

use adflow::{run_report, MergeConfig};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = match MergeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    log::info!("🚀 Starting campaign report merge");
    log::info!("   Conversions report: {}", config.conversions_path.display());
    log::info!("   Performance report: {}", config.performance_path.display());
    log::info!("   Output: {} ({})", config.output_path.display(), config.backend.as_str());
    if config.apply_date_filter {
        log::info!(
            "   Date range: {}..{}",
            config.date_range.start,
            config.date_range.end
        );
    } else {
        log::info!("   Date range: unfiltered");
    }

    if let Err(e) = run_report(&config).await {
        log::error!("❌ Merge failed: {}", e);
        std::process::exit(1);
    }
}

//! SQLite writer for the merged report
//!
//! The destination table is named by configuration and created on first use.
//! Rows are buffered and inserted in one transaction on flush.

use super::formatter::{OutputRow, OUTPUT_COLUMNS, OUTPUT_HEADER};
use super::writer_backend::{ReportSinkBackend, SinkError};
use crate::sqlite_pragma::apply_optimized_pragmas;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;

const COLUMN_TYPES: [&str; OUTPUT_COLUMNS] = [
    "TEXT NOT NULL",
    "TEXT NOT NULL",
    "INTEGER NOT NULL",
    "INTEGER NOT NULL",
    "INTEGER NOT NULL",
    "INTEGER NOT NULL",
    "INTEGER NOT NULL",
    "REAL NOT NULL",
    "INTEGER NOT NULL",
    "REAL NOT NULL",
    "REAL NOT NULL",
    "REAL NOT NULL",
];

pub struct SqliteReportWriter {
    conn: Connection,
    table_name: String,
    batch: Vec<OutputRow>,
}

/// Plain identifiers only, since the name is spliced into DDL
fn validate_table_name(name: &str) -> Result<(), SinkError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SinkError::InvalidDestination(format!(
            "table name {:?} must be letters, digits and underscores",
            name
        )))
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl SqliteReportWriter {
    pub fn new(db_path: impl AsRef<Path>, table_name: &str) -> Result<Self, SinkError> {
        validate_table_name(table_name)?;

        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SinkError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create database directory {}: {}", parent.display(), e),
                ))
            })?;
        }

        let conn = Connection::open(db_path.as_ref())?;
        apply_optimized_pragmas(&conn)?;

        let columns: Vec<String> = OUTPUT_HEADER
            .iter()
            .zip(COLUMN_TYPES.iter())
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty))
            .collect();

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    {}
                )",
                quote_ident(table_name),
                columns.join(",\n                    ")
            ),
            [],
        )?;

        log::info!(
            "✅ SQLite report table {} ready in {}",
            table_name,
            db_path.as_ref().display()
        );

        Ok(Self {
            conn,
            table_name: table_name.to_string(),
            batch: Vec::new(),
        })
    }

    fn flush_batch(&mut self) -> Result<(), SinkError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let column_list: Vec<String> = OUTPUT_HEADER.iter().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=OUTPUT_COLUMNS).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table_name),
            column_list.join(", "),
            placeholders.join(", ")
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in &self.batch {
                stmt.execute(params![
                    row.date,
                    row.campaign_name,
                    row.get_estimate as i64,
                    row.whatsapp_button_click as i64,
                    row.begin_booking as i64,
                    row.submit_booking as i64,
                    row.clicks,
                    row.conversions,
                    row.impressions,
                    row.ctr,
                    row.avg_cpc,
                    row.cost,
                ])?;
            }
        }
        tx.commit()?;

        log::debug!("✅ Flushed {} report rows to SQLite", self.batch.len());
        self.batch.clear();

        Ok(())
    }
}

#[async_trait]
impl ReportSinkBackend for SqliteReportWriter {
    async fn write_header(&mut self) -> Result<(), SinkError> {
        // Column names are the header; the table already exists
        Ok(())
    }

    async fn append_rows(&mut self, rows: &[OutputRow]) -> Result<(), SinkError> {
        self.batch.extend_from_slice(rows);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), SinkError> {
        self.flush_batch()
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

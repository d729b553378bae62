//! Shared SQLite connection tuning

use rusqlite::Connection;

/// WAL journaling, relaxed sync, in-memory temp tables and a 1000-page
/// autocheckpoint. Must run before any table is created on `conn`.
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA temp_store = MEMORY;
         PRAGMA wal_autocheckpoint = 1000;",
    )
}

// Database schema — table creation.
//
// A `schema_version` table records which schema the file was created with so
// later changes can migrate existing databases in place.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables if they don't exist yet.
///
/// Idempotent, so it runs on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Ranked companies loaded from the pipeline's output.jsonl
        CREATE TABLE IF NOT EXISTS companies (
            company_ticker TEXT PRIMARY KEY,       -- upper-case stock symbol
            company_name TEXT NOT NULL,
            company_top_themes TEXT NOT NULL,      -- JSON array, most similar first
            company_description TEXT NOT NULL,
            loaded_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Case-insensitive ticker lookups
        CREATE INDEX IF NOT EXISTS idx_companies_ticker_upper
            ON companies(upper(company_ticker));
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let versions: Vec<i64> = conn
            .prepare("SELECT version FROM schema_version ORDER BY version")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(versions, vec![SCHEMA_VERSION]);
    }

    #[test]
    fn test_table_count() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        // schema_version, companies
        assert_eq!(table_count(&conn).unwrap(), 2);
    }

    #[test]
    fn test_ticker_is_primary_key() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let insert = "INSERT INTO companies (company_ticker, company_name, company_top_themes, company_description)
                      VALUES ('AAPL', 'Apple Inc.', '[]', 'd')";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}

// Database queries — every SQL statement lives here.
//
// The rest of the app goes through these functions (directly in tests, via
// the `Database` trait elsewhere) and never builds SQL itself.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::CompanyRecord;
use crate::ranking::RankedCompany;

/// Save or update one company.
pub fn upsert_company(conn: &Connection, record: &CompanyRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO companies (company_ticker, company_name, company_top_themes, company_description, loaded_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(company_ticker) DO UPDATE SET
            company_name = ?2,
            company_top_themes = ?3,
            company_description = ?4,
            loaded_at = datetime('now')",
        params![
            record.company_ticker,
            record.company_name,
            record.company_top_themes,
            record.company_description,
        ],
    )?;
    Ok(())
}

/// Replace the table contents with a freshly ranked dataset.
///
/// Runs in one transaction: either every record lands or the previous
/// contents stay. Returns the number of rows stored.
pub fn replace_dataset(conn: &mut Connection, companies: &[RankedCompany]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM companies", [])?;
    for company in companies {
        let record = CompanyRecord::from_ranked(company)?;
        upsert_company(&tx, &record)
            .with_context(|| format!("Failed to store {}", record.company_ticker))?;
    }
    let stored: i64 = tx.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
    tx.commit()?;
    Ok(stored as usize)
}

/// Look up one company by ticker, ignoring case.
pub fn get_company_by_ticker(conn: &Connection, ticker: &str) -> Result<Option<CompanyRecord>> {
    let mut stmt = conn.prepare(
        "SELECT company_ticker, company_name, company_top_themes, company_description
         FROM companies
         WHERE upper(company_ticker) = upper(?1)",
    )?;
    let result = stmt
        .query_row(params![ticker], |row| {
            Ok(CompanyRecord {
                company_ticker: row.get(0)?,
                company_name: row.get(1)?,
                company_top_themes: row.get(2)?,
                company_description: row.get(3)?,
            })
        })
        .optional()?;
    Ok(result)
}

/// Tickers whose stored top themes include `theme` (case-insensitive exact
/// match on a list element), in load order.
pub fn list_tickers_by_theme(conn: &Connection, theme: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT c.company_ticker
         FROM companies c
         WHERE EXISTS (
             SELECT 1 FROM json_each(c.company_top_themes) t
             WHERE lower(t.value) = lower(?1)
         )
         ORDER BY c.rowid",
    )?;

    let rows = stmt.query_map(params![theme], |row| row.get(0))?;

    let mut tickers = Vec::new();
    for row in rows {
        tickers.push(row?);
    }
    Ok(tickers)
}

/// Number of stored companies.
pub fn company_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    fn ranked(ticker: &str, themes: &[&str]) -> RankedCompany {
        RankedCompany {
            company_ticker: ticker.to_string(),
            company_name: format!("{ticker} Corp"),
            company_top_themes: themes.iter().map(|t| t.to_string()).collect(),
            company_description: format!("{ticker} makes things"),
        }
    }

    #[test]
    fn test_upsert_overwrites_existing_ticker() {
        let conn = test_db();
        let mut record = CompanyRecord::from_ranked(&ranked("AAPL", &["tech"])).unwrap();
        upsert_company(&conn, &record).unwrap();
        record.company_name = "Apple Inc.".to_string();
        upsert_company(&conn, &record).unwrap();

        assert_eq!(company_count(&conn).unwrap(), 1);
        let found = get_company_by_ticker(&conn, "AAPL").unwrap().unwrap();
        assert_eq!(found.company_name, "Apple Inc.");
    }

    #[test]
    fn test_get_company_by_ticker_case_insensitive() {
        let mut conn = test_db();
        replace_dataset(&mut conn, &[ranked("MSFT", &["cloud"])]).unwrap();
        assert!(get_company_by_ticker(&conn, "msft").unwrap().is_some());
        assert!(get_company_by_ticker(&conn, "GOOG").unwrap().is_none());
    }

    #[test]
    fn test_replace_dataset_drops_stale_rows() {
        let mut conn = test_db();
        replace_dataset(&mut conn, &[ranked("OLD", &["a1"]), ranked("KEEP", &["a1"])]).unwrap();
        let stored = replace_dataset(&mut conn, &[ranked("KEEP", &["b2"])]).unwrap();

        assert_eq!(stored, 1);
        assert!(get_company_by_ticker(&conn, "OLD").unwrap().is_none());
        let keep = get_company_by_ticker(&conn, "KEEP").unwrap().unwrap();
        assert_eq!(keep.company_top_themes, r#"["b2"]"#);
    }

    #[test]
    fn test_replace_dataset_duplicate_tickers_last_wins() {
        let mut conn = test_db();
        let stored =
            replace_dataset(&mut conn, &[ranked("DUP", &["first"]), ranked("DUP", &["second"])])
                .unwrap();
        assert_eq!(stored, 1);
        let row = get_company_by_ticker(&conn, "DUP").unwrap().unwrap();
        assert_eq!(row.top_themes().unwrap(), vec!["second"]);
    }

    #[test]
    fn test_list_tickers_by_theme_exact_element_match() {
        let mut conn = test_db();
        replace_dataset(
            &mut conn,
            &[
                ranked("TSLA", &["ev", "batteries"]),
                ranked("AAPL", &["consumer-devices"]),
                ranked("NIO", &["batteries", "ev"]),
            ],
        )
        .unwrap();

        assert_eq!(list_tickers_by_theme(&conn, "ev").unwrap(), vec!["TSLA", "NIO"]);
        assert_eq!(list_tickers_by_theme(&conn, "EV").unwrap(), vec!["TSLA", "NIO"]);
        // "ev" is a substring of "devices" but not a list element
        assert_eq!(
            list_tickers_by_theme(&conn, "consumer-devices").unwrap(),
            vec!["AAPL"]
        );
        assert!(list_tickers_by_theme(&conn, "mining").unwrap().is_empty());
    }
}

// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across .await points.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::CompanyRecord;
use super::traits::Database;
use crate::ranking::RankedCompany;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn replace_dataset(&self, companies: &[RankedCompany]) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        super::queries::replace_dataset(&mut conn, companies)
    }

    async fn get_company_by_ticker(&self, ticker: &str) -> Result<Option<CompanyRecord>> {
        let conn = self.conn.lock().await;
        super::queries::get_company_by_ticker(&conn, ticker)
    }

    async fn list_tickers_by_theme(&self, theme: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        super::queries::list_tickers_by_theme(&conn, theme)
    }

    async fn company_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::company_count(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;

    async fn test_db() -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteDatabase::new(conn)
    }

    fn ranked(ticker: &str, themes: &[&str]) -> RankedCompany {
        RankedCompany {
            company_ticker: ticker.to_string(),
            company_name: format!("{ticker} Corp"),
            company_top_themes: themes.iter().map(|t| t.to_string()).collect(),
            company_description: "Makes things.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let db = test_db().await;
        assert_eq!(db.table_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_trait_replace_and_lookup() {
        let db = test_db().await;
        let stored = db
            .replace_dataset(&[ranked("AAPL", &["consumer-devices", "ai"]), ranked("NVDA", &["ai"])])
            .await
            .unwrap();
        assert_eq!(stored, 2);
        assert_eq!(db.company_count().await.unwrap(), 2);

        let apple = db.get_company_by_ticker("aapl").await.unwrap().unwrap();
        assert_eq!(apple.company_ticker, "AAPL");
        assert_eq!(apple.company_top_themes, r#"["consumer-devices","ai"]"#);

        assert_eq!(
            db.list_tickers_by_theme("ai").await.unwrap(),
            vec!["AAPL", "NVDA"]
        );
    }

    #[tokio::test]
    async fn test_trait_replace_with_empty_dataset_clears_table() {
        let db = test_db().await;
        db.replace_dataset(&[ranked("AAPL", &["ai"])]).await.unwrap();
        assert_eq!(db.replace_dataset(&[]).await.unwrap(), 0);
        assert_eq!(db.company_count().await.unwrap(), 0);
    }
}

// Database trait — async interface the web layer is written against.
//
// The one implementor today is SqliteDatabase. Handlers hold an
// `Arc<dyn Database>`, which lets tests swap in fakes that fail or count
// calls without touching SQLite.

use anyhow::Result;
use async_trait::async_trait;

use super::models::CompanyRecord;
use crate::ranking::RankedCompany;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Loading ---

    /// Replace every stored company with `companies`. All or nothing.
    async fn replace_dataset(&self, companies: &[RankedCompany]) -> Result<usize>;

    // --- Lookups ---

    /// Find a company by ticker, ignoring case.
    async fn get_company_by_ticker(&self, ticker: &str) -> Result<Option<CompanyRecord>>;

    /// Tickers whose top themes contain `theme`, in load order.
    async fn list_tickers_by_theme(&self, theme: &str) -> Result<Vec<String>>;

    /// Number of stored companies.
    async fn company_count(&self) -> Result<i64>;
}

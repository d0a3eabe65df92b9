// Data models — Rust structs that map to database rows.
//
// Kept apart from the queries so the web layer can use them without
// depending on rusqlite directly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ranking::RankedCompany;

/// A stored company row. `company_top_themes` stays in its serialized JSON
/// form, which is also how the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_ticker: String,
    pub company_name: String,
    pub company_top_themes: String,
    pub company_description: String,
}

impl CompanyRecord {
    /// Build a row from a pipeline record, serializing its theme list.
    pub fn from_ranked(company: &RankedCompany) -> Result<Self> {
        Ok(Self {
            company_ticker: company.company_ticker.clone(),
            company_name: company.company_name.clone(),
            company_top_themes: serde_json::to_string(&company.company_top_themes)?,
            company_description: company.company_description.clone(),
        })
    }

    /// Decode the stored theme list.
    pub fn top_themes(&self) -> Result<Vec<String>> {
        serde_json::from_str(&self.company_top_themes).with_context(|| {
            format!(
                "Stored top themes for {} are not a JSON list",
                self.company_ticker
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ranked_serializes_theme_list_in_order() {
        let ranked = RankedCompany {
            company_ticker: "TSLA".to_string(),
            company_name: "Tesla, Inc.".to_string(),
            company_top_themes: vec!["ev".to_string(), "batteries".to_string()],
            company_description: "Cars.".to_string(),
        };
        let record = CompanyRecord::from_ranked(&ranked).unwrap();
        assert_eq!(record.company_top_themes, r#"["ev","batteries"]"#);
        assert_eq!(record.top_themes().unwrap(), vec!["ev", "batteries"]);
    }

    #[test]
    fn test_top_themes_rejects_malformed_json() {
        let record = CompanyRecord {
            company_ticker: "BAD".to_string(),
            company_name: "Bad".to_string(),
            company_top_themes: "ev, batteries".to_string(),
            company_description: "d".to_string(),
        };
        assert!(record.top_themes().is_err());
    }
}

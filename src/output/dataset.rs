// Ranked dataset — one JSON object per line (`output.jsonl`).
//
// Written by the pipeline, read back by `serve` to populate the database.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::info;

use crate::ranking::RankedCompany;

/// File name of the ranked dataset inside the output directory.
pub const DATASET_FILE: &str = "output.jsonl";

/// Serialize ranked companies as JSON lines, in map order.
pub fn to_json_lines(companies: &IndexMap<String, RankedCompany>) -> Result<String> {
    let mut out = String::new();
    for company in companies.values() {
        out.push_str(&serde_json::to_string(company)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write the ranked dataset.
pub fn save_dataset(path: &Path, companies: &IndexMap<String, RankedCompany>) -> Result<()> {
    let body = to_json_lines(companies)?;
    super::write_atomic(path, body.as_bytes())?;
    info!("Done saving processed company data to {}", path.display());
    Ok(())
}

/// Parse JSON lines back into records. Blank lines are skipped; a malformed
/// line fails the whole load with its line number.
pub fn parse_json_lines(content: &str) -> Result<Vec<RankedCompany>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Malformed dataset record on line {}", i + 1))
        })
        .collect()
}

/// Read the ranked dataset from disk.
pub fn load_dataset(path: &Path) -> Result<Vec<RankedCompany>> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read dataset {}. Run `thematic process` first.",
            path.display()
        )
    })?;
    parse_json_lines(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, themes: &[&str]) -> RankedCompany {
        RankedCompany {
            company_ticker: ticker.to_string(),
            company_name: format!("{ticker} Inc."),
            company_top_themes: themes.iter().map(|t| t.to_string()).collect(),
            company_description: "desc".to_string(),
        }
    }

    #[test]
    fn test_json_lines_field_names() {
        let mut map = IndexMap::new();
        map.insert("AAPL".to_string(), record("AAPL", &["tech"]));
        let body = to_json_lines(&map).unwrap();
        assert_eq!(
            body,
            "{\"company_ticker\":\"AAPL\",\"company_name\":\"AAPL Inc.\",\"company_top_themes\":[\"tech\"],\"company_description\":\"desc\"}\n"
        );
    }

    #[test]
    fn test_parse_json_lines_skips_blank_lines() {
        let content = "{\"company_ticker\":\"A\",\"company_name\":\"A\",\"company_top_themes\":[],\"company_description\":\"d\"}\n\n";
        let records = parse_json_lines(content).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company_ticker, "A");
    }

    #[test]
    fn test_parse_json_lines_reports_line_number() {
        let err = parse_json_lines("\nnot json").unwrap_err();
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }
}

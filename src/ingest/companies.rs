// Company profile extraction from a directory of HTML files.
//
// Each document is checked against the fixed element skeleton first, then
// name, ticker, and description are pulled out in that order. Any failure
// rejects the whole document; the caller logs it with the path and moves on.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{info, warn};

use super::html::{scan_document, ScannedDocument};
use crate::embeddings::traits::TextEmbedder;
use crate::pipeline::PipelineError;

/// Literal that precedes the company name inside `<title>`.
pub const TITLE_NAME_PREFIX: &str = "Company Description:";

/// Literal that precedes the ticker inside `<h2>`.
pub const TICKER_PREFIX: &str = "Ticker:";

/// File extension of company profiles.
pub const COMPANY_FILE_EXTENSION: &str = "html";

/// A validated company with its description embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub description: String,
    pub embedding: Vec<f64>,
}

/// Fields extracted from one document, before embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyDetails {
    pub name: String,
    pub ticker: String,
    pub description: String,
}

/// Why a company document was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyError {
    /// The file could not be read as UTF-8 text.
    Unreadable(String),
    MalformedStructure,
    BlankName,
    MissingTitlePrefix,
    NameMismatch,
    MissingTickerPrefix,
    BlankTicker,
    BlankDescription,
}

impl fmt::Display for CompanyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable(reason) => write!(f, "File could not be read: {reason}"),
            Self::MalformedStructure => {
                write!(f, "HTML is not in expected format. The file will be skipped.")
            }
            Self::BlankName => write!(
                f,
                "Company name is missing from BODY->H1. Please fix. The file will be skipped."
            ),
            Self::MissingTitlePrefix => write!(
                f,
                "TITLE is expected in the format \"{TITLE_NAME_PREFIX} <Company name>\". Please fix. The file will be skipped."
            ),
            Self::NameMismatch => write!(
                f,
                "Company name in BODY->H1 mismatch TITLE. Please fix. The file will be skipped."
            ),
            Self::MissingTickerPrefix => {
                write!(f, "Company ticker (expected in BODY->H2) is missing.")
            }
            Self::BlankTicker => write!(f, "Company ticker (expected in BODY->H2) is blank"),
            Self::BlankDescription => {
                write!(f, "Company description (expected in BODY->P) is blank.")
            }
        }
    }
}

impl std::error::Error for CompanyError {}

/// A document that failed extraction, with the path it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedDocument {
    pub path: PathBuf,
    pub error: CompanyError,
}

/// Result of extracting every company document, before embedding.
#[derive(Debug, Default)]
pub struct ParsedCompanies {
    /// Ticker → details, in first-seen order.
    pub companies: IndexMap<String, CompanyDetails>,
    pub rejected: Vec<RejectedDocument>,
}

/// List the HTML profiles in a directory, sorted by path.
pub fn list_company_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read companies directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list {}", dir.display()))?
            .path();
        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(COMPANY_FILE_EXTENSION));
        if is_html && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Read the company name from `<h1>` and cross-check it against `<title>`.
pub fn extract_company_name(doc: &ScannedDocument) -> Result<String, CompanyError> {
    let name = doc.h1.trim();
    if name.is_empty() {
        return Err(CompanyError::BlankName);
    }

    let Some(start) = doc.title.find(TITLE_NAME_PREFIX) else {
        return Err(CompanyError::MissingTitlePrefix);
    };
    let name_from_title = doc.title[start + TITLE_NAME_PREFIX.len()..].trim();

    if name_from_title != name {
        return Err(CompanyError::NameMismatch);
    }

    Ok(name.to_string())
}

/// Read the upper-cased ticker that follows `Ticker:` in `<h2>`.
pub fn extract_company_ticker(doc: &ScannedDocument) -> Result<String, CompanyError> {
    let Some(start) = doc.h2.find(TICKER_PREFIX) else {
        return Err(CompanyError::MissingTickerPrefix);
    };

    let ticker = doc.h2[start + TICKER_PREFIX.len()..].trim().to_uppercase();
    if ticker.is_empty() {
        return Err(CompanyError::BlankTicker);
    }

    Ok(ticker)
}

/// Read the `<p>` description, folding indented source lines into one line.
pub fn extract_company_description(doc: &ScannedDocument) -> Result<String, CompanyError> {
    let description = doc
        .paragraph
        .split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    if description.is_empty() {
        return Err(CompanyError::BlankDescription);
    }

    Ok(description)
}

/// Extract name, ticker, and description; the first failure wins.
pub fn extract_company_details(doc: &ScannedDocument) -> Result<CompanyDetails, CompanyError> {
    Ok(CompanyDetails {
        name: extract_company_name(doc)?,
        ticker: extract_company_ticker(doc)?,
        description: extract_company_description(doc)?,
    })
}

/// Validate one HTML document's structure and extract its details.
pub fn parse_company_document(html: &str) -> Result<CompanyDetails, CompanyError> {
    let doc = scan_document(html).map_err(|_| CompanyError::MalformedStructure)?;
    if !doc.has_expected_structure() {
        return Err(CompanyError::MalformedStructure);
    }
    extract_company_details(&doc)
}

/// Extract every document, logging and collecting rejections.
///
/// A later document with an already-seen ticker replaces the earlier one.
pub fn parse_company_files(paths: &[PathBuf]) -> ParsedCompanies {
    let mut parsed = ParsedCompanies::default();

    for path in paths {
        let result = std::fs::read_to_string(path)
            .map_err(|e| CompanyError::Unreadable(e.to_string()))
            .and_then(|html| parse_company_document(&html));

        match result {
            Ok(details) => {
                parsed.companies.insert(details.ticker.clone(), details);
            }
            Err(error) => {
                warn!("[{}]:{}", path.display(), error);
                parsed.rejected.push(RejectedDocument {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    parsed
}

/// Embed every accepted company description.
///
/// Fails with `PipelineError::NoCompanies` when no document survived.
pub async fn embed_companies(
    parsed: &ParsedCompanies,
    embedder: &dyn TextEmbedder,
) -> Result<IndexMap<String, Company>> {
    let tickers: Vec<&String> = parsed.companies.keys().collect();
    let last_three = &tickers[tickers.len().saturating_sub(3)..];
    info!(
        "Done parsing companies. There are {} companies. Last three: {:?}",
        tickers.len(),
        last_three
    );

    if parsed.companies.is_empty() {
        return Err(PipelineError::NoCompanies.into());
    }

    let descriptions: Vec<String> = parsed
        .companies
        .values()
        .map(|c| c.description.clone())
        .collect();
    let embeddings = embedder
        .embed_batch(&descriptions)
        .await
        .context("Failed to embed company descriptions")?;

    if embeddings.len() != descriptions.len() {
        anyhow::bail!(
            "Embedder returned {} vectors for {} companies",
            embeddings.len(),
            descriptions.len()
        );
    }

    Ok(parsed
        .companies
        .values()
        .zip(embeddings)
        .map(|(details, embedding)| {
            (
                details.ticker.clone(),
                Company {
                    ticker: details.ticker.clone(),
                    name: details.name.clone(),
                    description: details.description.clone(),
                    embedding,
                },
            )
        })
        .collect())
}

/// List, extract, and embed the companies in a directory.
pub async fn parse_companies_dir(
    dir: &Path,
    embedder: &dyn TextEmbedder,
) -> Result<(IndexMap<String, Company>, Vec<RejectedDocument>)> {
    let paths = list_company_files(dir)?;
    let parsed = parse_company_files(&paths);
    let companies = embed_companies(&parsed, embedder).await?;
    Ok((companies, parsed.rejected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, h1: &str, h2: &str, p: &str) -> ScannedDocument {
        ScannedDocument {
            kinds: super::super::html::EXPECTED_STRUCTURE.to_vec(),
            title: title.to_string(),
            h1: h1.to_string(),
            h2: h2.to_string(),
            paragraph: p.to_string(),
        }
    }

    #[test]
    fn test_title_prefix_may_appear_after_other_text() {
        let d = doc("ACME | Company Description: Acme", "Acme", "Ticker: A", "x");
        assert_eq!(extract_company_name(&d).unwrap(), "Acme");
    }

    #[test]
    fn test_whitespace_only_h1_is_blank() {
        let d = doc("Company Description: Acme", "   ", "Ticker: A", "x");
        assert_eq!(extract_company_name(&d), Err(CompanyError::BlankName));
    }

    #[test]
    fn test_ticker_is_uppercased() {
        let d = doc("Company Description: Acme", "Acme", "Ticker:  acme ", "x");
        assert_eq!(extract_company_ticker(&d).unwrap(), "ACME");
    }

    #[test]
    fn test_description_blank_lines_preserved_as_spaces() {
        let d = doc("", "", "", "\n  first\n\n  second\n");
        assert_eq!(extract_company_description(&d).unwrap(), "first  second");
    }

    #[test]
    fn test_name_checked_before_ticker() {
        let d = doc("Company Description: Acme", "", "no prefix", "");
        assert_eq!(extract_company_details(&d), Err(CompanyError::BlankName));
    }
}

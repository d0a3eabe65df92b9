// Theme parsing — one `name:description` definition per line.
//
// Lines are validated independently. A bad line is logged and skipped; only
// an empty result stops the run (see `parse_themes`).

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use regex_lite::Regex;
use tracing::{info, warn};

use crate::embeddings::traits::TextEmbedder;
use crate::pipeline::PipelineError;

/// Identifier grammar for normalized theme names. Both boundary classes are
/// required, so a name is always at least two characters long.
pub const THEME_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9\-.#&]*[A-Za-z0-9]$";

/// How much of an offending line is echoed back in error messages.
const ERROR_LINE_PREVIEW: usize = 100;

static THEME_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(THEME_NAME_PATTERN).expect("valid theme name pattern"));

/// A validated theme with its description embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub description: String,
    pub embedding: Vec<f64>,
}

/// Why a theme line was rejected. Each variant carries the offending line
/// (truncated) so the log entry points at the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    MissingColon(String),
    MissingName(String),
    MissingDescription(String),
    InvalidNameFormat(String),
}

impl ThemeError {
    fn message(&self) -> &'static str {
        match self {
            Self::MissingColon(_) => {
                "expected format: \"theme name <colon> theme description\". missing colon"
            }
            Self::MissingName(_) => {
                "expected format: \"theme name <colon> theme description\". missing name"
            }
            Self::MissingDescription(_) => {
                "expected format: \"theme name <colon> theme description\". missing description"
            }
            Self::InvalidNameFormat(_) => {
                "Theme name must follow the regex '[a-zA-Z0-9][a-zA-Z0-9-.#&]*[a-zA-Z0-9]'"
            }
        }
    }

    /// The (truncated) source line that produced this error.
    pub fn line(&self) -> &str {
        match self {
            Self::MissingColon(line)
            | Self::MissingName(line)
            | Self::MissingDescription(line)
            | Self::InvalidNameFormat(line) => line,
        }
    }
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message(), self.line())
    }
}

impl std::error::Error for ThemeError {}

/// A line that failed validation, with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line_number: usize,
    pub error: ThemeError,
}

/// Result of validating every theme line, before embedding.
#[derive(Debug, Default)]
pub struct ParsedThemes {
    /// Normalized name → description, in first-seen order.
    pub themes: IndexMap<String, String>,
    pub rejected: Vec<RejectedLine>,
}

/// Read a UTF-8 file and return its trimmed, non-blank lines.
pub fn read_lines_from_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(non_blank_lines(&content))
}

/// Split text into trimmed lines, dropping blank ones.
pub fn non_blank_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check a normalized theme name against `THEME_NAME_PATTERN`.
pub fn is_valid_theme_name(name: &str) -> bool {
    THEME_NAME_RE.is_match(name)
}

/// Split one `name:description` line into a normalized name and a trimmed
/// description.
///
/// The name is lower-cased with spaces turned into hyphens, so
/// `"Electric Vehicles: ..."` becomes `electric-vehicles`.
pub fn extract_theme_details(line: &str) -> Result<(String, String), ThemeError> {
    let preview = || truncate_line(line);

    let Some((raw_name, raw_description)) = line.split_once(':') else {
        return Err(ThemeError::MissingColon(preview()));
    };

    let name = raw_name.trim().to_lowercase().replace(' ', "-");
    let description = raw_description.trim().to_string();

    if name.is_empty() {
        return Err(ThemeError::MissingName(preview()));
    }
    if description.is_empty() {
        return Err(ThemeError::MissingDescription(preview()));
    }
    if !is_valid_theme_name(&name) {
        return Err(ThemeError::InvalidNameFormat(preview()));
    }

    Ok((name, description))
}

/// Validate every line, logging and collecting rejections.
///
/// A later line with the same name replaces the earlier description but keeps
/// its position.
pub fn parse_theme_lines(lines: &[String]) -> ParsedThemes {
    let mut parsed = ParsedThemes::default();

    for (i, line) in lines.iter().enumerate() {
        match extract_theme_details(line) {
            Ok((name, description)) => {
                parsed.themes.insert(name, description);
            }
            Err(error) => {
                warn!(line = i + 1, "{error}");
                parsed.rejected.push(RejectedLine {
                    line_number: i + 1,
                    error,
                });
            }
        }
    }

    parsed
}

/// Embed every accepted theme description.
///
/// Fails with `PipelineError::NoThemes` when nothing survived validation,
/// since there is nothing to rank companies against.
pub async fn embed_themes(
    parsed: &ParsedThemes,
    embedder: &dyn TextEmbedder,
) -> Result<IndexMap<String, Theme>> {
    let names: Vec<&String> = parsed.themes.keys().collect();
    info!(
        "Done parsing themes. There are {} themes: {:?}",
        names.len(),
        names
    );

    if parsed.themes.is_empty() {
        return Err(PipelineError::NoThemes.into());
    }

    let descriptions: Vec<String> = parsed.themes.values().cloned().collect();
    let embeddings = embedder
        .embed_batch(&descriptions)
        .await
        .context("Failed to embed theme descriptions")?;

    if embeddings.len() != descriptions.len() {
        anyhow::bail!(
            "Embedder returned {} vectors for {} themes",
            embeddings.len(),
            descriptions.len()
        );
    }

    Ok(parsed
        .themes
        .iter()
        .zip(embeddings)
        .map(|((name, description), embedding)| {
            (
                name.clone(),
                Theme {
                    name: name.clone(),
                    description: description.clone(),
                    embedding,
                },
            )
        })
        .collect())
}

/// Validate and embed theme lines in one step.
pub async fn parse_themes(
    lines: &[String],
    embedder: &dyn TextEmbedder,
) -> Result<(IndexMap<String, Theme>, Vec<RejectedLine>)> {
    let parsed = parse_theme_lines(lines);
    let themes = embed_themes(&parsed, embedder).await?;
    Ok((themes, parsed.rejected))
}

fn truncate_line(line: &str) -> String {
    line.chars().take(ERROR_LINE_PREVIEW).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_lines_drops_empty_and_trims() {
        let lines = non_blank_lines("Line1\n  Line2  \n\n   \nLine4");
        assert_eq!(lines, vec!["Line1", "Line2", "Line4"]);
    }

    #[test]
    fn test_truncate_line_keeps_first_hundred_chars() {
        let long = "x".repeat(150);
        assert_eq!(truncate_line(&long).chars().count(), 100);
        assert_eq!(truncate_line("short"), "short");
    }

    #[test]
    fn test_error_display_includes_line() {
        let err = extract_theme_details("no colon here").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected format: \"theme name <colon> theme description\". missing colon: no colon here"
        );
    }

    #[test]
    fn test_error_line_is_truncated() {
        let line = format!("{}:", "a".repeat(200));
        let err = extract_theme_details(&line).unwrap_err();
        assert!(matches!(err, ThemeError::MissingDescription(_)));
        assert_eq!(err.line().len(), ERROR_LINE_PREVIEW);
    }

    #[test]
    fn test_parse_theme_lines_records_line_numbers() {
        let lines = vec![
            "ev: electric vehicles".to_string(),
            "broken line".to_string(),
            ": no name".to_string(),
        ];
        let parsed = parse_theme_lines(&lines);
        assert_eq!(parsed.themes.len(), 1);
        let numbers: Vec<usize> = parsed.rejected.iter().map(|r| r.line_number).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn test_parse_theme_lines_last_duplicate_wins_first_position_kept() {
        let lines = vec![
            "cloud: first".to_string(),
            "ai: models".to_string(),
            "Cloud: second".to_string(),
        ];
        let parsed = parse_theme_lines(&lines);
        let keys: Vec<&str> = parsed.themes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["cloud", "ai"]);
        assert_eq!(parsed.themes["cloud"], "second");
    }
}

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::embeddings::download::{default_model_dir, embedding_files_present, embedding_model_dir};
use crate::output::dataset::DATASET_FILE;
use crate::output::theme_names::THEME_NAMES_FILE;
use crate::ranking::DEFAULT_TOP_N;

/// Central configuration loaded from environment variables.
///
/// Every value has a default matching the repository layout
/// (`inputs/`, `outputs/`, `db/`). The .env file is loaded automatically at
/// startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Theme definitions, one `name:description` per line
    pub themes_file: PathBuf,
    /// Directory of company HTML profiles
    pub companies_dir: PathBuf,
    /// Where the ranked dataset and theme-name list are written
    pub output_dir: PathBuf,
    pub db_path: String,
    /// Directory containing the ONNX model files
    pub model_dir: PathBuf,
    /// Optional directory for per-command log files
    pub log_dir: Option<PathBuf>,
    /// Themes kept per company
    pub top_n: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let top_n = match env::var("THEMATIC_TOP_N") {
            Ok(raw) => parse_top_n(&raw)?,
            Err(_) => DEFAULT_TOP_N,
        };

        Ok(Self {
            themes_file: env::var("THEMATIC_THEMES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("inputs/themes.txt")),
            companies_dir: env::var("THEMATIC_COMPANIES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("inputs/companies")),
            output_dir: env::var("THEMATIC_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("outputs")),
            db_path: env::var("THEMATIC_DB_PATH")
                .unwrap_or_else(|_| "./db/companies.db".to_string()),
            model_dir: env::var("THEMATIC_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_model_dir()),
            log_dir: env::var("THEMATIC_LOG_DIR").ok().map(PathBuf::from),
            top_n,
        })
    }

    /// Ranked dataset written by `process` and loaded by `serve`.
    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(DATASET_FILE)
    }

    /// Theme-name list written by `process` and loaded by `serve`.
    pub fn theme_names_path(&self) -> PathBuf {
        self.output_dir.join(THEME_NAMES_FILE)
    }

    /// Directory holding model.onnx and tokenizer.json.
    pub fn embedding_dir(&self) -> PathBuf {
        embedding_model_dir(&self.model_dir)
    }

    /// Check that the embedding model has been downloaded.
    /// Call this before any operation that embeds text.
    pub fn require_model(&self) -> Result<()> {
        if !embedding_files_present(&self.model_dir) {
            anyhow::bail!(
                "Embedding model files not found in {}\n\
                 Run `thematic download-model` to download them.",
                self.embedding_dir().display()
            );
        }
        Ok(())
    }
}

/// Parse a top-N override; zero would rank nothing, so it is refused.
pub fn parse_top_n(raw: &str) -> Result<usize> {
    let top_n: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("THEMATIC_TOP_N must be a positive integer, got {raw:?}"))?;
    if top_n == 0 {
        anyhow::bail!("THEMATIC_TOP_N must be at least 1");
    }
    Ok(top_n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_n() {
        assert_eq!(parse_top_n("5").unwrap(), 5);
        assert_eq!(parse_top_n(" 2 ").unwrap(), 2);
        assert!(parse_top_n("0").is_err());
        assert!(parse_top_n("three").is_err());
        assert!(parse_top_n("-1").is_err());
    }

    #[test]
    fn test_derived_paths() {
        let config = Config {
            themes_file: PathBuf::from("in/themes.txt"),
            companies_dir: PathBuf::from("in/companies"),
            output_dir: PathBuf::from("out"),
            db_path: "db.sqlite".to_string(),
            model_dir: PathBuf::from("/models"),
            log_dir: None,
            top_n: 3,
        };
        assert_eq!(config.dataset_path(), PathBuf::from("out/output.jsonl"));
        assert_eq!(config.theme_names_path(), PathBuf::from("out/theme_names.txt"));
        assert_eq!(config.embedding_dir(), PathBuf::from("/models/all-MiniLM-L6-v2"));
    }
}

// Batch pipeline: themes → companies → ranking → artifacts.
//
// Everything the run needs is gathered into a `PipelineContext` once, in
// main, and passed down by reference.

pub mod process;

use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::embeddings::traits::TextEmbedder;
use crate::output::dataset::DATASET_FILE;
use crate::output::theme_names::THEME_NAMES_FILE;

/// Conditions that stop the run before anything is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    NoThemes,
    NoCompanies,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoThemes => write!(
                f,
                "no themes parsed. exiting program because there are no themes to compare companies with."
            ),
            Self::NoCompanies => write!(
                f,
                "no companies parsed. exiting program because there are no companies to identify themes for."
            ),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Inputs, outputs, and collaborators for one pipeline run.
pub struct PipelineContext<'a> {
    pub themes_file: PathBuf,
    pub companies_dir: PathBuf,
    pub output_dir: PathBuf,
    pub embedder: &'a dyn TextEmbedder,
    pub top_n: usize,
}

impl<'a> PipelineContext<'a> {
    pub fn from_config(config: &Config, embedder: &'a dyn TextEmbedder) -> Self {
        Self {
            themes_file: config.themes_file.clone(),
            companies_dir: config.companies_dir.clone(),
            output_dir: config.output_dir.clone(),
            embedder,
            top_n: config.top_n,
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(DATASET_FILE)
    }

    pub fn theme_names_path(&self) -> PathBuf {
        self.output_dir.join(THEME_NAMES_FILE)
    }
}

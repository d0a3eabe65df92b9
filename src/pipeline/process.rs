// The data pipeline run behind `thematic process`.
//
// Both inputs are fully parsed and embedded before the first artifact is
// written, so a fatal `PipelineError` leaves the output directory untouched.

use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::info;

use super::PipelineContext;
use crate::ingest::companies::{self, RejectedDocument};
use crate::ingest::themes::{self, RejectedLine};
use crate::output::{dataset, theme_names};
use crate::ranking::{self, RankedCompany};

/// What a completed run produced.
#[derive(Debug)]
pub struct PipelineSummary {
    /// Valid theme names, in file order.
    pub theme_names: Vec<String>,
    pub ranked: IndexMap<String, RankedCompany>,
    pub rejected_themes: Vec<RejectedLine>,
    pub rejected_companies: Vec<RejectedDocument>,
    pub dataset_path: PathBuf,
    pub theme_names_path: PathBuf,
}

/// Run the pipeline end to end.
pub async fn run(ctx: &PipelineContext<'_>) -> Result<PipelineSummary> {
    info!(
        themes_file = %ctx.themes_file.display(),
        companies_dir = %ctx.companies_dir.display(),
        top_n = ctx.top_n,
        "Starting data pipeline"
    );

    let lines = themes::read_lines_from_file(&ctx.themes_file)
        .context("Failed to read the theme file")?;
    let (theme_map, rejected_themes) = themes::parse_themes(&lines, ctx.embedder).await?;

    let (company_map, rejected_companies) =
        companies::parse_companies_dir(&ctx.companies_dir, ctx.embedder).await?;

    let theme_names_path = ctx.theme_names_path();
    theme_names::save_theme_names(&theme_names_path, theme_map.keys())?;

    let ranked = ranking::rank(&theme_map, &company_map, ctx.top_n);
    info!(
        "Done determining top {} themes for every company.",
        ctx.top_n
    );

    let dataset_path = ctx.dataset_path();
    dataset::save_dataset(&dataset_path, &ranked)?;

    info!(
        themes = theme_map.len(),
        companies = ranked.len(),
        rejected_themes = rejected_themes.len(),
        rejected_companies = rejected_companies.len(),
        "Finished data pipeline"
    );

    Ok(PipelineSummary {
        theme_names: theme_map.keys().cloned().collect(),
        ranked,
        rejected_themes,
        rejected_companies,
        dataset_path,
        theme_names_path,
    })
}

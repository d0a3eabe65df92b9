// Colored terminal output for pipeline runs.
//
// main.rs delegates here after `thematic process` so the CLI prints a short
// report on top of the structured logs.

use colored::Colorize;
use indexmap::IndexMap;

use super::truncate_chars;
use crate::pipeline::process::PipelineSummary;
use crate::ranking::RankedCompany;

/// Longest description excerpt shown per company.
const DESCRIPTION_PREVIEW_CHARS: usize = 60;

/// Display the outcome of a pipeline run.
pub fn display_pipeline_summary(summary: &PipelineSummary) {
    println!("\n{}", "=== Pipeline Complete ===".bold());
    println!(
        "  Themes: {} ({} rejected)",
        summary.theme_names.len(),
        summary.rejected_themes.len()
    );
    println!(
        "  Companies: {} ({} rejected)",
        summary.ranked.len(),
        summary.rejected_companies.len()
    );

    if !summary.rejected_themes.is_empty() {
        println!("\n  {}", "Rejected theme lines:".yellow());
        for rejected in &summary.rejected_themes {
            println!(
                "    {} line {}: {}",
                "~".yellow(),
                rejected.line_number,
                rejected.error
            );
        }
    }

    if !summary.rejected_companies.is_empty() {
        println!("\n  {}", "Rejected company files:".yellow());
        for rejected in &summary.rejected_companies {
            println!(
                "    {} {}: {}",
                "~".yellow(),
                rejected.path.display(),
                rejected.error
            );
        }
    }

    display_ranked_companies(&summary.ranked);

    println!("\n  Dataset: {}", summary.dataset_path.display());
    println!("  Theme names: {}", summary.theme_names_path.display());
}

/// Display every ranked company with its top themes.
pub fn display_ranked_companies(ranked: &IndexMap<String, RankedCompany>) {
    if ranked.is_empty() {
        println!("No companies ranked yet. Run `thematic process` first.");
        return;
    }

    println!(
        "\n  {:<8} {:<28} {}",
        "Ticker".dimmed(),
        "Name".dimmed(),
        "Top themes".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for company in ranked.values() {
        let themes = if company.company_top_themes.is_empty() {
            "(none)".dimmed().to_string()
        } else {
            company.company_top_themes.join(", ").cyan().to_string()
        };
        println!(
            "  {:<8} {:<28} {}",
            company.company_ticker.bold(),
            truncate_chars(&company.company_name, 26),
            themes
        );
        println!(
            "  {:<8} {}",
            "",
            truncate_chars(&company.company_description, DESCRIPTION_PREVIEW_CHARS).dimmed()
        );
    }
}

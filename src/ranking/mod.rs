// Top-N theme ranking per company.
//
// Every company is compared against every theme (the corpus is small, so no
// index). Ties keep the theme file's order, which makes the output a pure
// function of the inputs.

pub mod similarity;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ingest::companies::Company;
use crate::ingest::themes::Theme;
use similarity::cosine_similarity;

/// How many themes each company keeps unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 3;

/// A company with its best-matching themes. This is the persisted and
/// served record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCompany {
    pub company_ticker: String,
    pub company_name: String,
    /// Theme names, most similar first.
    pub company_top_themes: Vec<String>,
    pub company_description: String,
}

/// Similarity of one company to every theme, in theme order.
pub fn theme_similarities<'a>(
    company: &Company,
    themes: &'a IndexMap<String, Theme>,
) -> Vec<(&'a str, f64)> {
    themes
        .values()
        .map(|theme| {
            (
                theme.name.as_str(),
                cosine_similarity(&company.embedding, &theme.embedding),
            )
        })
        .collect()
}

/// The `top_n` theme names closest to a company, most similar first.
///
/// The sort is stable, so equal scores keep theme insertion order. `total_cmp`
/// keeps the comparator a total order even for NaN scores. Fewer than
/// `top_n` names come back when there are fewer themes.
pub fn rank_themes(company: &Company, themes: &IndexMap<String, Theme>, top_n: usize) -> Vec<String> {
    let mut scored = theme_similarities(company, themes);
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored
        .into_iter()
        .take(top_n)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Rank every company against every theme.
///
/// Output order follows the company map.
pub fn rank(
    themes: &IndexMap<String, Theme>,
    companies: &IndexMap<String, Company>,
    top_n: usize,
) -> IndexMap<String, RankedCompany> {
    companies
        .iter()
        .map(|(ticker, company)| {
            (
                ticker.clone(),
                RankedCompany {
                    company_ticker: company.ticker.clone(),
                    company_name: company.name.clone(),
                    company_top_themes: rank_themes(company, themes, top_n),
                    company_description: company.description.clone(),
                },
            )
        })
        .collect()
}

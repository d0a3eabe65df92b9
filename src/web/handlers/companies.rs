// Company lookup handlers.
//
// GET /companies/{ticker}              — single company by ticker
// GET /companies/list-by-theme/{theme} — tickers whose top themes include the theme
//
// Both validate their path value before touching storage: tickers against
// TICKER_PATTERN, themes against the theme-name list loaded at startup.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use regex_lite::Regex;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::web::{api_error, AppState, RequestId};

/// Up to six upper-case letters.
pub const TICKER_PATTERN: &str = r"^[A-Z]{1,6}$";

static TICKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TICKER_PATTERN).expect("valid ticker pattern"));

const INTERNAL_ERROR: &str = "Internal Server Error.";

/// Whether an (already upper-cased) ticker is well formed.
pub fn is_valid_ticker(ticker: &str) -> bool {
    TICKER_RE.is_match(ticker)
}

#[derive(Debug, Serialize)]
pub struct CompanyTickerList {
    pub theme_name: String,
    pub number_of_matches: usize,
    pub data: Vec<String>,
}

/// Log the failure against the request id and build the error response.
fn reject(request_id: &RequestId, status: StatusCode, message: &str) -> Response {
    if status.is_server_error() {
        error!(request_id = %request_id.0, status = status.as_u16(), "{message}");
    } else {
        warn!(request_id = %request_id.0, status = status.as_u16(), "{message}");
    }
    api_error(status, message)
}

/// GET /companies/{ticker}
pub async fn get_company_by_ticker(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(ticker): Path<String>,
) -> Response {
    info!(request_id = %request_id.0, "Endpoint called. Handling request.");

    let ticker = ticker.to_uppercase();
    if !is_valid_ticker(&ticker) {
        return reject(
            &request_id,
            StatusCode::BAD_REQUEST,
            "Invalid ticker. Up to 6 capital letters only.",
        );
    }

    match state.db.get_company_by_ticker(&ticker).await {
        Ok(Some(company)) => {
            info!(
                request_id = %request_id.0,
                ticker = %company.company_ticker,
                "Endpoint resolved."
            );
            Json(company).into_response()
        }
        Ok(None) => reject(
            &request_id,
            StatusCode::NOT_FOUND,
            &format!("No company found with given ticker: {ticker}"),
        ),
        Err(e) => {
            error!(request_id = %request_id.0, error = %e, ticker = %ticker, "DB error fetching company");
            reject(&request_id, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
        }
    }
}

/// GET /companies/list-by-theme/{theme}
pub async fn list_by_theme(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(theme): Path<String>,
) -> Response {
    info!(request_id = %request_id.0, "Endpoint called. Handling request.");

    if !state.theme_names.contains(&theme.to_lowercase()) {
        let message = format!(
            "invalid theme:{theme}\nAccepted themes:{}",
            accepted_themes(state.theme_names.iter())
        );
        return reject(&request_id, StatusCode::BAD_REQUEST, &message);
    }

    let tickers = match state.db.list_tickers_by_theme(&theme).await {
        Ok(tickers) => tickers,
        Err(e) => {
            error!(request_id = %request_id.0, error = %e, theme = %theme, "DB error listing companies");
            return reject(&request_id, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR);
        }
    };

    if tickers.is_empty() {
        return reject(
            &request_id,
            StatusCode::NOT_FOUND,
            &format!("No companies found with theme name: {theme}"),
        );
    }

    let body = CompanyTickerList {
        theme_name: theme,
        number_of_matches: tickers.len(),
        data: tickers,
    };
    info!(
        request_id = %request_id.0,
        theme = %body.theme_name,
        matches = body.number_of_matches,
        "Endpoint resolved."
    );
    Json(body).into_response()
}

/// Render theme names as `['a', 'b']`.
fn accepted_themes<'a>(names: impl Iterator<Item = &'a String>) -> String {
    let quoted: Vec<String> = names.map(|name| format!("'{name}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ticker() {
        assert!(is_valid_ticker("A"));
        assert!(is_valid_ticker("AAPL"));
        assert!(is_valid_ticker("ABCDEF"));
        assert!(!is_valid_ticker("AABBCCDD"));
        assert!(!is_valid_ticker(""));
        assert!(!is_valid_ticker("BRK.B"));
        assert!(!is_valid_ticker("aapl"));
    }

    #[test]
    fn test_accepted_themes_format() {
        let names = vec!["ev".to_string(), "retail".to_string()];
        assert_eq!(accepted_themes(names.iter()), "['ev', 'retail']");
        assert_eq!(accepted_themes(std::iter::empty()), "[]");
    }
}

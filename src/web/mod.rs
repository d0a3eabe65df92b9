// Web server — Axum-based read-only API over the ranked company dataset.
//
// Routes:
//   GET /health                             — liveness check
//   GET /companies/{ticker}                 — one company by ticker
//   GET /companies/list-by-theme/{theme}    — tickers whose top themes include a theme
//
// Every request is tagged with a random hex id by `assign_request_id`; the
// id is attached to the request's tracing span and echoed in the
// `x-request-id` response header.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use indexmap::IndexSet;
use rand::RngCore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};

use crate::db::Database;

pub mod handlers;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    /// Valid theme names, in the order the pipeline wrote them.
    pub theme_names: Arc<IndexSet<String>>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>, theme_names: IndexSet<String>) -> Self {
        Self {
            db,
            theme_names: Arc::new(theme_names),
        }
    }
}

/// Random id assigned to each request.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState, port: u16, bind: &str) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("Thematic API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/companies/list-by-theme/{theme}",
            get(handlers::companies::list_by_theme),
        )
        .route(
            "/companies/{ticker}",
            get(handlers::companies::get_company_by_ticker),
        )
        .layer(axum::middleware::from_fn(assign_request_id))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check — always returns 200 OK.
async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Tag the request with a fresh id, run it inside a span carrying that id,
/// and echo the id back to the caller.
async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::generate();
    let span = info_span!(
        "request",
        request_id = %request_id.0,
        endpoint = %request.uri().path(),
    );
    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

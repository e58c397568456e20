use crate::core::engine::RecommendationEngine;
use crate::domain::model::{HealthStatus, Timeframe};
use crate::domain::ports::MarketDataSource;
use crate::server::http::{HttpRequest, HttpResponse};
use crate::server::static_files;
use chrono::Local;
use std::path::PathBuf;

pub struct AppState<S: MarketDataSource> {
    pub engine: RecommendationEngine<S>,
    pub static_dir: PathBuf,
}

impl<S: MarketDataSource + 'static> AppState<S> {
    pub fn new(engine: RecommendationEngine<S>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            static_dir: static_dir.into(),
        }
    }
}

/// `assets=A,B` → `Some([A, B])`; missing or empty → `None` (default selection).
/// Entries are kept verbatim; the catalog drops anything that is not an exact symbol.
pub fn parse_asset_filter(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    Some(raw.split(',').map(str::to_string).collect())
}

pub async fn route<S: MarketDataSource + 'static>(
    state: &AppState<S>,
    request: &HttpRequest,
) -> HttpResponse {
    match request.method.as_str() {
        "OPTIONS" => HttpResponse::no_content(),
        "GET" => route_get(state, request).await,
        // HEAD 與 GET 相同，只是不送 body
        "HEAD" => route_get(state, request).await.into_head(),
        _ => HttpResponse::error(405, "method_not_allowed", "Only GET and HEAD are supported"),
    }
}

async fn route_get<S: MarketDataSource + 'static>(
    state: &AppState<S>,
    request: &HttpRequest,
) -> HttpResponse {
    match request.path.as_str() {
        "/api/recommendations" => handle_recommendations(state, request).await,
        "/api/assets" => handle_assets(state),
        "/health" => handle_health(),
        path if path.starts_with("/api/") => {
            HttpResponse::error(404, "not_found", "Unknown endpoint")
        }
        path => static_files::serve(&state.static_dir, path).await,
    }
}

async fn handle_recommendations<S: MarketDataSource + 'static>(
    state: &AppState<S>,
    request: &HttpRequest,
) -> HttpResponse {
    let timeframe = Timeframe::parse_or_default(request.query_param("timeframe").unwrap_or(""));
    let assets = parse_asset_filter(request.query_param("assets"));

    let report = state.engine.recommendations(timeframe, assets).await;
    HttpResponse::json(200, &report)
}

fn handle_assets<S: MarketDataSource + 'static>(state: &AppState<S>) -> HttpResponse {
    HttpResponse::json(200, &state.engine.supported_assets().listing())
}

fn handle_health() -> HttpResponse {
    HttpResponse::json(200, &HealthStatus::healthy_at(Local::now()))
}

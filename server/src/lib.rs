use anyhow::{Context, Result};
use axum::{extract::{Query, State}, routing::get, Json, Router};
use docrank_core::{IndexConfig, IndexStats, Searcher};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHitBody>,
}

#[derive(Serialize)]
pub struct SearchHitBody {
    pub doc_id: String,
    pub score: f64,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<Searcher>,
    pub default_k: usize,
}

const MAX_K: usize = 100;

/// Load the configured index once and build the router around it.
/// Fails when the index is missing or corrupt.
pub fn build_app(config: &IndexConfig) -> Result<Router> {
    let searcher = Searcher::from_config(config)
        .with_context(|| format!("loading index {}", config.index_path.display()))?;
    let stats = searcher.stats();
    tracing::info!(documents = stats.unique_documents, terms = stats.unique_terms, bytes = stats.index_size_bytes, "index ready");
    Ok(router(AppState { searcher: Arc::new(searcher), default_k: config.top_k }))
}

pub fn router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.unwrap_or(state.default_k).clamp(1, MAX_K);
    let res = state.searcher.search(&params.q, k);
    let results = res
        .hits
        .into_iter()
        .map(|h| SearchHitBody { doc_id: h.doc_id, score: h.score, location: h.location })
        .collect();
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, terms = res.terms.len(), total_hits = res.total_hits, "search");
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: res.total_hits, results })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.searcher.stats())
}

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::cache::NewsCache;
use crate::types::RunStats;

pub const HEALTH_TEXT: &str = "Cameroon news backend is running!";

#[derive(Clone)]
pub struct AppState {
    cache: Arc<NewsCache>,
}

impl AppState {
    pub fn new(cache: Arc<NewsCache>) -> Self {
        Self { cache }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/news", get(news))
        .route("/debug/snapshot", get(debug_snapshot))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

// Serves the published snapshot as-is; never waits on a running refresh.
async fn news(State(state): State<AppState>) -> Response {
    let snap = state.cache.current();
    Json(&snap.articles).into_response()
}

#[derive(serde::Serialize)]
struct SnapshotInfo {
    generated_at: Option<DateTime<Utc>>,
    articles: usize,
    #[serde(flatten)]
    stats: RunStats,
}

async fn debug_snapshot(State(state): State<AppState>) -> Json<SnapshotInfo> {
    let snap = state.cache.current();
    Json(SnapshotInfo {
        generated_at: snap.generated_at,
        articles: snap.len(),
        stats: snap.stats,
    })
}

//! Cameroon news service: binary entrypoint.
//! Loads config, starts the refresh loop, and serves the Axum router.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cameroon_news::{
    api, metrics::Metrics, AppState, HttpFeedClient, NewsCache, NewsConfig, Pipeline, Scheduler,
};

/// RUST_LOG drives the filter (default `info`); LOG_FORMAT=json switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = NewsConfig::load().context("loading news config")?;
    let metrics = Metrics::init()?;

    let client = Arc::new(HttpFeedClient::new().context("building feed client")?);
    let pipeline = Arc::new(Pipeline::new(client, &cfg));
    let cache = Arc::new(NewsCache::new());

    let listener = TcpListener::bind(("0.0.0.0", cfg.port))
        .await
        .with_context(|| format!("binding port {}", cfg.port))?;
    info!(port = cfg.port, sources = cfg.sources.len(), "server listening");

    // Immediate run, then every refresh interval.
    let scheduler = Arc::new(Scheduler::new(pipeline, Arc::clone(&cache)));
    let _refresh = scheduler.spawn(cfg.refresh_interval());

    let app = api::router(AppState::new(cache)).merge(metrics.router());
    axum::serve(listener, app).await.context("serving http")?;
    Ok(())
}

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once from the binary.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_runs_total", "Completed aggregation runs.");
        describe_counter!(
            "news_run_failures_total",
            "Runs aborted before publishing."
        );
        describe_counter!(
            "news_runs_skipped_total",
            "Triggers ignored because a run was still in flight."
        );
        describe_counter!(
            "news_source_errors_total",
            "Feed sources that failed or timed out."
        );
        describe_counter!("news_items_fetched_total", "Raw items returned by feeds.");
        describe_counter!(
            "news_items_filtered_total",
            "Items dropped by the relevance filter."
        );
        describe_counter!(
            "news_items_rejected_total",
            "Items dropped by normalization (missing/invalid link)."
        );
        describe_counter!("news_dedup_total", "Articles replaced by a later duplicate.");
        describe_gauge!(
            "news_snapshot_articles",
            "Articles in the currently published snapshot."
        );
        describe_gauge!("news_last_run_ts", "Unix ts of the last published run.");
        describe_histogram!("news_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

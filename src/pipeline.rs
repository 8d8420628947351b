// src/pipeline.rs
//! Aggregation pipeline: fetch every source concurrently, then
//! filter → normalize → dedup → sort into one immutable snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::Utc;
use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::config::NewsConfig;
use crate::feed::{FeedClient, FetchError, RawItem};
use crate::normalize::Normalizer;
use crate::relevance::RelevanceFilter;
use crate::types::{Article, Category, RunStats, Snapshot};

/// Output ordering. Both variants are stable and put unknown timestamps last.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Newest first.
    #[default]
    Recency,
    /// Politics articles pinned above everything else, newest first within each group.
    PoliticsFirst,
}

/// Result of fanning out to every source, in configured source order.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<RawItem>,
    pub sources_ok: usize,
    pub sources_failed: usize,
}

pub struct Pipeline {
    client: Arc<dyn FeedClient>,
    sources: Vec<String>,
    fetch_timeout: Duration,
    relevance: RelevanceFilter,
    normalizer: Normalizer,
    sort_policy: SortPolicy,
}

impl Pipeline {
    pub fn new(client: Arc<dyn FeedClient>, cfg: &NewsConfig) -> Self {
        Self {
            client,
            sources: cfg.sources.clone(),
            fetch_timeout: cfg.fetch_timeout(),
            relevance: RelevanceFilter::new(&cfg.keywords.relevance),
            normalizer: Normalizer::from_config(cfg),
            sort_policy: cfg.sort_policy,
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// One full run up to (not including) publish.
    ///
    /// Source failures are isolated; only an orchestration fault (a fetch task
    /// that panicked or was cancelled) makes the run fail as a whole.
    pub async fn run(&self) -> Result<Snapshot> {
        crate::metrics::ensure_described();

        let fetched = self.fetch_all().await?;
        let mut stats = RunStats {
            sources_ok: fetched.sources_ok,
            sources_failed: fetched.sources_failed,
            fetched: fetched.items.len(),
            ..RunStats::default()
        };
        counter!("news_items_fetched_total").increment(stats.fetched as u64);

        let articles = self.process(fetched.items, &mut stats);

        Ok(Snapshot {
            articles,
            generated_at: Some(Utc::now()),
            stats,
        })
    }

    /// Fan out one task per source and wait for all of them (join barrier).
    pub async fn fetch_all(&self) -> Result<FetchOutcome> {
        let handles: Vec<_> = self
            .sources
            .iter()
            .cloned()
            .map(|source| {
                let client = Arc::clone(&self.client);
                let timeout = self.fetch_timeout;
                tokio::spawn(async move {
                    // Bound here too, so a client that ignores its timeout cannot stall the run.
                    let res = match tokio::time::timeout(timeout, client.fetch(&source, timeout)).await {
                        Ok(res) => res,
                        Err(_) => Err(FetchError::Timeout(timeout)),
                    };
                    (source, res)
                })
            })
            .collect();

        let mut out = FetchOutcome::default();
        for handle in handles {
            let (source, res) = handle
                .await
                .map_err(|e| anyhow!("feed task failed: {e}"))?;
            match res {
                Ok(mut items) => {
                    tracing::info!(target: "pipeline", source = %source, items = items.len(), "source fetched");
                    out.sources_ok += 1;
                    out.items.append(&mut items);
                }
                Err(e) => {
                    tracing::warn!(target: "pipeline", source = %source, error = %e, "source failed; contributing no items");
                    counter!("news_source_errors_total").increment(1);
                    out.sources_failed += 1;
                }
            }
        }
        Ok(out)
    }

    /// Filter, normalize, dedup and sort items that are already in pipeline order.
    pub fn process(&self, raw: Vec<RawItem>, stats: &mut RunStats) -> Vec<Article> {
        let mut articles = Vec::with_capacity(raw.len());
        for item in raw {
            if !self.relevance.is_relevant(&item) {
                stats.filtered += 1;
                continue;
            }
            match self.normalizer.normalize(&item) {
                Ok(a) => articles.push(a),
                Err(e) => {
                    tracing::debug!(target: "pipeline", error = %e, "item rejected");
                    stats.rejected += 1;
                }
            }
        }

        let (mut articles, deduped) = dedup_last_wins(articles);
        sort_articles(&mut articles, self.sort_policy);

        stats.deduped = deduped;
        stats.kept = articles.len();
        counter!("news_items_filtered_total").increment(stats.filtered as u64);
        counter!("news_items_rejected_total").increment(stats.rejected as u64);
        counter!("news_dedup_total").increment(deduped as u64);
        articles
    }
}

/// Keyed last-write-wins merge over pipeline order.
///
/// The survivor for a link is the *last* article carrying it; it takes the slot
/// of the first occurrence. Returns (unique articles, number replaced).
pub fn dedup_last_wins(articles: Vec<Article>) -> (Vec<Article>, usize) {
    let mut slot_by_link: HashMap<String, usize> = HashMap::with_capacity(articles.len());
    let mut out: Vec<Article> = Vec::with_capacity(articles.len());
    let mut replaced = 0usize;

    for a in articles {
        match slot_by_link.get(&a.link) {
            Some(&idx) => {
                out[idx] = a;
                replaced += 1;
            }
            None => {
                slot_by_link.insert(a.link.clone(), out.len());
                out.push(a);
            }
        }
    }
    (out, replaced)
}

/// Stable sort; `None` timestamps sort after every known one.
pub fn sort_articles(articles: &mut [Article], policy: SortPolicy) {
    match policy {
        SortPolicy::Recency => articles.sort_by(|a, b| b.published.cmp(&a.published)),
        SortPolicy::PoliticsFirst => articles.sort_by(|a, b| {
            let pa = a.category == Category::Politics;
            let pb = b.category == Category::Politics;
            pb.cmp(&pa).then_with(|| b.published.cmp(&a.published))
        }),
    }
}

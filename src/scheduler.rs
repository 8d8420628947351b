// src/scheduler.rs
//! Periodic refresh: run the pipeline at startup and then on a fixed interval.
//!
//! Overlap policy is skip-if-busy. The loop awaits each run before waiting for
//! the next tick (missed ticks are skipped), and `run_once` refuses to start
//! while another run is still in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::cache::NewsCache;
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Snapshot with this many articles was published.
    Published(usize),
    /// A run was already in flight; nothing happened.
    Skipped,
    /// The run aborted; the previous snapshot stays visible.
    Failed,
}

pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    cache: Arc<NewsCache>,
    running: AtomicBool,
}

/// Holds the in-flight flag; released on drop, including when the run future
/// is cancelled or unwinds.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Scheduler {
    pub fn new(pipeline: Arc<Pipeline>, cache: Arc<NewsCache>) -> Self {
        Self {
            pipeline,
            cache,
            running: AtomicBool::new(false),
        }
    }

    /// Run the pipeline once and publish on success.
    pub async fn run_once(&self) -> RunOutcome {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            info!(target: "scheduler", "run already in progress, skipping");
            counter!("news_runs_skipped_total").increment(1);
            return RunOutcome::Skipped;
        };

        info!(target: "scheduler", sources = self.pipeline.sources().len(), "fetching news");
        match self.pipeline.run().await {
            Ok(snapshot) => {
                let n = snapshot.len();
                let stats = snapshot.stats;
                let ts = snapshot.generated_at.map(|t| t.timestamp()).unwrap_or_default();
                self.cache.publish(snapshot);

                counter!("news_runs_total").increment(1);
                gauge!("news_snapshot_articles").set(n as f64);
                gauge!("news_last_run_ts").set(ts as f64);
                info!(
                    target: "scheduler",
                    articles = n,
                    fetched = stats.fetched,
                    filtered = stats.filtered,
                    rejected = stats.rejected,
                    deduped = stats.deduped,
                    sources_failed = stats.sources_failed,
                    "news fetch complete"
                );
                RunOutcome::Published(n)
            }
            Err(e) => {
                counter!("news_run_failures_total").increment(1);
                error!(target: "scheduler", error = ?e, "run failed, keeping previous snapshot");
                RunOutcome::Failed
            }
        }
    }

    /// Spawn the background loop. The first tick fires immediately.
    pub fn spawn(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let this = Arc::clone(self);
        info!(target: "scheduler", interval_secs = every.as_secs(), "news refresh loop started");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                this.run_once().await;
            }
        })
    }
}

// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod classify;
pub mod config;
pub mod feed;
pub mod media;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod relevance;
pub mod scheduler;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::cache::NewsCache;
pub use crate::config::NewsConfig;
pub use crate::feed::{FeedClient, FetchError, HttpFeedClient, RawItem};
pub use crate::pipeline::{Pipeline, SortPolicy};
pub use crate::scheduler::{RunOutcome, Scheduler};
pub use crate::types::{Article, Category, Media, MediaKind, Snapshot};

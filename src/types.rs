// src/types.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Topical bucket assigned by the classifier. Exactly one per article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Economy,
    Politics,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Media attached to an article. Both fields are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Media {
    pub kind: MediaKind,
    pub url: String,
}

impl Media {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            url: url.into(),
        }
    }
}

/// Canonical record served by `/news`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub published: Option<DateTime<Utc>>, // None = unknown, sorts as oldest
    pub snippet: String,
    pub source: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
}

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub fetched: usize,
    pub filtered: usize,
    pub rejected: usize,
    pub deduped: usize,
    pub kept: usize,
}

/// One immutable, ordered, link-unique result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub articles: Vec<Article>,
    pub generated_at: Option<DateTime<Utc>>, // None before the first publish
    pub stats: RunStats,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

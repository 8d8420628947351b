// src/feed/mod.rs
//! Feed retrieval: the raw item shape and the client seam the pipeline talks to.

pub mod rss;

use std::time::Duration;

use thiserror::Error;

pub use self::rss::{parse_feed, HttpFeedClient};

/// Structured media entry (`media:content` / `media:thumbnail`). Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaDescriptor {
    pub url: Option<String>,
    pub medium: Option<String>,   // "image" | "video" | ...
    pub mime_type: Option<String>, // e.g. "image/jpeg"
}

/// `<enclosure url=".." type="..">`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enclosure {
    pub url: Option<String>,
    pub mime_type: Option<String>,
}

/// Unprocessed item as returned by a feed client. Nothing is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub content: Option<String>, // may contain HTML
    pub media: Vec<MediaDescriptor>,
    pub enclosures: Vec<Enclosure>, // document order; feeds may repeat <enclosure>
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("feed parse error: {0}")]
    Parse(String),
}

/// One feed source. Implementations must not panic on network or parse
/// failures and must respect `timeout` for the whole call.
#[async_trait::async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, source: &str, timeout: Duration) -> Result<Vec<RawItem>, FetchError>;
}

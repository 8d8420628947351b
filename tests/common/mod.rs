// tests/common/mod.rs
// Shared in-memory feed client + builders for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use cameroon_news::{FeedClient, FetchError, NewsConfig, RawItem};

pub enum Behavior {
    Items(Vec<RawItem>),
    Fail,
    /// Never answers on its own; the pipeline timeout has to cut it.
    Hang,
    /// Signals `entered`, then waits for `release`.
    Gate {
        entered: Arc<Notify>,
        release: Arc<Notify>,
        items: Vec<RawItem>,
    },
    Panic,
}

#[derive(Default)]
pub struct MockFeeds {
    by_source: HashMap<String, Behavior>,
}

impl MockFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: &str, behavior: Behavior) -> Self {
        self.by_source.insert(source.to_string(), behavior);
        self
    }
}

#[async_trait]
impl FeedClient for MockFeeds {
    async fn fetch(&self, source: &str, _timeout: Duration) -> Result<Vec<RawItem>, FetchError> {
        match self.by_source.get(source) {
            Some(Behavior::Items(items)) => Ok(items.clone()),
            Some(Behavior::Fail) | None => Err(FetchError::Status(503)),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Ok(Vec::new())
            }
            Some(Behavior::Gate {
                entered,
                release,
                items,
            }) => {
                entered.notify_one();
                release.notified().await;
                Ok(items.clone())
            }
            Some(Behavior::Panic) => panic!("feed client blew up"),
        }
    }
}

pub fn config_for(sources: &[&str]) -> NewsConfig {
    NewsConfig {
        sources: sources.iter().map(|s| s.to_string()).collect(),
        fetch_timeout_secs: 2,
        ..NewsConfig::default()
    }
}

pub fn item(title: &str, link: &str, published: Option<&str>, content: Option<&str>) -> RawItem {
    RawItem {
        title: Some(title.to_string()),
        link: Some(link.to_string()),
        published: published.map(str::to_string),
        content: content.map(str::to_string),
        ..RawItem::default()
    }
}

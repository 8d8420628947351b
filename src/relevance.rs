// src/relevance.rs
//! Relevance gate: does an item talk about the topic at all?
//!
//! Plain case-insensitive substring matching over title + body text, so
//! "Cameroonian" matches the keyword "cameroon". Markup is stripped first;
//! a keyword inside an `href` or `src` is not a mention. There are no blockers.

use crate::feed::RawItem;
use crate::normalize::clean_text;

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>, // lowercase
}

impl RelevanceFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// True if `text` contains any inclusion keyword.
    pub fn matches(&self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let folded = text.to_lowercase();
        self.keywords.iter().any(|k| folded.contains(k.as_str()))
    }

    /// Combined title + body text of a raw item. Missing text is simply not matched.
    pub fn is_relevant(&self, item: &RawItem) -> bool {
        let text = format!(
            "{} {}",
            clean_text(item.title.as_deref().unwrap_or_default()),
            clean_text(item.content.as_deref().unwrap_or_default())
        );
        self.matches(text.trim())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

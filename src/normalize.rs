// src/normalize.rs
//! RawItem → Article: link validation, text cleanup, timestamp parsing,
//! classification and media extraction.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use thiserror::Error;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::classify::Classifier;
use crate::config::NewsConfig;
use crate::feed::RawItem;
use crate::media::extract_media;
use crate::types::Article;

pub const UNTITLED: &str = "Untitled";

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]*>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("item has no link")]
    MissingLink,

    #[error("link is not a valid http(s) URL: {0}")]
    InvalidLink(String),
}

/// Plain text from an HTML fragment: strip tags, decode entities,
/// normalize curly quotes, collapse whitespace.
pub fn clean_text(s: &str) -> String {
    // Tags first so an escaped `&lt;b&gt;` survives as literal text.
    let stripped = RE_TAGS.replace_all(s, " ");
    let mut out = html_escape::decode_html_entities(&stripped).to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");

    RE_WS.replace_all(&out, " ").trim().to_string()
}

/// Cap to `max_chars` characters; a trailing `…` marks truncation and counts toward the cap.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.truncate(out.trim_end().len());
    out.push('…');
    out
}

/// Host of `link` with a single leading `www.` removed.
pub fn source_host(link: &str) -> Result<String, NormalizeError> {
    let url = Url::parse(link).map_err(|_| NormalizeError::InvalidLink(link.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(NormalizeError::InvalidLink(link.to_string()));
    }
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| NormalizeError::InvalidLink(link.to_string()))?
        .to_ascii_lowercase();
    Ok(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Loosely-formatted feed timestamp → instant. Unparsable input is unknown (None).
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let ts = raw.trim();
    if ts.is_empty() {
        return None;
    }
    OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()
        .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond()))
        .or_else(|| {
            // named zones (EST, GMT, ...) and other lenient RFC 2822 variants
            DateTime::parse_from_rfc2822(ts)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc())
        })
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    classifier: Classifier,
    snippet_max_chars: usize,
}

impl Normalizer {
    pub fn new(classifier: Classifier, snippet_max_chars: usize) -> Self {
        Self {
            classifier,
            snippet_max_chars,
        }
    }

    pub fn from_config(cfg: &NewsConfig) -> Self {
        Self::new(Classifier::from_keywords(&cfg.keywords), cfg.snippet_max_chars)
    }

    pub fn normalize(&self, item: &RawItem) -> Result<Article, NormalizeError> {
        let link = item
            .link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or(NormalizeError::MissingLink)?;
        let source = source_host(link)?;

        let title = item
            .title
            .as_deref()
            .map(clean_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let snippet = truncate_chars(
            &clean_text(item.content.as_deref().unwrap_or_default()),
            self.snippet_max_chars,
        );

        let category = self.classifier.classify(&title, &snippet);

        Ok(Article {
            published: item.published.as_deref().and_then(parse_published),
            media: extract_media(item),
            link: link.to_string(),
            title,
            snippet,
            source,
            category,
        })
    }
}

// src/config.rs
//! Static service configuration: feed sources, keyword sets, timeouts.
//!
//! Loaded once at startup from TOML (or built-in defaults) and never mutated
//! afterwards. Environment variables can override the port and the timing knobs.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::SortPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "config/news.toml";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30 * 60;
pub const DEFAULT_SNIPPET_MAX_CHARS: usize = 150;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_PORT: &str = "PORT";
pub const ENV_REFRESH_SECS: &str = "NEWS_REFRESH_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "NEWS_FETCH_TIMEOUT_SECS";

const DEFAULT_SOURCES: &[&str] = &[
    // AllAfrica headlines, already scoped to Cameroon (French + English)
    "https://fr.allafrica.com/tools/headlines/rdf/cameroon/headlines.rdf",
    "https://allafrica.com/tools/headlines/rdf/cameroon/headlines.rdf",
    // Africanews, whole continent
    "https://www.africanews.com/feed/rss",
];

const DEFAULT_RELEVANCE: &[&str] = &[
    "cameroon",
    "cameroun",
    "yaoundé",
    "yaounde",
    "douala",
    "biya",
    "lions indomptables",
    "indomitable lions",
];

const DEFAULT_SPORTS: &[&str] = &[
    "football",
    "soccer",
    "match",
    "lions indomptables",
    "indomitable lions",
    "fecafoot",
    "can 20",
    "afcon",
    "coupe du monde",
    "world cup",
    "championnat",
    "league",
    "basket",
    "handball",
    "athlét",
    "athlet",
    "boxe",
    "boxing",
    "tennis",
    "olymp",
    "sportif",
    "sportive",
    // English "sports" without the bare stem, which also hits "transports"
    "sports minist",
    "minister of sports",
    "des sports",
    "sporting",
    "sportsman",
    "sportswoman",
    "sports news",
];

const DEFAULT_ECONOMY: &[&str] = &[
    "économie",
    "economie",
    "economy",
    "economic",
    "business",
    "finance",
    "budget",
    "fcfa",
    "cfa franc",
    "banque",
    "bank",
    "investissement",
    "investment",
    "croissance",
    "growth",
    "inflation",
    "commerce",
    "trade",
    "pétrole",
    "petrol",
    "cacao",
    "cocoa",
    "imf",
    "fmi",
    "marché",
    "market",
];

const DEFAULT_POLITICS: &[&str] = &[
    "politique",
    "politics",
    "political",
    "président",
    "president",
    "gouvernement",
    "government",
    "ministre",
    "minister",
    "élection",
    "election",
    "parlement",
    "parliament",
    "assemblée nationale",
    "national assembly",
    "sénat",
    "senate",
    "biya",
    "rdpc",
    "cpdm",
    "opposition",
    "anglophone",
];

/// Keyword sets, all matched as lowercase substrings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeywordSets {
    pub relevance: Vec<String>,
    pub sports: Vec<String>,
    pub economy: Vec<String>,
    pub politics: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            relevance: owned(DEFAULT_RELEVANCE),
            sports: owned(DEFAULT_SPORTS),
            economy: owned(DEFAULT_ECONOMY),
            politics: owned(DEFAULT_POLITICS),
        }
    }
}

/// Whole service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub port: u16,
    pub sources: Vec<String>,
    pub fetch_timeout_secs: u64,
    pub refresh_interval_secs: u64,
    pub snippet_max_chars: usize,
    pub sort_policy: SortPolicy,
    pub keywords: KeywordSets,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            sources: owned(DEFAULT_SOURCES),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            snippet_max_chars: DEFAULT_SNIPPET_MAX_CHARS,
            sort_policy: SortPolicy::default(),
            keywords: KeywordSets::default(),
        }
    }
}

impl NewsConfig {
    /// Resolve configuration using env var + fallbacks:
    /// 1) $NEWS_CONFIG_PATH (must exist)
    /// 2) config/news.toml
    /// 3) built-in defaults
    ///
    /// Env overrides ($PORT, $NEWS_REFRESH_SECS, $NEWS_FETCH_TIMEOUT_SECS) are applied last.
    pub fn load() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::from_path(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::from_path(&default_p)?
            } else {
                Self::default().cleaned()
            }
        };
        base.with_env_overrides()
    }

    /// Load from an explicit TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing news config at {}", path.display()))
    }

    /// Parse from a TOML string. Missing keys fall back to defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: NewsConfig = toml::from_str(s)?;
        let cfg = cfg.cleaned();
        if cfg.sources.is_empty() {
            return Err(anyhow!("news config lists no feed sources"));
        }
        if cfg.fetch_timeout_secs == 0 || cfg.refresh_interval_secs == 0 {
            return Err(anyhow!("timeouts and intervals must be > 0"));
        }
        Ok(cfg)
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(port) = parse_env::<u16>(ENV_PORT)? {
            self.port = port;
        }
        if let Some(secs) = parse_env::<u64>(ENV_REFRESH_SECS)?.filter(|s| *s > 0) {
            self.refresh_interval_secs = secs;
        }
        if let Some(secs) = parse_env::<u64>(ENV_FETCH_TIMEOUT_SECS)?.filter(|s| *s > 0) {
            self.fetch_timeout_secs = secs;
        }
        Ok(self)
    }

    /// Trim + lowercase keywords, drop empties, trim source addresses.
    fn cleaned(mut self) -> Self {
        self.sources = self
            .sources
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let kw = &mut self.keywords;
        for set in [
            &mut kw.relevance,
            &mut kw.sports,
            &mut kw.economy,
            &mut kw.politics,
        ] {
            *set = clean_keywords(std::mem::take(set));
        }
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("{name} has an invalid value: {raw}")),
        _ => Ok(None),
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn defaults_are_sane() {
        let cfg = NewsConfig::default();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.sources.len(), 3);
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(1800));
        assert_eq!(cfg.snippet_max_chars, 150);
        assert_eq!(cfg.sort_policy, SortPolicy::Recency);
        assert!(cfg.keywords.relevance.contains(&"cameroon".to_string()));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults_and_cleans_keywords() {
        let toml = r#"
sources = [" https://a.test/feed ", ""]
snippet_max_chars = 80
sort_policy = "politics_first"

[keywords]
relevance = [" Cameroon ", "CAMEROON", ""]
"#;
        let cfg = NewsConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.sources, vec!["https://a.test/feed".to_string()]);
        assert_eq!(cfg.snippet_max_chars, 80);
        assert_eq!(cfg.sort_policy, SortPolicy::PoliticsFirst);
        assert_eq!(cfg.keywords.relevance, vec!["cameroon".to_string()]);
        // untouched sets keep their defaults
        assert!(cfg.keywords.sports.contains(&"football".to_string()));
        assert_eq!(cfg.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
    }

    #[test]
    fn empty_source_list_is_rejected() {
        assert!(NewsConfig::from_toml_str("sources = []").is_err());
        assert!(NewsConfig::from_toml_str("fetch_timeout_secs = 0").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn load_uses_env_path_then_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("news.toml");
        fs::write(&p, "port = 4000\nsources = [\"https://x.test/rss\"]\n").unwrap();

        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::remove_var(ENV_PORT);
        env::set_var(ENV_REFRESH_SECS, "60");
        let cfg = NewsConfig::load().unwrap();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.refresh_interval_secs, 60);
        assert_eq!(cfg.sources, vec!["https://x.test/rss".to_string()]);

        env::set_var(ENV_PORT, "8081");
        assert_eq!(NewsConfig::load().unwrap().port, 8081);

        env::set_var(ENV_PORT, "not-a-port");
        assert!(NewsConfig::load().is_err());

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(NewsConfig::load().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_PORT);
        env::remove_var(ENV_REFRESH_SECS);
    }
}

// src/classify.rs
//! Keyword classifier. Sets are checked in a fixed order and the first set
//! with a substring hit decides: sports > economy > politics > other.

use crate::config::KeywordSets;
use crate::types::Category;

#[derive(Debug, Clone)]
pub struct Classifier {
    // Order is the tie-break policy; never reorder.
    rules: [(Category, Vec<String>); 3],
}

impl Classifier {
    pub fn new(sports: Vec<String>, economy: Vec<String>, politics: Vec<String>) -> Self {
        let lower = |v: Vec<String>| -> Vec<String> {
            v.into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect()
        };
        Self {
            rules: [
                (Category::Sports, lower(sports)),
                (Category::Economy, lower(economy)),
                (Category::Politics, lower(politics)),
            ],
        }
    }

    pub fn from_keywords(kw: &KeywordSets) -> Self {
        Self::new(kw.sports.clone(), kw.economy.clone(), kw.politics.clone())
    }

    pub fn classify(&self, title: &str, snippet: &str) -> Category {
        let text = format!("{title} {snippet}").to_lowercase();
        self.rules
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w.as_str())))
            .map(|(cat, _)| *cat)
            .unwrap_or(Category::Other)
    }
}

//! Keyword-table document classifier.
//!
//! A [`Classifier`] holds an ordered list of [`Category`] entries, each
//! with representative keywords. Classification counts whole-word,
//! case-insensitive occurrences of every keyword, sums them per category,
//! and picks the highest-scoring category if its share of all hits
//! reaches the confidence threshold. Otherwise the text is
//! [`OTHER`].
//!
//! The classifier is built once from configuration and shared by
//! reference; it is never mutated.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::text::{count_whole_words, fold_chars};

/// Label for text that matches no category strongly enough.
pub const OTHER: &str = "Other";

/// Minimum `best / total` share for a category to win.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.30;

/// One named category and its keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Built-in category table.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "Academic Research",
            &["research", "study", "academic", "methodology"],
        ),
        Category::new(
            "Technical Documentation",
            &["technical", "documentation", "guide", "framework"],
        ),
        Category::new(
            "Business Report",
            &["business", "report", "finance", "strategy"],
        ),
        Category::new(
            "Educational Material",
            &["educational", "learning", "tutorial", "course"],
        ),
        Category::new(
            "Legal Document",
            &["legal", "contract", "agreement", "compliance"],
        ),
        Category::new(
            "News Article",
            &["news", "article", "journalism", "current events"],
        ),
        Category::new(
            "Scientific Paper",
            &["scientific", "paper", "climate", "environment"],
        ),
    ]
}

/// Full classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Winning category name, or [`OTHER`].
    pub category: String,
    /// `best / total` keyword hits; `0.0` when nothing matched.
    pub confidence: f64,
    /// Per-category hit counts, in configuration order.
    pub scores: Vec<(String, usize)>,
}

struct CompiledCategory {
    name: String,
    keywords: Vec<Vec<char>>,
}

/// Immutable keyword classifier.
pub struct Classifier {
    categories: Vec<CompiledCategory>,
    min_confidence: f64,
}

impl Classifier {
    /// Build a classifier. Fails on an empty table, a category without
    /// keywords, or a threshold outside `[0, 1]`.
    pub fn new(categories: &[Category], min_confidence: f64) -> Result<Self> {
        if categories.is_empty() {
            bail!("classifier requires at least one category");
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            bail!("classifier min_confidence must be in [0.0, 1.0]");
        }
        for cat in categories {
            if cat.name.trim().is_empty() {
                bail!("classifier category name must not be empty");
            }
            if cat.name == OTHER {
                bail!("'{}' is reserved and cannot be a configured category", OTHER);
            }
            if cat.keywords.iter().all(|k| k.trim().is_empty()) {
                bail!("classifier category '{}' has no keywords", cat.name);
            }
        }
        Ok(Self::compile(categories, min_confidence))
    }

    /// Classifier over [`default_categories`] with the default threshold.
    pub fn with_defaults() -> Self {
        Self::compile(&default_categories(), DEFAULT_MIN_CONFIDENCE)
    }

    fn compile(categories: &[Category], min_confidence: f64) -> Self {
        let categories = categories
            .iter()
            .map(|cat| CompiledCategory {
                name: cat.name.clone(),
                keywords: cat
                    .keywords
                    .iter()
                    .map(|k| fold_chars(k.trim()))
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self {
            categories,
            min_confidence,
        }
    }

    /// Configured category names, in order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    /// Category name for `text`.
    pub fn classify(&self, text: &str) -> String {
        self.score(text).category
    }

    /// Score `text` against every category.
    pub fn score(&self, text: &str) -> Classification {
        let haystack = fold_chars(text);

        let scores: Vec<(String, usize)> = self
            .categories
            .iter()
            .map(|cat| {
                let hits = cat
                    .keywords
                    .iter()
                    .map(|kw| count_whole_words(&haystack, kw))
                    .sum();
                (cat.name.clone(), hits)
            })
            .collect();

        let total: usize = scores.iter().map(|(_, s)| s).sum();
        if total == 0 {
            return Classification {
                category: OTHER.to_string(),
                confidence: 0.0,
                scores,
            };
        }

        // first category reaching the max wins
        let mut best = 0;
        for (i, (_, s)) in scores.iter().enumerate() {
            if *s > scores[best].1 {
                best = i;
            }
        }

        let confidence = scores[best].1 as f64 / total as f64;
        let category = if confidence < self.min_confidence {
            OTHER.to_string()
        } else {
            scores[best].0.clone()
        };

        Classification {
            category,
            confidence,
            scores,
        }
    }
}

//! Corpus statistics.
//!
//! Aggregates document counts, sizes, classification distribution, keyword
//! frequencies, and search activity into a single serializable
//! [`Statistics`] value. Used by `doclens stats` and `GET /api/statistics`.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::Document;

const TOP_KEYWORDS: usize = 10;
const TOP_SEARCH_TERMS: usize = 10;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub documents: DocumentTotals,
    pub classifications: Vec<ClassificationShare>,
    pub keywords: KeywordSummary,
    pub search: SearchSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentTotals {
    pub total: usize,
    pub total_size_mb: f64,
    pub total_words: usize,
    pub average_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationShare {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordSummary {
    pub total_unique: usize,
    pub top_keywords: Vec<TermCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSummary {
    pub total_searches: usize,
    pub popular_terms: Vec<TermCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub frequency: usize,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Count occurrences, keeping first-seen order, then stable-sort by count.
fn ranked<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> (usize, Vec<TermCount>) {
    let mut order: Vec<TermCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for item in items {
        match index.get(item) {
            Some(&i) => order[i].frequency += 1,
            None => {
                index.insert(item, order.len());
                order.push(TermCount {
                    term: item.to_string(),
                    frequency: 1,
                });
            }
        }
    }
    let unique = order.len();
    order.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    order.truncate(limit);
    (unique, order)
}

/// Compute statistics over `docs` and the logged search queries.
pub fn compute(docs: &[Document], searches: &[String]) -> Statistics {
    let total = docs.len();
    let total_bytes: u64 = docs.iter().map(|d| d.file_size).sum();
    let total_words: usize = docs.iter().map(|d| d.word_count).sum();
    let average_confidence = if total > 0 {
        docs.iter().map(|d| d.confidence_score).sum::<f64>() / total as f64
    } else {
        0.0
    };

    let (_, class_counts) = ranked(docs.iter().map(|d| d.classification.as_str()), usize::MAX);
    // distribution keeps first-seen order rather than rank order
    let mut classifications: Vec<ClassificationShare> = Vec::new();
    for d in docs {
        if classifications.iter().any(|c| c.name == d.classification) {
            continue;
        }
        let count = class_counts
            .iter()
            .find(|c| c.term == d.classification)
            .map(|c| c.frequency)
            .unwrap_or(0);
        classifications.push(ClassificationShare {
            name: d.classification.clone(),
            count,
            percentage: round2(count as f64 / total as f64 * 100.0),
        });
    }

    let (total_unique, top_keywords) = ranked(
        docs.iter().flat_map(|d| d.keywords.iter().map(String::as_str)),
        TOP_KEYWORDS,
    );

    let search_terms: Vec<String> = searches
        .iter()
        .flat_map(|q| q.split_whitespace())
        .map(str::to_lowercase)
        .collect();
    let (_, popular_terms) = ranked(search_terms.iter().map(String::as_str), TOP_SEARCH_TERMS);

    Statistics {
        documents: DocumentTotals {
            total,
            total_size_mb: round2(total_bytes as f64 / BYTES_PER_MB),
            total_words,
            average_confidence: round2(average_confidence),
        },
        classifications,
        keywords: KeywordSummary {
            total_unique,
            top_keywords,
        },
        search: SearchSummary {
            total_searches: searches.len(),
            popular_terms,
        },
    }
}

/// Sorted, unique classifications present in `docs`.
pub fn classifications(docs: &[Document]) -> Vec<String> {
    let mut names: Vec<String> = docs.iter().map(|d| d.classification.clone()).collect();
    names.sort();
    names.dedup();
    names
}

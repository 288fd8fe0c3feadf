//! Corpus search with keyword, phrase, exact, and fuzzy modes.
//!
//! The engine is a pure function over an in-memory corpus snapshot. The
//! calling application loads the snapshot from a
//! [`DocumentStore`](crate::store::DocumentStore), validates the query, and
//! parses the mode string into a [`SearchMode`].
//!
//! # Scoring
//!
//! | Mode | Rule |
//! |------|------|
//! | `keyword` | per term: occurrences in content + 2 if the term is a document keyword |
//! | `phrase` | 10 if the whole query occurs in content |
//! | `exact` | 20 if the query equals the content, else 10 if it occurs in it |
//! | `fuzzy` | per term: 1 if some content word contains it or is contained by it |
//!
//! Documents scoring 0 are dropped. The rest are sorted by score
//! descending with a stable sort, so ties keep corpus order.
//!
//! Every mode matches substrings, so highlights and snippets use
//! [`MatchStyle::Partial`]: any occurrence that scored is also marked.
//! Query and content are compared after [`fold`](crate::text::fold), the
//! same per-character folding the highlighter uses.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::highlight::{highlight, MatchStyle};
use crate::models::{Document, SearchResult};
use crate::snippet::{extract_snippets, SnippetOptions};
use crate::text::fold_str;

const KEYWORD_MATCH_WEIGHT: u64 = 2;
const PHRASE_SCORE: u64 = 10;
const EXACT_SCORE: u64 = 20;

/// Search matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Keyword,
    Phrase,
    Exact,
    Fuzzy,
}

impl SearchMode {
    pub const ALL: [SearchMode; 4] = [
        SearchMode::Keyword,
        SearchMode::Phrase,
        SearchMode::Exact,
        SearchMode::Fuzzy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Phrase => "phrase",
            SearchMode::Exact => "exact",
            SearchMode::Fuzzy => "fuzzy",
        }
    }

    /// Split a normalized query into the terms this mode scores.
    fn terms(&self, query: &str) -> Vec<String> {
        match self {
            SearchMode::Keyword | SearchMode::Fuzzy => {
                query.split_whitespace().map(str::to_string).collect()
            }
            SearchMode::Phrase | SearchMode::Exact => vec![query.to_string()],
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" => Ok(SearchMode::Keyword),
            "phrase" => Ok(SearchMode::Phrase),
            "exact" => Ok(SearchMode::Exact),
            "fuzzy" => Ok(SearchMode::Fuzzy),
            other => bail!(
                "Unknown search mode: {}. Use keyword, phrase, exact, or fuzzy.",
                other
            ),
        }
    }
}

/// Search `corpus` for `query`.
///
/// An empty or whitespace-only query yields no results.
pub fn search(
    corpus: &[Document],
    query: &str,
    mode: SearchMode,
    opts: &SnippetOptions,
) -> Vec<SearchResult> {
    let query = fold_str(query.trim());
    let terms = mode.terms(&query);
    if terms.is_empty() || query.is_empty() {
        return Vec::new();
    }

    let style = MatchStyle::Partial;
    let mut results: Vec<SearchResult> = corpus
        .iter()
        .filter_map(|doc| {
            let (score, matched_terms) = score_document(doc, &query, &terms, mode);
            if score == 0 {
                return None;
            }
            Some(SearchResult {
                document_id: doc.id.clone(),
                relevance_score: score,
                highlighted_snippet: highlight(&doc.content_preview, &matched_terms, style),
                text_snippets: extract_snippets(&doc.content, &matched_terms, opts, style),
                matched_terms,
            })
        })
        .collect();

    results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    tracing::debug!(
        mode = mode.as_str(),
        corpus = corpus.len(),
        results = results.len(),
        "search complete"
    );
    results
}

/// Score one document. Returns the score and the matched terms in
/// query order without duplicates.
fn score_document(
    doc: &Document,
    query: &str,
    terms: &[String],
    mode: SearchMode,
) -> (u64, Vec<String>) {
    let content = fold_str(&doc.content);
    let mut score = 0u64;
    let mut matched: Vec<String> = Vec::new();

    match mode {
        SearchMode::Keyword => {
            for term in terms {
                let in_content = content.matches(term.as_str()).count() as u64;
                let in_keywords = doc
                    .keywords
                    .iter()
                    .filter(|kw| fold_str(kw) == *term)
                    .count() as u64;
                score += in_content + in_keywords * KEYWORD_MATCH_WEIGHT;
                if in_content > 0 || in_keywords > 0 {
                    mark(term, &mut matched);
                }
            }
        }
        SearchMode::Phrase => {
            if content.contains(query) {
                score += PHRASE_SCORE;
                mark(query, &mut matched);
            }
        }
        SearchMode::Exact => {
            if content == query {
                score += EXACT_SCORE;
                mark(query, &mut matched);
            } else if content.contains(query) {
                score += PHRASE_SCORE;
                mark(query, &mut matched);
            }
        }
        SearchMode::Fuzzy => {
            let words: Vec<&str> = content.split_whitespace().collect();
            for term in terms {
                // at most one point per term
                if words
                    .iter()
                    .any(|w| w.contains(term.as_str()) || term.contains(*w))
                {
                    score += 1;
                    mark(term, &mut matched);
                }
            }
        }
    }

    (score, matched)
}

fn mark(term: &str, matched: &mut Vec<String>) {
    if !matched.iter().any(|m| m == term) {
        matched.push(term.to_string());
    }
}

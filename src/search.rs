//! Search over the stored corpus.
//!
//! Loads a corpus snapshot from the store, runs the core engine, logs the
//! query, and joins each hit with its document's title and classification.
//! Used by both `doclens search` and `GET /api/search`.

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashMap;

use doclens_core::models::{Document, SearchResult};
use doclens_core::search::{search, SearchMode};
use doclens_core::store::DocumentStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// One ranked hit with the document fields a client needs to display it.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub classification: String,
    pub confidence_score: f64,
    #[serde(flatten)]
    pub result: SearchResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    /// Matches before `limit` is applied.
    pub total_results: usize,
    pub results: Vec<SearchHit>,
}

/// Run a search and record it in the search log.
///
/// Fails on an empty query; the engine itself never sees one.
pub async fn search_documents<S: DocumentStore + ?Sized>(
    config: &Config,
    store: &S,
    query: &str,
    mode: SearchMode,
    limit: Option<usize>,
) -> Result<SearchResponse> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Search query is required");
    }

    let corpus = store.corpus().await?;
    let results = search(&corpus, query, mode, &config.search.snippet_options());
    store.record_search(query, mode).await?;

    let total_results = results.len();
    tracing::info!(mode = mode.as_str(), results = total_results, "search");

    let by_id: HashMap<&str, &Document> = corpus.iter().map(|d| (d.id.as_str(), d)).collect();
    let results = results
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .filter_map(|result| {
            let doc = by_id.get(result.document_id.as_str())?;
            Some(SearchHit {
                title: doc.title.clone(),
                classification: doc.classification.clone(),
                confidence_score: doc.confidence_score,
                result,
            })
        })
        .collect();

    Ok(SearchResponse {
        query: query.to_string(),
        mode,
        total_results,
        results,
    })
}

/// CLI entry point: search and print ranked results.
pub async fn run_search(
    config: &Config,
    query: &str,
    mode: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let mode = config.search.resolve_mode(mode)?;
    let store = SqliteStore::open(config).await?;
    let response = search_documents(config, &store, query, mode, limit).await;
    store.close().await;
    let response = response?;

    if response.results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in response.results.iter().enumerate() {
        println!(
            "{}. [{}] {} ({})",
            i + 1,
            hit.result.relevance_score,
            hit.title,
            hit.classification
        );
        println!("    matched: {}", hit.result.matched_terms.join(", "));
        println!(
            "    preview: \"{}\"",
            hit.result.highlighted_snippet.replace('\n', " ").trim()
        );
        for snippet in &hit.result.text_snippets {
            println!(
                "    @{}: \"{}\"",
                snippet.position,
                snippet.snippet.replace('\n', " ").trim()
            );
        }
        println!("    id: {}", hit.result.document_id);
        println!();
    }

    if response.total_results > response.results.len() {
        println!(
            "Showing {} of {} results.",
            response.results.len(),
            response.total_results
        );
    }

    Ok(())
}

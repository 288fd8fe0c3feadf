//! Corpus statistics and classification overview.
//!
//! Provides a quick summary of what's indexed: document and word counts,
//! classification distribution, top keywords, and search activity. Used by
//! `doclens stats`, `doclens categories`, `GET /api/statistics`, and
//! `GET /api/classifications`.

use anyhow::Result;

use doclens_core::stats::{self, Statistics};
use doclens_core::store::DocumentStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Compute statistics from the current corpus and search log.
pub async fn statistics<S: DocumentStore + ?Sized>(store: &S) -> Result<Statistics> {
    let corpus = store.corpus().await?;
    let history = store.search_history().await?;
    Ok(stats::compute(&corpus, &history))
}

/// Sorted, unique classifications present in the corpus.
pub async fn classifications<S: DocumentStore + ?Sized>(store: &S) -> Result<Vec<String>> {
    let corpus = store.corpus().await?;
    Ok(stats::classifications(&corpus))
}

/// Run the stats command: compute and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = statistics(&store).await;
    store.close().await;
    let s = result?;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("DocLens — Corpus Stats");
    println!("======================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Documents:   {}", s.documents.total);
    println!("  Total size:  {:.2} MB", s.documents.total_size_mb);
    println!("  Words:       {}", s.documents.total_words);
    println!("  Confidence:  {:.2} avg", s.documents.average_confidence);
    println!("  Searches:    {}", s.search.total_searches);

    if !s.classifications.is_empty() {
        println!();
        println!("  By classification:");
        println!("  {:<28} {:>6} {:>8}", "CLASSIFICATION", "DOCS", "SHARE");
        println!("  {}", "-".repeat(44));
        for c in &s.classifications {
            println!("  {:<28} {:>6} {:>7.2}%", c.name, c.count, c.percentage);
        }
    }

    if !s.keywords.top_keywords.is_empty() {
        println!();
        println!(
            "  Top keywords ({} unique): {}",
            s.keywords.total_unique,
            join_counts(s.keywords.top_keywords.iter().map(|t| (&t.term, t.frequency)))
        );
    }

    if !s.search.popular_terms.is_empty() {
        println!(
            "  Popular search terms:     {}",
            join_counts(s.search.popular_terms.iter().map(|t| (&t.term, t.frequency)))
        );
    }

    println!();
    Ok(())
}

/// Run the categories command: print classifications present in the corpus.
pub async fn run_categories(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let result = classifications(&store).await;
    store.close().await;
    let categories = result?;

    if categories.is_empty() {
        println!("No classified documents.");
        return Ok(());
    }
    for name in &categories {
        println!("{}", name);
    }
    Ok(())
}

fn join_counts<'a>(items: impl Iterator<Item = (&'a String, usize)>) -> String {
    items
        .map(|(term, n)| format!("{} ({})", term, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

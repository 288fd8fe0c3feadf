//! Document retrieval by ID and paginated listing.
//!
//! Used by `doclens get`, `doclens list`, `GET /api/documents/{id}`, and
//! `GET /api/documents`.

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use doclens_core::models::Document;
use doclens_core::store::DocumentStore;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 50;

/// Document metadata without the full text.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub extracted_title: String,
    pub classification: String,
    pub confidence_score: f64,
    pub keywords: Vec<String>,
    pub content_preview: String,
    pub word_count: usize,
    pub reading_time: usize,
    pub file_size: u64,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
}

impl From<Document> for DocumentSummary {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            extracted_title: doc.extracted_title,
            classification: doc.classification,
            confidence_score: doc.confidence_score,
            keywords: doc.keywords,
            content_preview: doc.content_preview,
            word_count: doc.word_count,
            reading_time: doc.reading_time,
            file_size: doc.file_size,
            file_type: doc.file_type,
            upload_date: doc.upload_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub pages: usize,
}

impl Pagination {
    /// Normalize requested paging: `page` at least 1, `per_page` in
    /// `1..=MAX_PER_PAGE`.
    pub fn new(page: Option<usize>, per_page: Option<usize>, total: usize) -> Self {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        Self {
            page,
            per_page,
            total,
            pages: total.div_ceil(per_page),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentPage {
    pub documents: Vec<DocumentSummary>,
    pub pagination: Pagination,
}

/// Fetch one document, failing if it does not exist.
pub async fn get_document<S: DocumentStore + ?Sized>(store: &S, id: &str) -> Result<Document> {
    match store.get_document(id).await? {
        Some(doc) => Ok(doc),
        None => bail!("document not found: {}", id),
    }
}

/// One page of documents in upload order.
pub async fn list_documents<S: DocumentStore + ?Sized>(
    store: &S,
    page: Option<usize>,
    per_page: Option<usize>,
) -> Result<DocumentPage> {
    let total = store.count_documents().await?;
    let pagination = Pagination::new(page, per_page, total);
    let documents = store
        .list_documents(pagination.offset(), pagination.per_page)
        .await?
        .into_iter()
        .map(DocumentSummary::from)
        .collect();
    Ok(DocumentPage {
        documents,
        pagination,
    })
}

/// CLI entry point: print one document.
pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let doc = get_document(&store, id).await;
    store.close().await;
    let doc = doc?;

    println!("--- Document ---");
    println!("id:             {}", doc.id);
    println!("title:          {}", doc.title);
    println!("extracted:      {}", doc.extracted_title);
    println!(
        "classification: {} ({:.2})",
        doc.classification, doc.confidence_score
    );
    println!("keywords:       {}", doc.keywords.join(", "));
    println!("file:           {} ({} bytes)", doc.file_type, doc.file_size);
    println!(
        "words:          {} (~{} min read)",
        doc.word_count, doc.reading_time
    );
    println!(
        "uploaded:       {}",
        doc.upload_date.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("sha256:         {}", doc.content_hash);
    println!();

    println!("--- Content ---");
    println!("{}", doc.content);

    Ok(())
}

/// CLI entry point: print one page of documents.
pub async fn run_list(config: &Config, page: Option<usize>, per_page: Option<usize>) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let listing = list_documents(&store, page, per_page).await;
    store.close().await;
    let listing = listing?;

    if listing.documents.is_empty() {
        println!("No documents.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<24}  {:<5}  {:>7}  TITLE",
        "ID", "CLASSIFICATION", "TYPE", "WORDS"
    );
    for doc in &listing.documents {
        println!(
            "{:<36}  {:<24}  {:<5}  {:>7}  {}",
            doc.id, doc.classification, doc.file_type, doc.word_count, doc.title
        );
    }
    let p = &listing.pagination;
    println!();
    println!(
        "Page {} of {} ({} documents)",
        p.page,
        p.pages.max(1),
        p.total
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclens_core::classify::Classifier;
    use doclens_core::store::memory::InMemoryStore;

    use crate::ingest::ingest_bytes;

    #[test]
    fn test_pagination_defaults_and_clamps() {
        let p = Pagination::new(None, None, 25);
        assert_eq!((p.page, p.per_page, p.pages), (1, 10, 3));
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(Some(0), Some(500), 120);
        assert_eq!((p.page, p.per_page, p.pages), (1, 50, 3));

        let p = Pagination::new(Some(3), Some(10), 25);
        assert_eq!(p.offset(), 20);

        assert_eq!(Pagination::new(None, None, 0).pages, 0);
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let cfg = Config::minimal();
        let classifier = Classifier::with_defaults();
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let name = format!("doc{}.txt", i);
            let body = format!("document number {}", i);
            let out = ingest_bytes(&cfg, &classifier, &store, &name, body.as_bytes())
                .await
                .unwrap();
            ids.push(out.document().id.clone());
        }

        let page = list_documents(&store, Some(2), Some(2)).await.unwrap();
        assert_eq!(page.pagination.total, 3);
        assert_eq!(page.pagination.pages, 2);
        assert_eq!(page.documents.len(), 1);
        assert_eq!(page.documents[0].id, ids[2]);

        let doc = get_document(&store, &ids[0]).await.unwrap();
        assert_eq!(doc.title, "doc0.txt");

        let err = get_document(&store, "nope").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}

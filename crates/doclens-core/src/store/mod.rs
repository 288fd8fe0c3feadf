//! Storage abstraction for DocLens.
//!
//! The [`DocumentStore`] trait is the corpus provider for search and the
//! commit point for ingestion. Documents are append-only and are always
//! returned in insertion order.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Document;
use crate::search::SearchMode;

/// Abstract storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert_document`](DocumentStore::insert_document) | Commit a fully built document unless its content hash is taken |
/// | [`get_document`](DocumentStore::get_document) | Look up one document by ID |
/// | [`find_by_hash`](DocumentStore::find_by_hash) | Look up a document by file content hash |
/// | [`list_documents`](DocumentStore::list_documents) | One page of documents |
/// | [`count_documents`](DocumentStore::count_documents) | Number of documents |
/// | [`corpus`](DocumentStore::corpus) | Consistent snapshot of all documents |
/// | [`record_search`](DocumentStore::record_search) | Append to the search log |
/// | [`search_history`](DocumentStore::search_history) | All logged queries, oldest first |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Commit a document. The document becomes visible to searches only
    /// once this returns, with every field populated.
    ///
    /// Content hashes are unique. If a document with the same
    /// `content_hash` is already stored, nothing is written and that
    /// document is returned instead. The check and the write are one atomic
    /// step, so concurrent inserts of the same bytes keep exactly one row.
    async fn insert_document(&self, doc: &Document) -> Result<Option<Document>>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<Document>>;

    /// Documents `offset..offset + limit` in insertion order.
    async fn list_documents(&self, offset: usize, limit: usize) -> Result<Vec<Document>>;

    async fn count_documents(&self) -> Result<usize>;

    /// All documents in insertion order, read as one snapshot.
    async fn corpus(&self) -> Result<Vec<Document>>;

    async fn record_search(&self, query: &str, mode: SearchMode) -> Result<()>;

    async fn search_history(&self) -> Result<Vec<String>>;
}

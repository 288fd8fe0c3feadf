//! In-memory [`DocumentStore`] for tests and embedded use.
//!
//! Documents live in a `Vec` behind a `std::sync::RwLock`; a writer pushes a
//! complete document under the write lock, so readers never observe a
//! partially built one.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::Document;
use crate::search::SearchMode;

use super::DocumentStore;

/// In-memory append-only store.
#[derive(Default)]
pub struct InMemoryStore {
    docs: RwLock<Vec<Document>>,
    searches: RwLock<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_document(&self, doc: &Document) -> Result<Option<Document>> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        if docs.iter().any(|d| d.id == doc.id) {
            anyhow::bail!("document {} already exists", doc.id);
        }
        if let Some(existing) = docs.iter().find(|d| d.content_hash == doc.content_hash) {
            return Ok(Some(existing.clone()));
        }
        docs.push(doc.clone());
        Ok(None)
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.iter().find(|d| d.content_hash == content_hash).cloned())
    }

    async fn list_documents(&self, offset: usize, limit: usize) -> Result<Vec<Document>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn count_documents(&self) -> Result<usize> {
        Ok(self.docs.read().map_err(poisoned)?.len())
    }

    async fn corpus(&self) -> Result<Vec<Document>> {
        Ok(self.docs.read().map_err(poisoned)?.clone())
    }

    async fn record_search(&self, query: &str, _mode: SearchMode) -> Result<()> {
        self.searches
            .write()
            .map_err(poisoned)?
            .push(query.to_string());
        Ok(())
    }

    async fn search_history(&self) -> Result<Vec<String>> {
        Ok(self.searches.read().map_err(poisoned)?.clone())
    }
}

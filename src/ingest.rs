//! Ingestion pipeline.
//!
//! Turns uploaded bytes into a committed [`Document`]:
//! validate → extract text → classify → extract keywords → commit.
//! Every derived field is computed before the single store insert, so a
//! document is never visible to search half-built.
//!
//! Files whose SHA-256 matches an already-ingested document are not
//! stored again; the existing document is returned instead.

use anyhow::{bail, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::Path;
use uuid::Uuid;

use doclens_core::classify::Classifier;
use doclens_core::keywords::{extract_keywords, DEFAULT_KEYWORD_COUNT};
use doclens_core::models::{self, Document};
use doclens_core::store::DocumentStore;

use crate::config::Config;
use crate::extract::{extract_text, FileType};

/// Content stored when a file yields no text.
pub const NO_TEXT_PLACEHOLDER: &str = "No extractable text found in this document.";

/// Result of ingesting one file.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Created(Document),
    /// Same bytes were ingested before; carries the earlier document.
    Duplicate(Document),
}

impl IngestOutcome {
    pub fn document(&self) -> &Document {
        match self {
            IngestOutcome::Created(d) | IngestOutcome::Duplicate(d) => d,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, IngestOutcome::Duplicate(_))
    }
}

/// Lowercase extension of `filename`, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
}

/// Check filename, extension, and size against the upload rules.
pub fn validate_upload(config: &Config, filename: &str, size: u64) -> Result<FileType> {
    if filename.trim().is_empty() {
        bail!("invalid upload: no file name");
    }
    let ext = match file_extension(filename) {
        Some(ext) => ext,
        None => bail!("invalid upload: '{}' has no file extension", filename),
    };
    if !config.is_allowed_extension(&ext) {
        bail!(
            "invalid upload: file type '{}' is not allowed (allowed: {})",
            ext,
            config.upload.allowed_extensions.join(", ")
        );
    }
    let file_type = match FileType::from_extension(&ext) {
        Some(ft) => ft,
        None => bail!("invalid upload: file type '{}' is not supported", ext),
    };
    let max = config.upload.max_file_size_bytes();
    if size > max {
        bail!(
            "invalid upload: '{}' is {} bytes, limit is {} MB",
            filename,
            size,
            config.upload.max_file_size_mb
        );
    }
    Ok(file_type)
}

/// Build a fully populated document from raw bytes. Pure apart from the
/// generated ID and timestamp.
pub fn build_document(
    classifier: &Classifier,
    filename: &str,
    bytes: &[u8],
    file_type: FileType,
) -> Document {
    let mut content = extract_text(bytes, file_type);
    if content.is_empty() {
        content = NO_TEXT_PLACEHOLDER.to_string();
    }

    let classification = classifier.score(&content);
    let keywords = extract_keywords(&content, DEFAULT_KEYWORD_COUNT);
    let word_count = models::word_count(&content);

    Document {
        id: Uuid::new_v4().to_string(),
        title: filename.to_string(),
        extracted_title: models::extract_title(&content),
        classification: classification.category,
        confidence_score: classification.confidence,
        keywords,
        content_preview: models::preview(&content),
        word_count,
        reading_time: models::reading_time(word_count),
        file_size: bytes.len() as u64,
        file_type: file_type.as_str().to_string(),
        upload_date: Utc::now(),
        content_hash: content_hash(bytes),
        content,
    }
}

/// SHA-256 hex digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Validate, analyze, and commit one uploaded file.
pub async fn ingest_bytes<S: DocumentStore + ?Sized>(
    config: &Config,
    classifier: &Classifier,
    store: &S,
    filename: &str,
    bytes: &[u8],
) -> Result<IngestOutcome> {
    let file_type = validate_upload(config, filename, bytes.len() as u64)?;

    if let Some(existing) = store.find_by_hash(&content_hash(bytes)).await? {
        tracing::info!(id = %existing.id, filename, "duplicate upload, keeping existing document");
        return Ok(IngestOutcome::Duplicate(existing));
    }

    let doc = build_document(classifier, filename, bytes, file_type);
    if let Some(existing) = store.insert_document(&doc).await? {
        tracing::info!(id = %existing.id, filename, "concurrent duplicate upload, keeping existing document");
        return Ok(IngestOutcome::Duplicate(existing));
    }

    tracing::info!(
        id = %doc.id,
        filename,
        classification = %doc.classification,
        keywords = doc.keywords.len(),
        words = doc.word_count,
        "document ingested"
    );
    Ok(IngestOutcome::Created(doc))
}

/// Read a file from disk and ingest it under its file name.
pub async fn ingest_path<S: DocumentStore + ?Sized>(
    config: &Config,
    classifier: &Classifier,
    store: &S,
    path: &Path,
) -> Result<IngestOutcome> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    ingest_bytes(config, classifier, store, &filename, &bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use doclens_core::classify::OTHER;
    use doclens_core::search::SearchMode;
    use doclens_core::store::memory::InMemoryStore;

    /// Store whose hash lookup never sees committed rows, as happens when
    /// two uploads of the same file both look before either inserts.
    #[derive(Default)]
    struct StaleLookupStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl DocumentStore for StaleLookupStore {
        async fn insert_document(&self, doc: &Document) -> Result<Option<Document>> {
            self.inner.insert_document(doc).await
        }
        async fn get_document(&self, id: &str) -> Result<Option<Document>> {
            self.inner.get_document(id).await
        }
        async fn find_by_hash(&self, _content_hash: &str) -> Result<Option<Document>> {
            Ok(None)
        }
        async fn list_documents(&self, offset: usize, limit: usize) -> Result<Vec<Document>> {
            self.inner.list_documents(offset, limit).await
        }
        async fn count_documents(&self) -> Result<usize> {
            self.inner.count_documents().await
        }
        async fn corpus(&self) -> Result<Vec<Document>> {
            self.inner.corpus().await
        }
        async fn record_search(&self, query: &str, mode: SearchMode) -> Result<()> {
            self.inner.record_search(query, mode).await
        }
        async fn search_history(&self) -> Result<Vec<String>> {
            self.inner.search_history().await
        }
    }

    #[test]
    fn test_validate_upload() {
        let cfg = Config::minimal();
        assert_eq!(validate_upload(&cfg, "a.TXT", 10).unwrap(), FileType::Txt);
        assert!(validate_upload(&cfg, "a.exe", 10).is_err());
        assert!(validate_upload(&cfg, "noext", 10).is_err());
        assert!(validate_upload(&cfg, "", 10).is_err());
        let too_big = cfg.upload.max_file_size_bytes() + 1;
        assert!(validate_upload(&cfg, "a.pdf", too_big).is_err());
    }

    #[test]
    fn test_build_document_fields() {
        let classifier = Classifier::with_defaults();
        let text = "Research methodology\nThis academic study covers research methods.";
        let doc = build_document(&classifier, "paper.txt", text.as_bytes(), FileType::Txt);
        assert_eq!(doc.title, "paper.txt");
        assert_eq!(doc.extracted_title, "Research methodology");
        assert_eq!(doc.classification, "Academic Research");
        assert_eq!(doc.keywords[0], "research");
        assert!(doc.keywords.len() <= 5);
        assert_eq!(doc.word_count, 8);
        assert_eq!(doc.reading_time, 0);
        assert_eq!(doc.file_size, text.len() as u64);
        assert_eq!(doc.file_type, "txt");
        assert_eq!(doc.content_hash.len(), 64);
    }

    #[test]
    fn test_unreadable_file_uses_placeholder() {
        let classifier = Classifier::with_defaults();
        let doc = build_document(&classifier, "broken.pdf", b"garbage", FileType::Pdf);
        assert_eq!(doc.content, NO_TEXT_PLACEHOLDER);
        assert_eq!(doc.classification, OTHER);
    }

    #[tokio::test]
    async fn test_ingest_and_duplicate() {
        let cfg = Config::minimal();
        let classifier = Classifier::with_defaults();
        let store = InMemoryStore::new();

        let first = ingest_bytes(&cfg, &classifier, &store, "a.txt", b"legal contract")
            .await
            .unwrap();
        assert!(!first.is_duplicate());

        let second = ingest_bytes(&cfg, &classifier, &store, "b.txt", b"legal contract")
            .await
            .unwrap();
        assert!(second.is_duplicate());
        assert_eq!(second.document().id, first.document().id);
        assert_eq!(store.count_documents().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_keep_one_document() {
        let cfg = Config::minimal();
        let classifier = Classifier::with_defaults();
        let store = StaleLookupStore::default();

        let (a, b) = tokio::join!(
            ingest_bytes(&cfg, &classifier, &store, "a.txt", b"legal contract"),
            ingest_bytes(&cfg, &classifier, &store, "b.txt", b"legal contract"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(store.count_documents().await.unwrap(), 1);
        assert_ne!(a.is_duplicate(), b.is_duplicate());
        assert_eq!(a.document().id, b.document().id);
    }

    #[tokio::test]
    async fn test_rejected_upload_not_stored() {
        let cfg = Config::minimal();
        let classifier = Classifier::with_defaults();
        let store = InMemoryStore::new();
        assert!(ingest_bytes(&cfg, &classifier, &store, "x.exe", b"data")
            .await
            .is_err());
        assert_eq!(store.count_documents().await.unwrap(), 0);
    }
}

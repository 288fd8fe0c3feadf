//! SQLite-backed [`DocumentStore`] implementation.
//!
//! Each document is committed with a single `INSERT`, so a concurrent
//! reader sees either the complete row or nothing. The unique index on
//! `content_hash` turns a second insert of the same bytes into a no-op. Corpus snapshots are
//! read with one `SELECT ... ORDER BY seq`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;

use doclens_core::models::Document;
use doclens_core::search::SearchMode;
use doclens_core::store::DocumentStore;

use crate::config::Config;

const MAX_CONNECTIONS: u32 = 5;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a WAL-mode pool on `[db].path`, creating the file and its parent
/// directory if needed.
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory {}", parent.display())
            })?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    tracing::debug!(path = %db_path.display(), "database connected");
    Ok(pool)
}

const DOCUMENT_COLUMNS: &str = "id, title, extracted_title, classification, confidence_score, \
     keywords_json, content, content_preview, word_count, reading_time, file_size, file_type, \
     upload_date, content_hash";

/// SQLite implementation of the [`DocumentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database.
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(connect(config).await?))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_document(row: &SqliteRow) -> Result<Document> {
    let keywords_json: String = row.get("keywords_json");
    let keywords: Vec<String> =
        serde_json::from_str(&keywords_json).with_context(|| "corrupt keywords_json column")?;
    let upload_ms: i64 = row.get("upload_date");
    let upload_date: DateTime<Utc> =
        DateTime::from_timestamp_millis(upload_ms).unwrap_or_default();
    let word_count: i64 = row.get("word_count");
    let reading_time: i64 = row.get("reading_time");
    let file_size: i64 = row.get("file_size");

    Ok(Document {
        id: row.get("id"),
        title: row.get("title"),
        extracted_title: row.get("extracted_title"),
        classification: row.get("classification"),
        confidence_score: row.get("confidence_score"),
        keywords,
        content: row.get("content"),
        content_preview: row.get("content_preview"),
        word_count: word_count as usize,
        reading_time: reading_time as usize,
        file_size: file_size as u64,
        file_type: row.get("file_type"),
        upload_date,
        content_hash: row.get("content_hash"),
    })
}

fn rows_to_documents(rows: &[SqliteRow]) -> Result<Vec<Document>> {
    rows.iter().map(row_to_document).collect()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert_document(&self, doc: &Document) -> Result<Option<Document>> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (id, title, extracted_title, classification, confidence_score,
                                   keywords_json, content, content_preview, word_count,
                                   reading_time, file_size, file_type, upload_date, content_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(content_hash) DO NOTHING
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.title)
        .bind(&doc.extracted_title)
        .bind(&doc.classification)
        .bind(doc.confidence_score)
        .bind(serde_json::to_string(&doc.keywords)?)
        .bind(&doc.content)
        .bind(&doc.content_preview)
        .bind(doc.word_count as i64)
        .bind(doc.reading_time as i64)
        .bind(doc.file_size as i64)
        .bind(&doc.file_type)
        .bind(doc.upload_date.timestamp_millis())
        .bind(&doc.content_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(None);
        }
        let existing = self
            .find_by_hash(&doc.content_hash)
            .await?
            .with_context(|| format!("insert of {} skipped but no document holds its hash", doc.id))?;
        Ok(Some(existing))
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE id = ?",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn find_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM documents WHERE content_hash = ? ORDER BY seq ASC LIMIT 1",
            DOCUMENT_COLUMNS
        ))
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_document).transpose()
    }

    async fn list_documents(&self, offset: usize, limit: usize) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents ORDER BY seq ASC LIMIT ? OFFSET ?",
            DOCUMENT_COLUMNS
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows_to_documents(&rows)
    }

    async fn count_documents(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn corpus(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM documents ORDER BY seq ASC",
            DOCUMENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows_to_documents(&rows)
    }

    async fn record_search(&self, query: &str, mode: SearchMode) -> Result<()> {
        sqlx::query("INSERT INTO searches (query, mode, created_at) VALUES (?, ?, ?)")
            .bind(query)
            .bind(mode.as_str())
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn search_history(&self) -> Result<Vec<String>> {
        let queries: Vec<String> = sqlx::query_scalar("SELECT query FROM searches ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(queries)
    }
}

use anyhow::Result;

use crate::config::Config;
use crate::sqlite_store;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = sqlite_store::connect(config).await?;

    // seq preserves insertion order for corpus snapshots
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            extracted_title TEXT NOT NULL,
            classification TEXT NOT NULL,
            confidence_score REAL NOT NULL DEFAULT 0,
            keywords_json TEXT NOT NULL DEFAULT '[]',
            content TEXT NOT NULL,
            content_preview TEXT NOT NULL,
            word_count INTEGER NOT NULL,
            reading_time INTEGER NOT NULL,
            file_size INTEGER NOT NULL,
            file_type TEXT NOT NULL,
            upload_date INTEGER NOT NULL,
            content_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS searches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            query TEXT NOT NULL,
            mode TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    // One row per distinct file; replaces the earlier non-unique index
    sqlx::query("DROP INDEX IF EXISTS idx_documents_content_hash")
        .execute(&pool)
        .await?;
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_content_hash_unique ON documents(content_hash)",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_classification ON documents(classification)",
    )
    .execute(&pool)
    .await?;

    pool.close().await;
    Ok(())
}

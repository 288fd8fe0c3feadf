//! Core data models shared by ingestion, storage, and search.
//!
//! A [`Document`] is built once at ingest time with every derived field
//! (classification, keywords, preview) populated, and is never mutated
//! afterwards. Search produces ephemeral [`SearchResult`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when no suitable line is found in the extracted text.
pub const UNTITLED: &str = "Untitled Document";

/// Maximum characters kept in [`Document::extracted_title`].
pub const TITLE_MAX_CHARS: usize = 120;

/// A title candidate line must be longer than this many characters.
const TITLE_MIN_CHARS: usize = 5;

/// Characters kept in [`Document::content_preview`].
pub const PREVIEW_CHARS: usize = 200;

/// Words per minute used for [`Document::reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

/// An indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// UUID assigned at ingest.
    pub id: String,
    /// Original filename.
    pub title: String,
    /// First meaningful line of the extracted text.
    pub extracted_title: String,
    /// Category name, or `"Other"`.
    pub classification: String,
    /// Classifier confidence in `[0.0, 1.0]`.
    pub confidence_score: f64,
    /// Up to five lowercase keywords, most frequent first.
    pub keywords: Vec<String>,
    /// Full extracted text.
    pub content: String,
    /// First [`PREVIEW_CHARS`] characters of `content`.
    pub content_preview: String,
    pub word_count: usize,
    /// Minutes, `word_count / 200`.
    pub reading_time: usize,
    /// Size of the uploaded file in bytes.
    pub file_size: u64,
    /// Lowercase file extension (`txt`, `pdf`, `docx`).
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    /// SHA-256 hex digest of the raw file bytes.
    pub content_hash: String,
}

/// Derive the display title from extracted text.
///
/// Returns the first trimmed line longer than five characters, cut to
/// [`TITLE_MAX_CHARS`], or [`UNTITLED`].
pub fn extract_title(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| line.chars().count() > TITLE_MIN_CHARS)
        .map(|line| line.chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// First [`PREVIEW_CHARS`] characters of `content`.
pub fn preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).collect()
}

/// Whitespace-delimited word count.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Reading time in whole minutes.
pub fn reading_time(word_count: usize) -> usize {
    word_count / WORDS_PER_MINUTE
}

/// One contextual excerpt around a term occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSnippet {
    /// The lowercase term that produced this window.
    pub term: String,
    /// Window text with the term highlighted and ellipsis markers.
    pub snippet: String,
    /// Character offset of the occurrence in the full text.
    pub position: usize,
}

/// A ranked search hit. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: String,
    pub relevance_score: u64,
    /// Document preview with matched terms highlighted.
    pub highlighted_snippet: String,
    /// Lowercase query terms that matched, in query order.
    pub matched_terms: Vec<String>,
    pub text_snippets: Vec<TextSnippet>,
}

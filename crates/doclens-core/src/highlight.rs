//! Term highlighting.
//!
//! Wraps matched terms in [`MARK_OPEN`] / [`MARK_CLOSE`] while leaving all
//! other characters untouched, so removing the markers reproduces the
//! input exactly. Terms are applied longest-first, and an occurrence that
//! overlaps an already-highlighted span is skipped; markers never nest.

use serde::{Deserialize, Serialize};

use crate::text::{find_all, fold_chars, is_whole_word};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// How a term occurrence must sit in the text to be highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStyle {
    /// Not adjacent to a letter or digit on either side.
    WholeWord,
    /// Any substring occurrence.
    Partial,
}

/// Highlight every occurrence of `terms` in `text`.
pub fn highlight<S: AsRef<str>>(text: &str, terms: &[S], style: MatchStyle) -> String {
    if terms.is_empty() || text.is_empty() {
        return text.to_string();
    }

    let haystack = fold_chars(text);

    let mut needles: Vec<Vec<char>> = terms
        .iter()
        .map(|t| fold_chars(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect();
    // stable: equal lengths keep caller order
    needles.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for needle in &needles {
        for start in find_all(&haystack, needle) {
            let end = start + needle.len();
            if style == MatchStyle::WholeWord && !is_whole_word(&haystack, start, end) {
                continue;
            }
            if spans.iter().any(|&(s, e)| start < e && s < end) {
                continue;
            }
            spans.push((start, end));
        }
    }

    if spans.is_empty() {
        return text.to_string();
    }
    spans.sort_unstable();

    let mut out = String::with_capacity(text.len() + spans.len() * (MARK_OPEN.len() + MARK_CLOSE.len()));
    let mut spans = spans.into_iter().peekable();
    for (i, c) in text.chars().enumerate() {
        if let Some(&(start, _)) = spans.peek() {
            if i == start {
                out.push_str(MARK_OPEN);
            }
        }
        out.push(c);
        if let Some(&(_, end)) = spans.peek() {
            if i + 1 == end {
                out.push_str(MARK_CLOSE);
                spans.next();
            }
        }
    }
    out
}

/// Remove highlight markers.
pub fn strip_marks(text: &str) -> String {
    text.replace(MARK_OPEN, "").replace(MARK_CLOSE, "")
}

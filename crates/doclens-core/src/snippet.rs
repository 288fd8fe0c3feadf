//! Contextual snippet extraction.
//!
//! For each term, every case-insensitive occurrence yields a candidate
//! window of roughly `window_radius` characters around it, with the term
//! highlighted. Candidates are then ordered by position and thinned so
//! that no two kept snippets start within `window_radius` characters of
//! each other. Deduplication does not look at which term produced a
//! window, so a snippet for one term can suppress a nearby snippet for
//! another.

use serde::{Deserialize, Serialize};

use crate::highlight::{highlight, MatchStyle};
use crate::models::TextSnippet;
use crate::text::{find_all, fold_chars};

pub const ELLIPSIS: &str = "...";

/// Window and count limits for snippet extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetOptions {
    /// Total context characters around a match (half on each side).
    pub window_radius: usize,
    pub max_snippets: usize,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            window_radius: 100,
            max_snippets: 5,
        }
    }
}

/// Extract highlighted snippets for `terms` from `text`.
pub fn extract_snippets<S: AsRef<str>>(
    text: &str,
    terms: &[S],
    opts: &SnippetOptions,
    style: MatchStyle,
) -> Vec<TextSnippet> {
    let chars: Vec<char> = text.chars().collect();
    let haystack = fold_chars(text);
    let half = opts.window_radius / 2;

    let mut candidates: Vec<TextSnippet> = Vec::new();
    for term in terms {
        let term = term.as_ref();
        let needle = fold_chars(term);
        for pos in find_all(&haystack, &needle) {
            let start = pos.saturating_sub(half);
            let end = (pos + needle.len() + half).min(chars.len());
            let window: String = chars[start..end].iter().collect();

            let mut snippet = String::new();
            if start > 0 {
                snippet.push_str(ELLIPSIS);
            }
            snippet.push_str(&highlight(&window, &[term], style));
            if end < chars.len() {
                snippet.push_str(ELLIPSIS);
            }

            candidates.push(TextSnippet {
                term: term.to_lowercase(),
                snippet,
                position: pos,
            });
        }
    }

    candidates.sort_by_key(|c| c.position);

    let mut kept: Vec<TextSnippet> = Vec::new();
    for cand in candidates {
        if kept
            .iter()
            .all(|k| k.position.abs_diff(cand.position) > opts.window_radius)
        {
            kept.push(cand);
        }
    }
    kept.truncate(opts.max_snippets);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{MARK_CLOSE, MARK_OPEN};

    #[test]
    fn test_short_text_no_ellipsis() {
        let snippets = extract_snippets(
            "The quick brown fox",
            &["quick"],
            &SnippetOptions::default(),
            MatchStyle::WholeWord,
        );
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].position, 4);
        assert_eq!(snippets[0].term, "quick");
        assert!(snippets[0].snippet.contains("<mark>quick</mark>"));
        assert!(!snippets[0].snippet.starts_with(ELLIPSIS));
        assert!(!snippets[0].snippet.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_ellipsis_when_text_continues() {
        let text = format!("The quick brown fox {}", "jumps ".repeat(30));
        let snippets = extract_snippets(
            &text,
            &["quick"],
            &SnippetOptions::default(),
            MatchStyle::WholeWord,
        );
        assert_eq!(snippets.len(), 1);
        assert!(!snippets[0].snippet.starts_with(ELLIPSIS));
        assert!(snippets[0].snippet.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_prefix_ellipsis_late_match() {
        let text = format!("{}needle", "x ".repeat(100));
        let snippets = extract_snippets(
            &text,
            &["needle"],
            &SnippetOptions::default(),
            MatchStyle::WholeWord,
        );
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].snippet.starts_with(ELLIPSIS));
        assert!(snippets[0].snippet.ends_with(MARK_CLOSE));
    }

    #[test]
    fn test_window_bounds() {
        let text = format!("{}TERM{}", "a".repeat(200), "b".repeat(200));
        let opts = SnippetOptions {
            window_radius: 20,
            max_snippets: 5,
        };
        let snippets = extract_snippets(&text, &["term"], &opts, MatchStyle::Partial);
        let expected = format!(
            "{}{}{}TERM{}{}{}",
            ELLIPSIS,
            "a".repeat(10),
            MARK_OPEN,
            MARK_CLOSE,
            "b".repeat(10),
            ELLIPSIS
        );
        assert_eq!(snippets[0].snippet, expected);
        assert_eq!(snippets[0].position, 200);
    }

    #[test]
    fn test_nearby_occurrences_collapse() {
        let text = "alpha beta alpha gamma alpha";
        let snippets = extract_snippets(
            text,
            &["alpha"],
            &SnippetOptions::default(),
            MatchStyle::WholeWord,
        );
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].position, 0);
    }

    #[test]
    fn test_other_term_suppressed_when_close() {
        let text = "alpha beta";
        let snippets = extract_snippets(
            text,
            &["beta", "alpha"],
            &SnippetOptions::default(),
            MatchStyle::WholeWord,
        );
        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].term, "alpha");
    }

    #[test]
    fn test_max_snippets_and_spacing() {
        let filler = "z".repeat(150);
        let text = (0..10)
            .map(|_| format!("hit {}", filler))
            .collect::<Vec<_>>()
            .join(" ");
        let opts = SnippetOptions::default();
        let snippets = extract_snippets(&text, &["hit"], &opts, MatchStyle::WholeWord);
        assert_eq!(snippets.len(), 5);
        for pair in snippets.windows(2) {
            assert!(pair[1].position - pair[0].position > opts.window_radius);
        }
    }

    #[test]
    fn test_overlapping_occurrences_found() {
        let opts = SnippetOptions {
            window_radius: 0,
            max_snippets: 10,
        };
        let snippets = extract_snippets("aaa", &["aa"], &opts, MatchStyle::Partial);
        let positions: Vec<usize> = snippets.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_no_match() {
        let snippets = extract_snippets(
            "nothing here",
            &["absent"],
            &SnippetOptions::default(),
            MatchStyle::WholeWord,
        );
        assert!(snippets.is_empty());
    }
}

//! Frequency-ranked keyword extraction.
//!
//! # Algorithm
//!
//! 1. Lowercase the text.
//! 2. Tokenize into maximal word runs; keep runs made only of ASCII
//!    letters with at least three characters.
//! 3. Drop stop words and anything of length ≤ 3 (so the effective
//!    minimum is four letters).
//! 4. Count, then stable-sort by descending frequency so that ties keep
//!    first-seen order.
//! 5. Return the top `k`.
//!
//! ```rust
//! use doclens_core::keywords::extract_keywords;
//!
//! let kw = extract_keywords("test test test demo demo work", 2);
//! assert_eq!(kw, vec!["test", "demo"]);
//! ```

use std::collections::HashMap;

/// Keywords stored per document.
pub const DEFAULT_KEYWORD_COUNT: usize = 5;

/// Words never returned as keywords.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "is", "in", "it", "of", "to", "with",
];

const MIN_TOKEN_CHARS: usize = 3;
const MIN_KEYWORD_CHARS: usize = 4;

/// Extract up to `k` keywords from `text`. Deterministic for equal input.
pub fn extract_keywords(text: &str, k: usize) -> Vec<String> {
    let lower = text.to_lowercase();

    let mut order: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for token in tokenize(&lower) {
        if STOP_WORDS.contains(&token) || token.len() < MIN_KEYWORD_CHARS {
            continue;
        }
        match index.get(token) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(token, order.len());
                order.push((token, 1));
            }
        }
    }

    // sort_by is stable: equal counts stay in first-seen order
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
        .into_iter()
        .take(k)
        .map(|(word, _)| word.to_string())
        .collect()
}

/// Split into runs of word characters and keep the all-ASCII-letter ones.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|run| run.len() >= MIN_TOKEN_CHARS && run.bytes().all(|b| b.is_ascii_alphabetic()))
}

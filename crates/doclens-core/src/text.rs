//! Case-folded character matching shared by the classifier, highlighter,
//! and snippet extractor.
//!
//! Text is compared one character at a time after folding each character
//! to a single lowercase character. Positions are therefore character
//! offsets into the original text, and a match in the folded text maps
//! back to the same range of original characters with their casing intact.

/// Fold a character to lowercase, keeping a 1:1 character mapping.
///
/// Characters whose lowercase form expands to several characters are
/// kept unchanged.
pub fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Fold a whole string into a character vector.
pub fn fold_chars(s: &str) -> Vec<char> {
    s.chars().map(fold).collect()
}

/// Fold a whole string, keeping its character count.
pub fn fold_str(s: &str) -> String {
    s.chars().map(fold).collect()
}

/// Whether `c` counts as part of a word for boundary checks.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True if `haystack[start..start + needle.len()]` equals `needle`.
fn matches_at(haystack: &[char], needle: &[char], start: usize) -> bool {
    start + needle.len() <= haystack.len() && haystack[start..start + needle.len()] == *needle
}

/// All match start positions of `needle` in `haystack`, including
/// overlapping ones. An empty needle never matches.
pub fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| matches_at(haystack, needle, i))
        .collect()
}

/// True when the span `[start, end)` is not touching a word character on
/// either side.
pub fn is_whole_word(haystack: &[char], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !is_word_char(haystack[start - 1]);
    let after_ok = end >= haystack.len() || !is_word_char(haystack[end]);
    before_ok && after_ok
}

/// Count non-overlapping whole-word occurrences of `needle`.
pub fn count_whole_words(haystack: &[char], needle: &[char]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if matches_at(haystack, needle, i) && is_whole_word(haystack, i, i + needle.len()) {
            count += 1;
            i += needle.len();
        } else {
            i += 1;
        }
    }
    count
}

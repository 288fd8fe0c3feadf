//! Ad-hoc classification of arbitrary text.
//!
//! Runs the configured classifier and keyword extractor without storing
//! anything. Used by `doclens classify` and `POST /api/classify`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;

use doclens_core::classify::Classifier;
use doclens_core::keywords::{extract_keywords, DEFAULT_KEYWORD_COUNT};

use crate::config::Config;
use crate::extract::{extract_text, FileType};
use crate::ingest::file_extension;

#[derive(Debug, Clone, Serialize)]
pub struct ClassifyResponse {
    pub classification: String,
    pub confidence_score: f64,
    pub keywords: Vec<String>,
    /// Keyword hits per category, in configuration order.
    pub scores: Vec<CategoryScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub hits: usize,
}

/// Classify `content`. Fails on blank input.
pub fn classify_text(classifier: &Classifier, content: &str) -> Result<ClassifyResponse> {
    if content.trim().is_empty() {
        bail!("Content is required");
    }
    let result = classifier.score(content);
    Ok(ClassifyResponse {
        classification: result.category,
        confidence_score: result.confidence,
        keywords: extract_keywords(content, DEFAULT_KEYWORD_COUNT),
        scores: result
            .scores
            .into_iter()
            .map(|(category, hits)| CategoryScore { category, hits })
            .collect(),
    })
}

/// Read text from a file, extracting PDF and DOCX the way uploads are.
fn read_file_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_type = file_extension(&path.to_string_lossy())
        .and_then(|ext| FileType::from_extension(&ext))
        .unwrap_or(FileType::Txt);
    Ok(extract_text(&bytes, file_type))
}

/// CLI entry point: classify inline text or a file and print the result.
pub fn run_classify(config: &Config, text: Option<String>, file: Option<&Path>) -> Result<()> {
    let content = match (text, file) {
        (Some(_), Some(_)) => bail!("Pass either TEXT or --file, not both"),
        (Some(text), None) => text,
        (None, Some(path)) => read_file_text(path)?,
        (None, None) => bail!("Content is required: pass TEXT or --file"),
    };

    let classifier = config.classifier.build()?;
    let result = classify_text(&classifier, &content)?;

    println!("classification: {}", result.classification);
    println!("confidence:     {:.2}", result.confidence_score);
    println!("keywords:       {}", result.keywords.join(", "));
    println!();
    for s in &result.scores {
        println!("  {:<28} {:>4}", s.category, s.hits);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_text() {
        let classifier = Classifier::with_defaults();
        let r = classify_text(&classifier, "This is a research paper with academic methodology")
            .unwrap();
        assert_eq!(r.classification, "Academic Research");
        assert!(r.confidence_score > 0.5);
        assert_eq!(r.scores.len(), 7);
        assert_eq!(r.scores[0].category, "Academic Research");
        assert_eq!(r.scores[0].hits, 3);
        assert!(r.keywords.contains(&"research".to_string()));
    }

    #[test]
    fn test_blank_content_rejected() {
        let classifier = Classifier::with_defaults();
        assert!(classify_text(&classifier, "  \n ").is_err());
    }

    #[test]
    fn test_read_file_text_defaults_to_plain_text() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes");
        std::fs::write(&path, " legal contract ").unwrap();
        assert_eq!(read_file_text(&path).unwrap(), "legal contract");
    }
}

//! Bulk import of a local directory.
//!
//! Walks the directory, keeps files matching the include globs (by default
//! one `**/*.<ext>` per allowed upload extension), skips the usual build and
//! VCS directories, and ingests each file. A file that fails validation is
//! reported and skipped; it does not abort the import.

use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use doclens_core::classify::Classifier;
use doclens_core::store::DocumentStore;

use crate::config::Config;
use crate::ingest::{ingest_path, IngestOutcome};

const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/target/**", "**/node_modules/**"];

/// Totals reported at the end of an import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// Files under `root` selected by `include` (or the default extension globs),
/// sorted by relative path.
pub fn scan_directory(config: &Config, root: &Path, include: &[String]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Import directory does not exist: {}", root.display());
    }

    let include_patterns: Vec<String> = if include.is_empty() {
        config
            .upload
            .allowed_extensions
            .iter()
            .map(|ext| format!("**/*.{}", ext.to_lowercase()))
            .collect()
    } else {
        include.to_vec()
    };
    let include_set = build_globset(&include_patterns)?;
    let exclude_patterns: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    let exclude_set = build_globset(&exclude_patterns)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

/// Ingest every selected file under `root`.
pub async fn import_directory<S: DocumentStore + ?Sized>(
    config: &Config,
    classifier: &Classifier,
    store: &S,
    root: &Path,
    include: &[String],
) -> Result<ImportSummary> {
    let files = scan_directory(config, root, include)?;
    tracing::info!(root = %root.display(), files = files.len(), "importing directory");

    let mut summary = ImportSummary::default();
    for path in &files {
        match ingest_path(config, classifier, store, path).await {
            Ok(IngestOutcome::Created(doc)) => {
                println!("  + {} [{}] {}", doc.id, doc.classification, path.display());
                summary.created += 1;
            }
            Ok(IngestOutcome::Duplicate(doc)) => {
                println!("  = {} (duplicate) {}", doc.id, path.display());
                summary.duplicates += 1;
            }
            Err(e) => {
                eprintln!("  ! {}: {}", path.display(), e);
                summary.failed += 1;
            }
        }
    }
    Ok(summary)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

//! TOML configuration.
//!
//! Only `[db]` is required; every other section has defaults. Validation
//! happens once in [`load_config`] so that an unknown search mode or an
//! unusable category table fails at startup rather than per request.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use doclens_core::classify::{default_categories, Category, Classifier, DEFAULT_MIN_CONFIDENCE};
use doclens_core::search::SearchMode;
use doclens_core::snippet::SnippetOptions;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins; `"*"` allows any.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

fn default_max_file_size_mb() -> u64 {
    10
}
fn default_allowed_extensions() -> Vec<String> {
    vec!["txt".to_string(), "pdf".to_string(), "docx".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_mode")]
    pub default_mode: String,
    #[serde(default = "default_window_radius")]
    pub window_radius: usize,
    #[serde(default = "default_max_snippets")]
    pub max_snippets: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: default_mode(),
            window_radius: default_window_radius(),
            max_snippets: default_max_snippets(),
        }
    }
}

impl SearchConfig {
    pub fn snippet_options(&self) -> SnippetOptions {
        SnippetOptions {
            window_radius: self.window_radius,
            max_snippets: self.max_snippets,
        }
    }

    /// Resolve an optional mode string, falling back to `default_mode`.
    pub fn resolve_mode(&self, mode: Option<&str>) -> Result<SearchMode> {
        mode.unwrap_or(&self.default_mode).parse()
    }
}

fn default_mode() -> String {
    "keyword".to_string()
}
fn default_window_radius() -> usize {
    100
}
fn default_max_snippets() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            categories: default_categories(),
        }
    }
}

impl ClassifierConfig {
    pub fn build(&self) -> Result<Classifier> {
        Classifier::new(&self.categories, self.min_confidence)
    }
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

impl Config {
    /// Configuration for commands that never touch the database.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/doclens.sqlite"),
            },
            server: ServerConfig::default(),
            upload: UploadConfig::default(),
            search: SearchConfig::default(),
            classifier: ClassifierConfig::default(),
        }
    }

    /// Whether `ext` (without the dot, any case) is accepted for upload.
    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.upload
            .allowed_extensions
            .iter()
            .any(|a| a.eq_ignore_ascii_case(&ext))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    // Validate search
    config
        .search
        .resolve_mode(None)
        .with_context(|| "search.default_mode is invalid")?;
    if config.search.window_radius == 0 {
        bail!("search.window_radius must be > 0");
    }
    if config.search.max_snippets == 0 {
        bail!("search.max_snippets must be > 0");
    }

    // Validate upload
    if config.upload.max_file_size_mb == 0 {
        bail!("upload.max_file_size_mb must be > 0");
    }
    if config.upload.allowed_extensions.is_empty() {
        bail!("upload.allowed_extensions must not be empty");
    }
    for ext in &config.upload.allowed_extensions {
        if crate::extract::FileType::from_extension(ext).is_none() {
            bail!(
                "upload.allowed_extensions: no text extractor for '{}'. Supported: txt, pdf, docx.",
                ext
            );
        }
    }

    // Validate classifier
    config
        .classifier
        .build()
        .with_context(|| "invalid [classifier] configuration")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let cfg = parse("[db]\npath = \"x.sqlite\"\n").unwrap();
        assert_eq!(cfg.search.window_radius, 100);
        assert_eq!(cfg.search.max_snippets, 5);
        assert_eq!(cfg.upload.max_file_size_mb, 10);
        assert_eq!(cfg.classifier.categories.len(), 7);
        assert_eq!(cfg.search.resolve_mode(None).unwrap(), SearchMode::Keyword);
    }

    #[test]
    fn test_unknown_default_mode_rejected() {
        let err = parse("[db]\npath = \"x\"\n[search]\ndefault_mode = \"semantic\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("Unknown search mode"));
    }

    #[test]
    fn test_empty_categories_rejected() {
        let err = parse("[db]\npath = \"x\"\n[classifier]\ncategories = []\n").unwrap_err();
        assert!(format!("{:#}", err).contains("at least one category"));
    }

    #[test]
    fn test_custom_categories() {
        let cfg = parse(
            r#"
[db]
path = "x"

[classifier]
min_confidence = 0.5

[[classifier.categories]]
name = "Recipes"
keywords = ["flour", "oven"]
"#,
        )
        .unwrap();
        let classifier = cfg.classifier.build().unwrap();
        assert_eq!(classifier.classify("Preheat the oven, add flour"), "Recipes");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        assert!(parse("[db]\npath = \"x\"\n[upload]\nallowed_extensions = [\"exe\"]\n").is_err());
    }

    #[test]
    fn test_extension_check_case_insensitive() {
        let cfg = Config::minimal();
        assert!(cfg.is_allowed_extension("PDF"));
        assert!(!cfg.is_allowed_extension("doc"));
    }
}

//! # DocLens CLI (`doclens`)
//!
//! ## Usage
//!
//! ```bash
//! doclens --config ./config/doclens.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `doclens init` | Create the SQLite database and run schema migrations |
//! | `doclens upload <file>` | Analyze and store one file |
//! | `doclens import <dir>` | Analyze and store every matching file under a directory |
//! | `doclens search "<query>"` | Search stored documents |
//! | `doclens get <id>` | Print a full document by UUID |
//! | `doclens list` | List documents, one page at a time |
//! | `doclens stats` | Corpus statistics |
//! | `doclens categories` | Classifications present in the corpus |
//! | `doclens classify "<text>"` | Classify text without storing it |
//! | `doclens serve` | Start the HTTP API |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use doclens::config::{self, Config};
use doclens::ingest::IngestOutcome;
use doclens::sqlite_store::SqliteStore;
use doclens::{classify, get, import, ingest, migrate, search, server, stats};

/// DocLens CLI: document analysis and search.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/doclens.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "doclens",
    about = "DocLens: document classification, keyword extraction, and search",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/doclens.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema. Safe to run repeatedly.
    Init,

    /// Analyze and store one TXT, PDF, or DOCX file.
    Upload {
        /// Path to the file.
        file: PathBuf,
    },

    /// Analyze and store every matching file under a directory.
    ///
    /// Without `--include`, files are selected by the allowed upload
    /// extensions (`**/*.txt`, `**/*.pdf`, ...).
    Import {
        /// Directory to walk.
        dir: PathBuf,

        /// Glob selecting files, relative to the directory. Repeatable.
        #[arg(long)]
        include: Vec<String>,
    },

    /// Search stored documents.
    Search {
        /// The search query string.
        query: String,

        /// Search mode: `keyword`, `phrase`, `exact`, or `fuzzy`.
        /// Defaults to `[search].default_mode`.
        #[arg(long)]
        mode: Option<String>,

        /// Maximum number of results to print.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print a document by its UUID.
    Get {
        /// Document UUID.
        id: String,
    },

    /// List documents in upload order.
    List {
        #[arg(long)]
        page: Option<usize>,

        /// Documents per page (max 50).
        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Show corpus statistics.
    Stats,

    /// List the classifications present in the corpus.
    Categories,

    /// Classify text without storing it.
    ///
    /// Works without a config file; the built-in categories are used then.
    Classify {
        /// Text to classify.
        text: Option<String>,

        /// Read the text from a file instead (TXT, PDF, or DOCX).
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Classify { text, file } = &cli.command {
        let cfg = if cli.config.exists() {
            config::load_config(&cli.config)?
        } else {
            Config::minimal()
        };
        classify::run_classify(&cfg, text.clone(), file.as_deref())?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Upload { file } => {
            run_upload(&cfg, &file).await?;
        }
        Commands::Import { dir, include } => {
            run_import(&cfg, &dir, &include).await?;
        }
        Commands::Search { query, mode, limit } => {
            search::run_search(&cfg, &query, mode.as_deref(), limit).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::List { page, per_page } => {
            get::run_list(&cfg, page, per_page).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Categories => {
            stats::run_categories(&cfg).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Classify { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}

async fn run_upload(cfg: &Config, file: &std::path::Path) -> Result<()> {
    let classifier = cfg.classifier.build()?;
    let store = SqliteStore::open(cfg).await?;
    let outcome = ingest::ingest_path(cfg, &classifier, &store, file).await;
    store.close().await;

    match outcome? {
        IngestOutcome::Created(doc) => {
            println!("Uploaded {}", doc.title);
            println!("  id:             {}", doc.id);
            println!(
                "  classification: {} ({:.2})",
                doc.classification, doc.confidence_score
            );
            println!("  keywords:       {}", doc.keywords.join(", "));
            println!("  words:          {}", doc.word_count);
        }
        IngestOutcome::Duplicate(doc) => {
            println!("Already uploaded as {} ({})", doc.id, doc.title);
        }
    }
    Ok(())
}

async fn run_import(cfg: &Config, dir: &std::path::Path, include: &[String]) -> Result<()> {
    let classifier = cfg.classifier.build()?;
    let store = SqliteStore::open(cfg).await?;
    let summary = import::import_directory(cfg, &classifier, &store, dir, include).await;
    store.close().await;
    let summary = summary?;

    println!(
        "Import complete: {} added, {} duplicates, {} failed",
        summary.created, summary.duplicates, summary.failed
    );
    Ok(())
}

//! # DocLens
//!
//! Document analysis and search. Uploaded TXT, PDF, and DOCX files are
//! reduced to plain text, classified against a keyword table, summarized
//! into keywords, and stored in SQLite. Searches run in keyword, phrase,
//! exact, or fuzzy mode and return ranked results with highlighted snippets.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌──────────┐
//! │ Upload/Import │──▶│ Extract+Classify │──▶│  SQLite  │
//! │  TXT/PDF/DOCX │   │    +Keywords     │   │          │
//! └──────────────┘   └──────────────────┘   └────┬─────┘
//!                                                │ corpus snapshot
//!                         ┌──────────────────────┤
//!                         ▼                      ▼
//!                    ┌──────────┐          ┌──────────┐
//!                    │   CLI    │          │   HTTP   │
//!                    │(doclens) │          │  (/api)  │
//!                    └──────────┘          └──────────┘
//! ```
//!
//! The analysis and search algorithms live in the `doclens-core` crate;
//! this crate adds file extraction, persistence, and the outer surfaces.
//!
//! ## Quick Start
//!
//! ```bash
//! doclens init
//! doclens upload ./reports/q3.pdf
//! doclens search "climate change" --mode phrase
//! doclens serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`extract`] | TXT/PDF/DOCX text extraction |
//! | [`ingest`] | Upload validation and document construction |
//! | [`import`] | Bulk directory import |
//! | [`search`] | Corpus search with result enrichment |
//! | [`get`] | Document lookup and pagination |
//! | [`stats`] | Corpus statistics |
//! | [`classify`] | Ad-hoc classification |
//! | [`server`] | HTTP JSON API |
//! | [`sqlite_store`] | SQLite connection and document store |
//! | [`migrate`] | Schema migrations |

pub mod classify;
pub mod config;
pub mod extract;
pub mod get;
pub mod import;
pub mod ingest;
pub mod migrate;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod stats;

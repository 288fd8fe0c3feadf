//! # DocLens Core
//!
//! Text analysis and search engine for DocLens: document models, keyword
//! extraction, classification, highlighting, snippet extraction, corpus
//! search, statistics, and the storage trait.
//!
//! Everything here is synchronous and free of I/O except the
//! [`store::DocumentStore`] trait, whose implementations live with the
//! application (SQLite) or in [`store::memory`] (in-memory).

pub mod classify;
pub mod highlight;
pub mod keywords;
pub mod models;
pub mod search;
pub mod snippet;
pub mod stats;
pub mod store;
pub mod text;

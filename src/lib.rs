//! Linkscout: a relevancy-tiered web crawler
//!
//! This crate crawls a seed set of web sites depth-first, records every page it
//! fetches and every outbound link it finds, and tags each link with a priority
//! tier derived from keyword matching and an optional LLM relevancy scorer.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Fatal error type for Linkscout operations
///
/// Per-URL failures never surface here; they are recorded on the page row.
/// Only conditions that make the whole run meaningless end up in this enum.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

// Re-export commonly used types
pub use classify::{KeywordClassifier, PriorityTier, RelevancyScorer};
pub use config::{Config, CrawlSettings};
pub use crawler::{CrawlEngine, CrawlSummary, RetryPolicy, VisitedSet};
pub use url::{canonicalize_url, toggle_www};

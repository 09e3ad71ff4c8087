//! Configuration module for Linkscout
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving them together with command-line overrides into the
//! settings a crawl run uses.
//!
//! # Example
//!
//! ```no_run
//! use linkscout::config::{load_config, Overrides};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkscout.toml")).unwrap();
//! let settings = config.resolve(&Overrides::default());
//! println!("Crawler will use max depth: {}", settings.max_depth);
//! ```

mod parser;
mod settings;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, GeminiConfig, KeywordConfig, OutputConfig, RetryConfig, ScorerConfig,
    ScorerKind, TestModeConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use settings::{parse_keywords, CrawlSettings, Overrides};

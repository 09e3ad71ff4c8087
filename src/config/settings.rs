//! Resolution of file configuration plus command-line overrides
//!
//! The crawl engine never sees [`Config`] directly. It receives an immutable
//! [`CrawlSettings`] built here once at startup.

use crate::classify::KeywordClassifier;
use crate::config::types::{Config, ScorerConfig};
use crate::crawler::RetryPolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces the configured high keywords when non-empty
    pub high_priority: Vec<String>,

    /// Replaces the configured medium keywords when non-empty
    pub medium_priority: Vec<String>,

    /// Use the `[test-mode]` seeds and caps
    pub test_mode: bool,

    pub max_depth: Option<u32>,
    pub max_pages: Option<u32>,
}

/// Everything one crawl run needs, fixed for the duration of the run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub seeds: Vec<String>,
    pub max_depth: u32,

    /// Page rows written per run; `None` means uncapped
    pub max_pages: Option<u32>,

    pub max_links_per_page: usize,
    pub classifier: KeywordClassifier,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub scorer: ScorerConfig,
    pub database_path: PathBuf,
}

impl Config {
    /// Applies overrides and freezes the result into [`CrawlSettings`]
    ///
    /// Precedence, lowest to highest: file values, test mode, explicit flags.
    pub fn resolve(&self, overrides: &Overrides) -> CrawlSettings {
        let (seeds, mut max_depth, mut max_pages, max_links_per_page) = if overrides.test_mode {
            (
                self.test_mode.seeds.clone(),
                self.test_mode.max_depth,
                Some(self.test_mode.max_pages),
                self.test_mode.max_links_per_page,
            )
        } else {
            (
                self.seeds.clone(),
                self.crawler.max_depth,
                self.crawler.max_pages,
                self.crawler.max_links_per_page,
            )
        };

        if let Some(depth) = overrides.max_depth {
            max_depth = depth;
        }
        if let Some(pages) = overrides.max_pages {
            max_pages = Some(pages.max(1));
        }

        let high = pick_keywords(&overrides.high_priority, &self.keywords.high);
        let medium = pick_keywords(&overrides.medium_priority, &self.keywords.medium);

        CrawlSettings {
            seeds,
            max_depth,
            max_pages,
            max_links_per_page,
            classifier: KeywordClassifier::new(high, medium),
            retry: RetryPolicy::from(&self.retry),
            request_timeout: Duration::from_secs(self.crawler.request_timeout_secs),
            user_agent: self.crawler.user_agent.clone(),
            scorer: self.scorer.clone(),
            database_path: PathBuf::from(&self.output.database_path),
        }
    }
}

fn pick_keywords<'a>(overridden: &'a [String], configured: &'a [String]) -> &'a [String] {
    if overridden.is_empty() {
        configured
    } else {
        overridden
    }
}

/// Splits a comma-separated keyword list, dropping blanks
///
/// # Examples
///
/// ```
/// use linkscout::config::parse_keywords;
///
/// assert_eq!(parse_keywords("Budget, ACFR ,,"), vec!["Budget", "ACFR"]);
/// assert!(parse_keywords("").is_empty());
/// ```
pub fn parse_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

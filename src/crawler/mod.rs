//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry and a `www.` host fallback
//! - HTML parsing and link extraction with surrounding context
//! - The depth-first frontier and visited sets
//! - Overall crawl orchestration

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod retry;
mod summary;
#[cfg(test)]
mod testing;
mod visited;

pub use engine::{build_scorer, run_crawl, CrawlEngine};
pub use fetcher::{
    build_http_client, FetchError, FetchErrorKind, FetchResponse, Fetcher, HttpFetcher,
    MAX_REDIRECTS,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{
    parse_html, ExtractedLink, ExtractionError, HtmlLinkExtractor, LinkExtractor, ParsedPage,
    MAX_CONTEXT_CHARS,
};
pub use retry::RetryPolicy;
pub use summary::{CrawlSummary, Termination};
pub use visited::VisitedSet;

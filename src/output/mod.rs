//! Output module for crawl summaries and database reports
//!
//! This module handles:
//! - Printing the end-of-run crawl summary
//! - Listing stored links and pages for the read-only CLI queries
//! - Printing database statistics
//! - Describing resolved settings for dry runs

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use crate::classify::PriorityTier;
use crate::config::CrawlSettings;
use crate::crawler::CrawlSummary;
use crate::storage::{LinkRecord, PageRecord};
use std::fmt;

/// Counters of one crawl run
impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Summary ===\n")?;
        writeln!(f, "  Result: {}", self.termination)?;
        writeln!(
            f,
            "  Pages written: {} ({} failed)",
            self.pages_fetched, self.pages_failed
        )?;
        writeln!(f, "  Links discovered: {}", self.links_discovered)?;
        for tier in PriorityTier::ALL {
            writeln!(f, "    {}: {}", tier, self.links_by_tier.get(tier))?;
        }
        if self.scorer_fallbacks > 0 {
            writeln!(f, "  Links scored by keywords only: {}", self.scorer_fallbacks)?;
        }
        if self.frontier_discarded > 0 {
            writeln!(f, "  Unvisited URLs discarded: {}", self.frontier_discarded)?;
        }
        Ok(())
    }
}

pub fn print_summary(summary: &CrawlSummary) {
    print!("{}", summary);
}

/// Stored links of one tier, one entry per link: score, target, source, context
pub struct LinkListing<'a> {
    pub tier: PriorityTier,
    pub links: &'a [LinkRecord],
}

impl fmt::Display for LinkListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} links ({}):", self.tier, self.links.len())?;

        for link in self.links {
            let score = link
                .relevancy_score
                .map_or_else(|| "  - ".to_string(), |s| format!("{:.2}", s));
            writeln!(
                f,
                "  [{}] {}\n         from {}\n         {}",
                score, link.target_url, link.source_page_url, link.anchor_context
            )?;
        }
        Ok(())
    }
}

pub fn print_links(tier: PriorityTier, links: &[LinkRecord]) {
    print!("{}", LinkListing { tier, links });
}

/// Stored pages, one line each: depth, status, URL, and title or error
pub struct PageListing<'a>(pub &'a [PageRecord]);

impl fmt::Display for PageListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pages ({}):", self.0.len())?;

        for page in self.0 {
            let status = page
                .status_code
                .map_or_else(|| "---".to_string(), |s| s.to_string());
            let note = match (&page.error, &page.title) {
                (Some(error), _) => format!("ERROR {}", error),
                (None, Some(title)) => title.clone(),
                (None, None) => String::new(),
            };
            writeln!(f, "  d{} {} {}  {}", page.depth, status, page.url, note)?;
        }
        Ok(())
    }
}

pub fn print_pages(pages: &[PageRecord]) {
    print!("{}", PageListing(pages));
}

/// What a crawl with the wrapped settings would do
pub struct SettingsReport<'a>(pub &'a CrawlSettings);

impl fmt::Display for SettingsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.0;

        writeln!(f, "Seeds:")?;
        for seed in &settings.seeds {
            writeln!(f, "  {}", seed)?;
        }
        writeln!(f, "Max depth: {}", settings.max_depth)?;
        match settings.max_pages {
            Some(max_pages) => writeln!(f, "Max pages: {}", max_pages)?,
            None => writeln!(f, "Max pages: unlimited")?,
        }
        writeln!(f, "Max links per page: {}", settings.max_links_per_page)?;
        writeln!(
            f,
            "High keywords: {}",
            settings.classifier.high_keywords().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "Medium keywords: {}",
            settings
                .classifier
                .medium_keywords()
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        writeln!(
            f,
            "Retry: {} attempts, {:?} base delay, {:?} cap, www toggle {}",
            settings.retry.max_attempts,
            settings.retry.base_delay,
            settings.retry.max_delay,
            if settings.retry.toggle_www { "on" } else { "off" }
        )?;
        match settings.scorer.active_model() {
            Some(model) => writeln!(f, "Scorer: {:?} ({})", settings.scorer.kind, model)?,
            None => writeln!(f, "Scorer: {:?}", settings.scorer.kind)?,
        }
        writeln!(f, "Database: {}", settings.database_path.display())
    }
}

//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::classify::{PriorityTier, TierCounts};
use crate::storage::{Storage, StorageResult};
use std::collections::BTreeMap;
use std::fmt;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Total number of page rows
    pub total_pages: u64,

    /// Pages recorded with an error
    pub failed_pages: u64,

    /// Total number of link rows
    pub total_links: u64,

    pub links_by_tier: TierCounts,

    /// depth -> number of pages at that depth
    pub depth_breakdown: BTreeMap<u32, u64>,
}

impl CrawlStatistics {
    /// Percentage of pages fetched and parsed without error
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        let succeeded = self.total_pages.saturating_sub(self.failed_pages);
        (succeeded as f64 / self.total_pages as f64) * 100.0
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CrawlStatistics> {
    let links_by_tier = TierCounts {
        high: storage.count_links_by_tier(PriorityTier::High)?,
        medium: storage.count_links_by_tier(PriorityTier::Medium)?,
        low: storage.count_links_by_tier(PriorityTier::Low)?,
        none: storage.count_links_by_tier(PriorityTier::None)?,
    };

    Ok(CrawlStatistics {
        total_pages: storage.count_pages()?,
        failed_pages: storage.count_failed_pages()?,
        total_links: storage.count_links()?,
        links_by_tier,
        depth_breakdown: storage.depth_breakdown()?,
    })
}

/// Plain-text statistics report
impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===\n")?;

        writeln!(f, "Overview:")?;
        writeln!(f, "  Total pages: {}", self.total_pages)?;
        writeln!(f, "  Failed pages: {}", self.failed_pages)?;
        writeln!(f, "  Total links found: {}", self.total_links)?;
        writeln!(f)?;

        writeln!(f, "Links by Tier:")?;
        for tier in PriorityTier::ALL {
            let count = self.links_by_tier.get(tier);
            let percentage = if self.total_links > 0 {
                (count as f64 / self.total_links as f64) * 100.0
            } else {
                0.0
            };
            writeln!(f, "  {}: {} ({:.1}%)", tier, count, percentage)?;
        }
        writeln!(f)?;

        if !self.depth_breakdown.is_empty() {
            writeln!(f, "Pages by Depth:")?;
            for (depth, count) in &self.depth_breakdown {
                writeln!(f, "  Depth {}: {}", depth, count)?;
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "Success Rate: {:.1}% ({} / {} pages fetched without error)",
            self.success_rate(),
            self.total_pages.saturating_sub(self.failed_pages),
            self.total_pages
        )
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", stats);
}

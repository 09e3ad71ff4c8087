use crate::classify::TierCounts;
use std::fmt;

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The frontier ran dry
    Completed,
    /// The page cap was reached; the rest of the frontier was dropped
    BudgetExhausted,
    /// The cancellation token fired between pages
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::BudgetExhausted => write!(f, "page budget exhausted"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Page rows written, successful or not
    pub pages_fetched: u64,
    /// Page rows written with an error
    pub pages_failed: u64,
    /// Link rows written
    pub links_discovered: u64,
    pub links_by_tier: TierCounts,
    /// Links classified by keywords alone because the scorer was unavailable
    pub scorer_fallbacks: u64,
    /// Frontier entries dropped when the crawl stopped early
    pub frontier_discarded: u64,
    pub termination: Termination,
}

impl Default for CrawlSummary {
    fn default() -> Self {
        Self {
            pages_fetched: 0,
            pages_failed: 0,
            links_discovered: 0,
            links_by_tier: TierCounts::default(),
            scorer_fallbacks: 0,
            frontier_discarded: 0,
            termination: Termination::Completed,
        }
    }
}

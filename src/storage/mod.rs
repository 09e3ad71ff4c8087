//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Page persistence, one row per attempted URL
//! - Link persistence with priority tiers and relevancy scores
//! - Read-only queries used by the CLI reports

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::classify::PriorityTier;
use chrono::{DateTime, Utc};

/// Represents a page in the database
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    /// Canonical URL
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    /// Last HTTP status seen; `None` when no response arrived
    pub status_code: Option<u16>,
    pub title: Option<String>,
    /// Distance from the seed, which is depth 0
    pub depth: u32,
    /// Why the fetch or extraction failed; `None` on success
    pub error: Option<String>,
}

impl PageRecord {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Represents one link occurrence found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub source_page_url: String,
    pub target_url: String,
    pub anchor_context: String,
    pub priority_tier: PriorityTier,
    /// Scorer verdict; `None` when the link was classified by keywords alone
    pub relevancy_score: Option<f64>,
    pub discovered_at: DateTime<Utc>,
}

/// Narrows [`Storage::list_pages`]
#[derive(Debug, Clone, Default)]
pub struct PageFilter {
    pub depth: Option<u32>,
    /// Case-sensitive substring of the URL
    pub url_contains: Option<String>,
}

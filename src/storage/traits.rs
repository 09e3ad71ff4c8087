//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::classify::PriorityTier;
use crate::storage::{LinkRecord, PageFilter, PageRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Writes are append-only during a crawl: a page row is written once and
/// never updated, and link rows are only ever inserted. The only destructive
/// operation is [`clear`](Storage::clear).
pub trait Storage {
    // ===== Writes =====

    /// Inserts a page row
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The row was written
    /// * `Ok(false)` - A row for this URL already existed and was left untouched
    fn insert_page(&mut self, page: &PageRecord) -> StorageResult<bool>;

    /// Inserts all links found on one page in a single transaction
    ///
    /// Returns the number of rows written.
    fn insert_links(&mut self, links: &[LinkRecord]) -> StorageResult<usize>;

    /// Deletes every link, then every page
    fn clear(&mut self) -> StorageResult<()>;

    // ===== Queries =====

    /// Gets a page by canonical URL
    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    /// Lists pages ordered by fetch time
    fn list_pages(&self, filter: &PageFilter) -> StorageResult<Vec<PageRecord>>;

    /// Lists links of one tier, most relevant first
    fn links_by_tier(
        &self,
        tier: PriorityTier,
        limit: Option<usize>,
    ) -> StorageResult<Vec<LinkRecord>>;

    /// Lists the links found on one page, in discovery order
    fn links_from(&self, source_url: &str) -> StorageResult<Vec<LinkRecord>>;

    // ===== Statistics =====

    /// Gets total page count
    fn count_pages(&self) -> StorageResult<u64>;

    /// Counts pages whose fetch or extraction failed
    fn count_failed_pages(&self) -> StorageResult<u64>;

    /// Counts the total number of links
    fn count_links(&self) -> StorageResult<u64>;

    fn count_links_by_tier(&self, tier: PriorityTier) -> StorageResult<u64>;

    /// Gets page count breakdown by depth
    ///
    /// Returns a map of depth -> number of pages at that depth
    fn depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>>;
}

//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::classify::PriorityTier;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{LinkRecord, PageFilter, PageRecord};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

const PAGE_COLUMNS: &str = "url, fetched_at, status_code, title, depth, error";
const LINK_COLUMNS: &str =
    "source_page_url, target_url, anchor_context, priority_tier, relevancy_score, discovered_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Writes =====

    fn insert_page(&mut self, page: &PageRecord) -> StorageResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO pages (url, fetched_at, status_code, title, depth, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                page.url,
                page.fetched_at.to_rfc3339(),
                page.status_code,
                page.title,
                page.depth,
                page.error
            ],
        )?;
        Ok(inserted == 1)
    }

    fn insert_links(&mut self, links: &[LinkRecord]) -> StorageResult<usize> {
        if links.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (source_page_url, target_url, anchor_context, priority_tier,
                 relevancy_score, discovered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;

            for link in links {
                stmt.execute(params![
                    link.source_page_url,
                    link.target_url,
                    link.anchor_context,
                    link.priority_tier.to_db_string(),
                    link.relevancy_score,
                    link.discovered_at.to_rfc3339()
                ])?;
            }
        }
        tx.commit()?;

        Ok(links.len())
    }

    fn clear(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM links", [])?;
        tx.execute("DELETE FROM pages", [])?;
        tx.commit()?;
        Ok(())
    }

    // ===== Queries =====

    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let page = self
            .conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE url = ?1", PAGE_COLUMNS),
                params![url],
                page_from_row,
            )
            .optional()?;

        Ok(page)
    }

    fn list_pages(&self, filter: &PageFilter) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages
             WHERE (?1 IS NULL OR depth = ?1)
               AND (?2 IS NULL OR instr(url, ?2) > 0)
             ORDER BY fetched_at, url",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![filter.depth, filter.url_contains], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn links_by_tier(
        &self,
        tier: PriorityTier,
        limit: Option<usize>,
    ) -> StorageResult<Vec<LinkRecord>> {
        let limit = match limit {
            Some(n) => i64::try_from(n)
                .map_err(|_| StorageError::Database(format!("limit {} too large", n)))?,
            None => -1,
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM links
             WHERE priority_tier = ?1
             ORDER BY relevancy_score DESC NULLS LAST, id
             LIMIT ?2",
            LINK_COLUMNS
        ))?;

        let links = stmt
            .query_map(params![tier.to_db_string(), limit], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn links_from(&self, source_url: &str) -> StorageResult<Vec<LinkRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM links WHERE source_page_url = ?1 ORDER BY id",
            LINK_COLUMNS
        ))?;

        let links = stmt
            .query_map(params![source_url], link_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Statistics =====

    fn count_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages", [])
    }

    fn count_failed_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages WHERE error IS NOT NULL", [])
    }

    fn count_links(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM links", [])
    }

    fn count_links_by_tier(&self, tier: PriorityTier) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM links WHERE priority_tier = ?1",
            params![tier.to_db_string()],
        )
    }

    fn depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>> {
        let query = "
            SELECT depth, COUNT(*) as count
            FROM pages
            GROUP BY depth
            ORDER BY depth
        ";

        let mut stmt = self.conn.prepare(query)?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)?)))?;

        let mut breakdown = BTreeMap::new();
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count.max(0) as u64);
        }

        Ok(breakdown)
    }
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        url: row.get(0)?,
        fetched_at: timestamp_column(row, 1)?,
        status_code: row.get(2)?,
        title: row.get(3)?,
        depth: row.get(4)?,
        error: row.get(5)?,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    let tier: String = row.get(3)?;
    let priority_tier = PriorityTier::from_db_string(&tier).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            Box::new(StorageError::Serialization(format!(
                "unknown priority tier '{}'",
                tier
            ))),
        )
    })?;

    Ok(LinkRecord {
        source_page_url: row.get(0)?,
        target_url: row.get(1)?,
        anchor_context: row.get(2)?,
        priority_tier,
        relevancy_score: row.get(4)?,
        discovered_at: timestamp_column(row, 5)?,
    })
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

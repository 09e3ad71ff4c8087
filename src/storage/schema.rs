//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Linkscout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per URL the crawler attempted
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY,
    fetched_at TEXT NOT NULL,
    status_code INTEGER,
    title TEXT,
    depth INTEGER NOT NULL,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_pages_depth ON pages(depth);

-- One row per link occurrence; the same target may appear many times
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_page_url TEXT NOT NULL REFERENCES pages(url),
    target_url TEXT NOT NULL,
    anchor_context TEXT NOT NULL,
    priority_tier TEXT NOT NULL,
    relevancy_score REAL,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_links_source ON links(source_page_url);
CREATE INDEX IF NOT EXISTS idx_links_tier ON links(priority_tier);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

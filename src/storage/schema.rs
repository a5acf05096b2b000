//! Database schema definitions
//!
//! This module contains the SQL schema for the Skein frontier database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per distinct canonical address
CREATE TABLE IF NOT EXISTS addresses (
    digest TEXT PRIMARY KEY NOT NULL,
    address TEXT NOT NULL,
    status TEXT NOT NULL,
    depth INTEGER NOT NULL,
    domain TEXT,
    tld TEXT,
    discovered_at TEXT NOT NULL,
    claimed_at INTEGER,
    finished_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_addresses_claim ON addresses(status, depth, digest);
CREATE INDEX IF NOT EXISTS idx_addresses_domain ON addresses(domain);

-- Directed discovery edges, one per discovery event
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_digest TEXT NOT NULL REFERENCES addresses(digest),
    child_digest TEXT NOT NULL REFERENCES addresses(digest),
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_edges_parent ON edges(parent_digest);
CREATE INDEX IF NOT EXISTS idx_edges_child ON edges(child_digest);
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

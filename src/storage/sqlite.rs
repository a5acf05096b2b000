//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore
//! trait. Claims and inserts run inside `BEGIN IMMEDIATE` transactions, so
//! they stay atomic across separate connections to the same database file.

use crate::state::FrontierStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StoreError, StoreResult};
use crate::storage::{AddressRecord, Discovered, EdgeRecord, NewAddress};
use crate::url::AddressDigest;
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, ToSql, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// How long a connection waits on another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const RECORD_COLUMNS: &str = "digest, address, status, depth, domain, tld, discovered_at";

/// SQLite frontier store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a frontier database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(StoreError::Open)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(StoreError::Open)?;

        initialize_schema(&conn).map_err(StoreError::Open)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(StoreError::Open)?;
        initialize_schema(&conn).map_err(StoreError::Open)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Gets all edges leaving a record, oldest first
    pub fn edges_from(&self, parent: &AddressDigest) -> StoreResult<Vec<EdgeRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, parent_digest, child_digest, discovered_at
                 FROM edges WHERE parent_digest = ?1 ORDER BY id",
            )
            .map_err(StoreError::Read)?;

        let edges = stmt
            .query_map(params![parent.as_str()], |row| {
                Ok(EdgeRecord {
                    id: row.get(0)?,
                    parent_digest: AddressDigest::from_hex(row.get::<_, String>(1)?),
                    child_digest: AddressDigest::from_hex(row.get::<_, String>(2)?),
                    discovered_at: row.get(3)?,
                })
            })
            .map_err(StoreError::Read)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::Read)?;

        Ok(edges)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> StoreResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(sql, params, |row| row.get(0))
            .map_err(StoreError::Read)?;
        Ok(count as u64)
    }

    /// Moves a record into a terminal status from any status allowed to reach it
    fn finish(&self, digest: &AddressDigest, target: FrontierStatus) -> StoreResult<()> {
        let sources: Vec<&'static str> = FrontierStatus::sources_of(target)
            .into_iter()
            .map(|status| status.to_db_string())
            .collect();
        let placeholders = (0..sources.len())
            .map(|i| format!("?{}", i + 4))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "UPDATE addresses SET status = ?1, finished_at = ?2
             WHERE digest = ?3 AND status IN ({})",
            placeholders
        );

        let status = target.to_db_string();
        let finished_at = Utc::now().to_rfc3339();
        let digest_hex = digest.as_str();
        let mut values: Vec<&dyn ToSql> = vec![
            &status as &dyn ToSql,
            &finished_at as &dyn ToSql,
            &digest_hex as &dyn ToSql,
        ];
        values.extend(sources.iter().map(|source| source as &dyn ToSql));

        let conn = self.conn()?;
        let changed = conn
            .execute(&sql, values.as_slice())
            .map_err(StoreError::Write)?;

        if changed == 0 {
            return Self::settled_as(&conn, digest, target);
        }
        Ok(())
    }

    /// Explains why a status update touched no row
    fn settled_as(
        conn: &Connection,
        digest: &AddressDigest,
        target: FrontierStatus,
    ) -> StoreResult<()> {
        let current = conn
            .query_row(
                "SELECT status FROM addresses WHERE digest = ?1",
                params![digest.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(StoreError::Read)?;

        match current.as_deref().map(FrontierStatus::from_db_string) {
            None => Err(StoreError::RecordNotFound(digest.clone())),
            Some(Some(status)) if status == target => Ok(()),
            Some(Some(status)) => Err(StoreError::InvalidTransition {
                from: status,
                to: target,
            }),
            Some(None) => Err(StoreError::Read(rusqlite::Error::InvalidColumnType(
                0,
                "status".to_string(),
                Type::Text,
            ))),
        }
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<AddressRecord> {
    let status: String = row.get(2)?;
    let status = FrontierStatus::from_db_string(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown frontier status '{}'", status).into(),
        )
    })?;

    Ok(AddressRecord {
        digest: AddressDigest::from_hex(row.get::<_, String>(0)?),
        address: row.get(1)?,
        status,
        depth: row.get(3)?,
        domain: row.get(4)?,
        tld: row.get(5)?,
        discovered_at: row.get(6)?,
    })
}

impl FrontierStore for SqliteStore {
    // ===== Claim Protocol =====

    fn claim_next(&self, max_depth: u32) -> StoreResult<Option<AddressRecord>> {
        let mut conn = self.conn()?;

        // The immediate transaction holds the write lock from the select
        // through the update, so no other connection can claim in between.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::Write)?;

        let candidate = tx
            .query_row(
                &format!(
                    "SELECT {} FROM addresses WHERE status = ?1 AND depth <= ?2
                     ORDER BY digest LIMIT 1",
                    RECORD_COLUMNS
                ),
                params![FrontierStatus::Pending.to_db_string(), max_depth],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::Read)?;

        let Some(mut record) = candidate else {
            return Ok(None);
        };

        let changed = tx
            .execute(
                "UPDATE addresses SET status = ?1, claimed_at = ?2 WHERE digest = ?3 AND status = ?4",
                params![
                    FrontierStatus::Claimed.to_db_string(),
                    Utc::now().timestamp(),
                    record.digest.as_str(),
                    FrontierStatus::Pending.to_db_string(),
                ],
            )
            .map_err(StoreError::Write)?;

        if changed != 1 {
            return Err(StoreError::InvalidTransition {
                from: record.status,
                to: FrontierStatus::Claimed,
            });
        }

        tx.commit().map_err(StoreError::Write)?;

        record.status = FrontierStatus::Claimed;
        Ok(Some(record))
    }

    fn mark_failed(&self, digest: &AddressDigest) -> StoreResult<()> {
        self.finish(digest, FrontierStatus::Failed)
    }

    fn mark_done(&self, digest: &AddressDigest) -> StoreResult<()> {
        self.finish(digest, FrontierStatus::Done)
    }

    fn renew_claim(&self, digest: &AddressDigest) -> StoreResult<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE addresses SET claimed_at = ?1 WHERE digest = ?2 AND status = ?3",
                params![
                    Utc::now().timestamp(),
                    digest.as_str(),
                    FrontierStatus::Claimed.to_db_string(),
                ],
            )
            .map_err(StoreError::Write)?;
        Ok(changed == 1)
    }

    fn reclaim_stale(&self, lease: Duration) -> StoreResult<u64> {
        let cutoff = Utc::now().timestamp() - lease.as_secs() as i64;
        let conn = self.conn()?;
        let reclaimed = conn
            .execute(
                "UPDATE addresses SET status = ?1, claimed_at = NULL
                 WHERE status = ?2 AND claimed_at <= ?3",
                params![
                    FrontierStatus::Pending.to_db_string(),
                    FrontierStatus::Claimed.to_db_string(),
                    cutoff,
                ],
            )
            .map_err(StoreError::Write)?;
        Ok(reclaimed as u64)
    }

    // ===== Ingest =====

    fn find_or_create(&self, new: &NewAddress) -> StoreResult<Discovered> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::Write)?;

        // The primary key on digest decides the race; losers read the winner's row
        let inserted = tx
            .execute(
                "INSERT INTO addresses (digest, address, status, depth, domain, tld, discovered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(digest) DO NOTHING",
                params![
                    new.digest.as_str(),
                    new.address,
                    FrontierStatus::Pending.to_db_string(),
                    new.depth,
                    new.domain,
                    new.tld,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(StoreError::Write)?;

        let record = tx
            .query_row(
                &format!("SELECT {} FROM addresses WHERE digest = ?1", RECORD_COLUMNS),
                params![new.digest.as_str()],
                row_to_record,
            )
            .map_err(StoreError::Read)?;

        tx.commit().map_err(StoreError::Write)?;

        Ok(Discovered {
            record,
            created: inserted == 1,
        })
    }

    fn record_edge(&self, parent: &AddressDigest, child: &AddressDigest) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO edges (parent_digest, child_digest, discovered_at) VALUES (?1, ?2, ?3)",
            params![parent.as_str(), child.as_str(), Utc::now().to_rfc3339()],
        )
        .map_err(StoreError::Write)?;
        Ok(())
    }

    // ===== Statistics =====

    fn get_record(&self, digest: &AddressDigest) -> StoreResult<Option<AddressRecord>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM addresses WHERE digest = ?1", RECORD_COLUMNS),
            params![digest.as_str()],
            row_to_record,
        )
        .optional()
        .map_err(StoreError::Read)
    }

    fn count_by_status(&self, status: FrontierStatus) -> StoreResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM addresses WHERE status = ?1",
            params![status.to_db_string()],
        )
    }

    fn count_records(&self) -> StoreResult<u64> {
        self.count("SELECT COUNT(*) FROM addresses", [])
    }

    fn count_edges(&self) -> StoreResult<u64> {
        self.count("SELECT COUNT(*) FROM edges", [])
    }

    fn count_domains(&self) -> StoreResult<u64> {
        self.count("SELECT COUNT(DISTINCT domain) FROM addresses", [])
    }
}

//! Storage traits and error types
//!
//! This module defines the frontier store interface the crawler runs against
//! and the associated error types.

use crate::state::FrontierStatus;
use crate::storage::{AddressRecord, Discovered, NewAddress};
use crate::url::AddressDigest;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during frontier store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open frontier database: {0}")]
    Open(#[source] rusqlite::Error),

    #[error("Frontier read failed: {0}")]
    Read(#[source] rusqlite::Error),

    #[error("Frontier write failed: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(AddressDigest),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: FrontierStatus,
        to: FrontierStatus,
    },

    #[error("Store connection lock poisoned")]
    Poisoned,
}

impl StoreError {
    /// Returns true if the failure happened while changing frontier state
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write(_) | Self::InvalidTransition { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for frontier store implementations
///
/// All coordination between fetch tasks goes through this interface. The
/// claim and find-or-create operations must be atomic relative to every other
/// caller of the same store, including callers holding separate connections.
pub trait FrontierStore: Send + Sync {
    // ===== Claim Protocol =====

    /// Claims the next pending record within `max_depth`
    ///
    /// Picks the pending record with the lowest digest and moves it to
    /// `Claimed` in the same atomic step. No two callers ever receive the
    /// same record.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(record))` - The claimed record, already in `Claimed` status
    /// * `Ok(None)` - No pending record within `max_depth`
    fn claim_next(&self, max_depth: u32) -> StoreResult<Option<AddressRecord>>;

    /// Marks a pending or claimed record as failed
    ///
    /// Marking an already failed record again is a no-op.
    fn mark_failed(&self, digest: &AddressDigest) -> StoreResult<()>;

    /// Marks a claimed record as done
    ///
    /// Marking an already done record again is a no-op.
    fn mark_done(&self, digest: &AddressDigest) -> StoreResult<()>;

    /// Restamps the claim time of a record this caller still holds
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record is still claimed and its lease restarts now
    /// * `Ok(false)` - The record is no longer claimed (reclaimed or finished)
    fn renew_claim(&self, digest: &AddressDigest) -> StoreResult<bool>;

    /// Returns claimed records older than `lease` to pending
    ///
    /// # Returns
    ///
    /// The number of records reclaimed
    fn reclaim_stale(&self, lease: Duration) -> StoreResult<u64>;

    // ===== Ingest =====

    /// Returns the record for an address, creating it as pending if absent
    ///
    /// Concurrent callers racing on the same address all receive the one
    /// record that was created; exactly one of them sees `created == true`.
    fn find_or_create(&self, new: &NewAddress) -> StoreResult<Discovered>;

    /// Records a directed edge from `parent` to `child`
    ///
    /// Every discovery is recorded; repeated discoveries of the same pair
    /// produce repeated edges.
    fn record_edge(&self, parent: &AddressDigest, child: &AddressDigest) -> StoreResult<()>;

    // ===== Statistics =====

    /// Gets a record by digest
    fn get_record(&self, digest: &AddressDigest) -> StoreResult<Option<AddressRecord>>;

    /// Counts records in a given status
    fn count_by_status(&self, status: FrontierStatus) -> StoreResult<u64>;

    /// Counts all records
    fn count_records(&self) -> StoreResult<u64>;

    /// Counts all recorded edges
    fn count_edges(&self) -> StoreResult<u64>;

    /// Counts distinct registrable domains
    fn count_domains(&self) -> StoreResult<u64>;
}

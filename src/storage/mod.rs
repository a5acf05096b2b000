//! Storage module for the crawl frontier
//!
//! This module handles all persistence for the crawler, including:
//! - SQLite database initialization and schema management
//! - The atomic claim protocol over pending address records
//! - Deduplicating find-or-create of discovered addresses
//! - Link edge recording
//! - Lease-based recovery of records stuck in the claimed state

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{FrontierStore, StoreError, StoreResult};

use crate::state::FrontierStatus;
use crate::url::{domain_and_tld, AddressDigest};

use std::path::Path;

/// Opens (creating if needed) a frontier store at the given path
pub fn open_store(path: &Path) -> StoreResult<SqliteStore> {
    SqliteStore::open(path)
}

/// Represents an address record in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub digest: AddressDigest,
    pub address: String,
    pub status: FrontierStatus,
    pub depth: u32,
    pub domain: Option<String>,
    pub tld: Option<String>,
    pub discovered_at: String,
}

/// An address to be inserted into the frontier if not already present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub address: String,
    pub digest: AddressDigest,
    pub depth: u32,
    pub domain: Option<String>,
    pub tld: Option<String>,
}

impl NewAddress {
    /// Builds the insert for a canonical address at the given depth
    ///
    /// The digest and domain are derived from the address.
    pub fn new(address: impl Into<String>, depth: u32) -> Self {
        let address = address.into();
        let digest = AddressDigest::of(&address);
        let (domain, tld) = match domain_and_tld(&address) {
            Some((domain, tld)) => (Some(domain), Some(tld)),
            None => (None, None),
        };

        Self {
            address,
            digest,
            depth,
            domain,
            tld,
        }
    }
}

/// Outcome of a find-or-create call
#[derive(Debug, Clone)]
pub struct Discovered {
    /// The record as stored (pre-existing or newly created)
    pub record: AddressRecord,

    /// Whether this call created the record
    pub created: bool,
}

/// Represents a directed link edge between two records
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub id: i64,
    pub parent_digest: AddressDigest,
    pub child_digest: AddressDigest,
    pub discovered_at: String,
}

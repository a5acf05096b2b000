//! Statistics generation from the frontier database
//!
//! This module provides functionality for extracting and displaying
//! frontier statistics from the storage layer.

use crate::state::FrontierStatus;
use crate::storage::{FrontierStore, StoreResult};
use std::collections::HashMap;

/// Frontier statistics summary
#[derive(Debug, Clone)]
pub struct FrontierStatistics {
    /// Total number of address records
    pub total_records: u64,

    /// Count of records by status
    pub records_by_status: HashMap<FrontierStatus, u64>,

    /// Number of distinct registrable domains
    pub unique_domains: u64,

    /// Total number of recorded edges
    pub total_edges: u64,
}

impl FrontierStatistics {
    /// Records in a given status (zero if none)
    pub fn count(&self, status: FrontierStatus) -> u64 {
        self.records_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Loads statistics from the frontier store
///
/// # Arguments
///
/// * `store` - The frontier store to query
///
/// # Returns
///
/// * `Ok(FrontierStatistics)` - Successfully loaded statistics
/// * `Err(StoreError)` - Failed to query statistics
pub fn load_statistics(store: &dyn FrontierStore) -> StoreResult<FrontierStatistics> {
    let mut records_by_status = HashMap::new();
    for status in FrontierStatus::all() {
        let count = store.count_by_status(status)?;
        if count > 0 {
            records_by_status.insert(status, count);
        }
    }

    Ok(FrontierStatistics {
        total_records: store.count_records()?,
        records_by_status,
        unique_domains: store.count_domains()?,
        total_edges: store.count_edges()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &FrontierStatistics) {
    println!("=== Frontier Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!("  Unique domains: {}", stats.unique_domains);
    println!("  Total edges: {}", stats.total_edges);
    println!();

    println!("Records by Status:");
    for status in FrontierStatus::all() {
        let count = stats.count(status);
        let percentage = if stats.total_records > 0 {
            (count as f64 / stats.total_records as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    let finished = stats.count(FrontierStatus::Done) + stats.count(FrontierStatus::Failed);
    let success_rate = if finished > 0 {
        (stats.count(FrontierStatus::Done) as f64 / finished as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} finished records done)",
        success_rate,
        stats.count(FrontierStatus::Done),
        finished
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewAddress, SqliteStore};

    #[test]
    fn test_load_statistics() {
        let store = SqliteStore::open_in_memory().unwrap();
        let parent = store
            .find_or_create(&NewAddress::new("http://example.com", 0))
            .unwrap()
            .record;
        let child = store
            .find_or_create(&NewAddress::new("http://other.org/a", 1))
            .unwrap()
            .record;
        store.record_edge(&parent.digest, &child.digest).unwrap();

        let claimed = store.claim_next(0).unwrap().unwrap();
        store.mark_done(&claimed.digest).unwrap();

        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.unique_domains, 2);
        assert_eq!(stats.total_edges, 1);
        assert_eq!(stats.count(FrontierStatus::Done), 1);
        assert_eq!(stats.count(FrontierStatus::Pending), 1);
        assert_eq!(stats.count(FrontierStatus::Failed), 0);
        assert!(!stats.records_by_status.contains_key(&FrontierStatus::Claimed));
    }

    #[test]
    fn test_empty_statistics() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stats = load_statistics(&store).unwrap();

        assert_eq!(stats.total_records, 0);
        assert!(stats.records_by_status.is_empty());
    }
}

//! Ingest of discovered links into the frontier
//!
//! Each candidate address is find-or-created and an edge from the page it
//! was found on is recorded. Store failures for one candidate are logged and
//! never stop the rest of the batch.

use crate::config::LinksConfig;
use crate::storage::{FrontierStore, NewAddress, StoreResult};
use crate::url::{canonicalize, depth, AddressDigest};

/// Tally of one ingest batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Candidates that became new pending records
    pub created: u64,

    /// Candidates that were already known
    pub existing: u64,

    /// Edges written
    pub edges_recorded: u64,

    /// Store operations that failed (find-or-create or edge)
    pub failures: u64,
}

/// Feeds extracted candidates into the frontier
///
/// # Arguments
///
/// * `store` - The frontier store
/// * `parent` - Digest of the page the candidates were found on
/// * `candidates` - Canonical addresses from the extractor
/// * `links` - Link options (domain-label depth counting)
pub fn ingest_links(
    store: &dyn FrontierStore,
    parent: &AddressDigest,
    candidates: &[String],
    links: &LinksConfig,
) -> IngestReport {
    let mut report = IngestReport::default();

    for address in candidates {
        let new = NewAddress::new(address.as_str(), depth(address, links.count_domain_labels));

        let child = match store.find_or_create(&new) {
            Ok(discovered) => {
                if discovered.created {
                    report.created += 1;
                    tracing::debug!("new: {} (depth {})", address, new.depth);
                } else {
                    report.existing += 1;
                }
                discovered.record.digest
            }
            Err(e) => {
                report.failures += 1;
                tracing::warn!("Failed to store {}: {}", address, e);
                continue;
            }
        };

        match store.record_edge(parent, &child) {
            Ok(()) => report.edges_recorded += 1,
            Err(e) => {
                report.failures += 1;
                tracing::warn!("Failed to record edge {} -> {}: {}", parent, child, e);
            }
        }
    }

    report
}

/// Inserts configured seed addresses as pending records
///
/// Seeds are canonicalized like discovered links (with no origin) and placed
/// at their computed depth. Seeds already in the frontier are left untouched,
/// so running this on every start is harmless.
///
/// # Returns
///
/// The number of seeds that were newly created
pub fn seed_frontier(
    store: &dyn FrontierStore,
    seeds: &[String],
    links: &LinksConfig,
) -> StoreResult<u64> {
    let mut created = 0;

    for seed in seeds {
        let Some(address) = canonicalize(seed, "", links.strip_query) else {
            tracing::warn!("Skipping seed '{}': not a usable address", seed);
            continue;
        };

        let new = NewAddress::new(address.as_str(), depth(&address, links.count_domain_labels));
        if store.find_or_create(&new)?.created {
            tracing::info!("Seeded {} at depth {}", address, new.depth);
            created += 1;
        }
    }

    Ok(created)
}

//! Crawler module for frontier dispatch and page processing
//!
//! This module contains the core crawling logic, including:
//! - The dispatch loop that claims records and bounds concurrency
//! - HTTP fetching with a fixed per-request timeout
//! - Pattern-based link extraction
//! - Ingest of discovered links back into the frontier

mod dispatcher;
mod extractor;
mod fetcher;
mod ingest;
mod task;

pub use dispatcher::{DispatchSettings, DispatchSummary, Dispatcher, StopReason};
pub use extractor::extract_links;
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use ingest::{ingest_links, seed_frontier, IngestReport};
pub use task::TaskOutcome;

use crate::config::Config;
use crate::storage::FrontierStore;
use crate::SkeinError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Runs a complete crawl over an opened frontier store
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Seed the frontier with configured addresses
/// 2. Build the HTTP client
/// 3. Run the dispatcher until the frontier is exhausted or shutdown
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `store` - The frontier store
/// * `shutdown` - Flipped to `true` to stop claiming new work
///
/// # Returns
///
/// * `Ok(DispatchSummary)` - The dispatcher stopped cleanly
/// * `Err(SkeinError)` - Seeding or a claim failed
pub async fn crawl(
    config: &Config,
    store: Arc<dyn FrontierStore>,
    shutdown: watch::Receiver<bool>,
) -> Result<DispatchSummary, SkeinError> {
    let seeded = seed_frontier(store.as_ref(), &config.frontier.seeds, &config.links)
        .map_err(SkeinError::from_store_failure)?;
    if seeded > 0 {
        tracing::info!("Added {} seed addresses", seeded);
    }

    let client = build_http_client(Duration::from_millis(config.crawler.fetch_timeout_ms))?;
    let settings = DispatchSettings::from_config(&config.crawler, &config.links);

    Dispatcher::new(store, client, settings).run(shutdown).await
}

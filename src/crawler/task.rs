//! Fetch task: one claimed record from GET to terminal status
//!
//! A task owns the concurrency permit it was spawned with; the permit is
//! released when the task returns, whichever path it takes.

use crate::config::LinksConfig;
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::fetch_page;
use crate::crawler::ingest::{ingest_links, IngestReport};
use crate::storage::{AddressRecord, FrontierStore};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;

/// Shared, read-only inputs for every fetch task
pub(crate) struct TaskContext {
    pub store: Arc<dyn FrontierStore>,
    pub client: Client,
    pub links: LinksConfig,
}

/// How a fetch task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Page fetched, links ingested, record Done
    Done(IngestReport),

    /// Fetch or body read failed, record Failed
    Failed,

    /// The terminal status could not be written; the record stays Claimed
    Unsettled,
}

/// Runs a fetch task for one claimed record
pub(crate) async fn run_fetch_task(
    ctx: Arc<TaskContext>,
    record: AddressRecord,
    permit: OwnedSemaphorePermit,
) -> TaskOutcome {
    let _permit = permit;

    // Time spent waiting for the permit must not eat into the lease
    if !still_claimed(&ctx, &record) {
        return TaskOutcome::Unsettled;
    }

    let body = match fetch_page(&ctx.client, &record.address).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("{}", e);
            return match ctx.store.mark_failed(&record.digest) {
                Ok(()) => TaskOutcome::Failed,
                Err(store_err) => {
                    tracing::warn!("Failed to mark {} failed: {}", record.address, store_err);
                    TaskOutcome::Unsettled
                }
            };
        }
    };

    if !still_claimed(&ctx, &record) {
        return TaskOutcome::Unsettled;
    }

    // Extraction and ingest are synchronous store work
    let worker = Arc::clone(&ctx);
    let origin = record.address.clone();
    let parent = record.digest.clone();
    let ingested = tokio::task::spawn_blocking(move || {
        let candidates = extract_links(&body, &origin, worker.links.strip_query);
        ingest_links(worker.store.as_ref(), &parent, &candidates, &worker.links)
    })
    .await;

    let report = match ingested {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Ingest for {} aborted: {}", record.address, e);
            return TaskOutcome::Unsettled;
        }
    };

    tracing::info!("{}: {} new", record.address, report.created);

    match ctx.store.mark_done(&record.digest) {
        Ok(()) => TaskOutcome::Done(report),
        Err(e) => {
            tracing::warn!("Failed to mark {} done: {}", record.address, e);
            TaskOutcome::Unsettled
        }
    }
}

/// Restarts the claim lease; false once the claim has been taken away
fn still_claimed(ctx: &TaskContext, record: &AddressRecord) -> bool {
    match ctx.store.renew_claim(&record.digest) {
        Ok(true) => true,
        Ok(false) => {
            tracing::warn!("Claim on {} was lost, dropping it", record.address);
            false
        }
        Err(e) => {
            // Only the lease stamp is stale; the claim itself is still ours
            tracing::warn!("Failed to renew claim on {}: {}", record.address, e);
            true
        }
    }
}

//! Dispatcher - the claim loop that feeds fetch tasks
//!
//! The dispatcher is the only place work enters the system:
//! - Claims the next pending record from the frontier store
//! - Acquires one concurrency permit per claim
//! - Spawns a fetch task that owns the permit
//! - Applies the empty-frontier policy when nothing is claimable
//! - Stops claiming on shutdown or a fatal claim failure, then joins every
//!   in-flight task before returning

use crate::config::{CrawlerConfig, EmptyFrontierPolicy, LinksConfig};
use crate::crawler::task::{run_fetch_task, TaskContext, TaskOutcome};
use crate::storage::{FrontierStore, StoreError};
use crate::SkeinError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinError, JoinSet};

/// Dispatcher tuning, usually derived from the crawler configuration
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub max_depth: u32,
    pub max_concurrent_tasks: usize,
    pub on_empty_frontier: EmptyFrontierPolicy,
    pub idle_interval: Duration,

    /// Age after which claimed records are returned to pending
    pub claim_lease: Option<Duration>,

    pub links: LinksConfig,
}

impl DispatchSettings {
    /// Builds settings from the `[crawler]` and `[links]` sections
    pub fn from_config(crawler: &CrawlerConfig, links: &LinksConfig) -> Self {
        Self {
            max_depth: crawler.max_depth,
            max_concurrent_tasks: crawler.max_concurrent_tasks as usize,
            on_empty_frontier: crawler.on_empty_frontier,
            idle_interval: Duration::from_millis(crawler.idle_interval_ms),
            claim_lease: match crawler.claim_lease_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            links: *links,
        }
    }
}

/// Why the dispatch loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Nothing pending and nothing in flight under the exit policy
    Exhausted,

    /// Shutdown was requested
    Shutdown,
}

/// Counters for one dispatch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSummary {
    pub claimed: u64,
    pub done: u64,
    pub failed: u64,

    /// Tasks whose terminal status could not be written
    pub unsettled: u64,

    /// New frontier records created from extracted links
    pub created: u64,

    pub edges: u64,
    pub reclaimed: u64,
    pub stop_reason: StopReason,
}

/// Main dispatch loop state
pub struct Dispatcher {
    context: Arc<TaskContext>,
    settings: DispatchSettings,
    permits: Arc<Semaphore>,
    tasks: JoinSet<TaskOutcome>,
    summary: DispatchSummary,
}

impl Dispatcher {
    /// Creates a dispatcher over a frontier store
    ///
    /// # Arguments
    ///
    /// * `store` - The shared frontier store
    /// * `client` - HTTP client used by every fetch task
    /// * `settings` - Concurrency cap, depth limit and empty-frontier policy
    pub fn new(store: Arc<dyn FrontierStore>, client: Client, settings: DispatchSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent_tasks));
        let context = Arc::new(TaskContext {
            store,
            client,
            links: settings.links,
        });

        Self {
            context,
            settings,
            permits,
            tasks: JoinSet::new(),
            summary: DispatchSummary {
                claimed: 0,
                done: 0,
                failed: 0,
                unsettled: 0,
                created: 0,
                edges: 0,
                reclaimed: 0,
                stop_reason: StopReason::Shutdown,
            },
        }
    }

    /// Handle to the concurrency pool, for observing free permits
    pub fn permits(&self) -> Arc<Semaphore> {
        Arc::clone(&self.permits)
    }

    /// Runs the dispatch loop until the frontier is exhausted or shutdown
    ///
    /// Flipping `shutdown` to `true` (or dropping its sender) stops claiming.
    /// In-flight tasks are always joined before this returns, including when
    /// a claim failure ends the run with an error.
    pub async fn run(
        mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<DispatchSummary, SkeinError> {
        tracing::info!(
            "Dispatching up to {} concurrent tasks, max depth {}",
            self.settings.max_concurrent_tasks,
            self.settings.max_depth
        );

        if let Err(e) = self.reclaim_stale() {
            return Err(SkeinError::from_store_failure(e));
        }

        let stop_reason = loop {
            if shutdown_requested(&shutdown) {
                break StopReason::Shutdown;
            }

            self.reap_finished();

            let record = match self.context.store.claim_next(self.settings.max_depth) {
                Ok(Some(record)) => record,
                Ok(None) => {
                    // Our own claims are live while tasks run
                    if self.tasks.is_empty() {
                        match self.reclaim_stale() {
                            Ok(0) => {}
                            Ok(_) => continue,
                            Err(e) => return Err(self.fail(e).await),
                        }
                    }

                    match self.settings.on_empty_frontier {
                        EmptyFrontierPolicy::Exit => {
                            if self.tasks.is_empty() {
                                break StopReason::Exhausted;
                            }
                            // In-flight pages may still add work
                            tokio::select! {
                                joined = self.tasks.join_next() => {
                                    if let Some(joined) = joined {
                                        self.absorb(joined);
                                    }
                                }
                                _ = shutdown.changed() => {}
                            }
                        }
                        EmptyFrontierPolicy::Wait => {
                            tracing::trace!("Frontier empty, idling");
                            tokio::select! {
                                _ = tokio::time::sleep(self.settings.idle_interval) => {}
                                _ = shutdown.changed() => {}
                            }
                        }
                    }
                    continue;
                }
                Err(e) => return Err(self.fail(e).await),
            };

            self.summary.claimed += 1;
            tracing::debug!("Claimed {} (depth {})", record.address, record.depth);

            // Blocks while the pool is saturated; permits return as tasks end
            let permit = match Arc::clone(&self.permits).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!("Concurrency pool closed: {}", e);
                    if let Err(e) = self.context.store.mark_failed(&record.digest) {
                        tracing::warn!("Failed to mark {} failed: {}", record.address, e);
                    }
                    break StopReason::Shutdown;
                }
            };

            self.tasks
                .spawn(run_fetch_task(Arc::clone(&self.context), record, permit));
        };

        if !self.tasks.is_empty() {
            tracing::info!("Waiting for {} in-flight tasks", self.tasks.len());
        }
        self.drain().await;

        self.summary.stop_reason = stop_reason;
        tracing::info!(
            "Dispatch stopped ({:?}): {} claimed, {} done, {} failed, {} new records",
            stop_reason,
            self.summary.claimed,
            self.summary.done,
            self.summary.failed,
            self.summary.created
        );

        Ok(self.summary)
    }

    /// Returns stale claims to pending when a lease is configured
    fn reclaim_stale(&mut self) -> Result<u64, StoreError> {
        let Some(lease) = self.settings.claim_lease else {
            return Ok(0);
        };

        let reclaimed = self.context.store.reclaim_stale(lease)?;
        if reclaimed > 0 {
            tracing::info!("Reclaimed {} stale claims", reclaimed);
            self.summary.reclaimed += reclaimed;
        }
        Ok(reclaimed)
    }

    /// Stops on a fatal store failure after joining in-flight tasks
    async fn fail(&mut self, err: StoreError) -> SkeinError {
        tracing::error!("Claim failed: {}", err);
        self.drain().await;
        SkeinError::from_store_failure(err)
    }

    fn reap_finished(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            self.absorb(joined);
        }
    }

    async fn drain(&mut self) {
        while let Some(joined) = self.tasks.join_next().await {
            self.absorb(joined);
        }
    }

    fn absorb(&mut self, joined: Result<TaskOutcome, JoinError>) {
        match joined {
            Ok(TaskOutcome::Done(report)) => {
                self.summary.done += 1;
                self.summary.created += report.created;
                self.summary.edges += report.edges_recorded;
            }
            Ok(TaskOutcome::Failed) => self.summary.failed += 1,
            Ok(TaskOutcome::Unsettled) => self.summary.unsettled += 1,
            Err(e) => {
                tracing::error!("Fetch task aborted: {}", e);
                self.summary.unsettled += 1;
            }
        }
    }
}

/// True once shutdown was signalled or its sender is gone
fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

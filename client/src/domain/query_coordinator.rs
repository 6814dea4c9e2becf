//! Debounced, race-safe catalogue listing.
//!
//! Filter edits apply immediately; the resulting query waits for a quiet
//! period. Every issued query gets a generation number and only the response
//! for the latest generation may touch the result list, so a slow stale
//! response can never overwrite a newer one.
//!
//! ## Invariants
//! - At most one debounce timer is pending; each edit aborts and replaces it.
//! - The pending timer carries the filter snapshot it will query with.
//! - `loading` stays true until the most recently issued query resolves.
//! - A failed query leaves `results` untouched and records the error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::ports::{ApiError, CatalogueApi};
use super::{FilterPatch, FilterSet, Short};

/// Default quiet period between the last edit and the query.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tuning for the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCoordinatorConfig {
    /// Quiet period after the last edit.
    pub debounce: Duration,
}

impl Default for QueryCoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Observable listing state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSnapshot {
    /// Filters as edited so far, including edits not yet queried.
    pub filters: FilterSet,
    /// Result of the most recent completed, non-stale query.
    pub results: Arc<Vec<Short>>,
    /// True until the most recently issued query resolves.
    pub loading: bool,
    /// Error of the latest query, cleared by the next success.
    pub last_error: Option<ApiError>,
    /// Generation of the most recently issued query.
    pub issued: u64,
    /// Generation whose response populated `results`.
    pub applied: u64,
}

struct PendingQuery {
    id: u64,
    snapshot: FilterSet,
    timer: JoinHandle<()>,
}

#[derive(Default)]
struct CoordinatorInner {
    filters: FilterSet,
    pending: Option<PendingQuery>,
    next_pending_id: u64,
    latest_issued: u64,
    mounted: bool,
}

struct Shared {
    catalogue: Arc<dyn CatalogueApi>,
    config: QueryCoordinatorConfig,
    inner: Mutex<CoordinatorInner>,
    state: watch::Sender<ListingSnapshot>,
}

/// Owner of the filter set and the listing it produces.
pub struct QueryCoordinator {
    shared: Arc<Shared>,
}

impl QueryCoordinator {
    /// Coordinator with empty filters; nothing is queried until [`Self::mount`].
    pub fn new(catalogue: Arc<dyn CatalogueApi>, config: QueryCoordinatorConfig) -> Self {
        let (state, _) = watch::channel(ListingSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                catalogue,
                config,
                inner: Mutex::new(CoordinatorInner::default()),
                state,
            }),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> ListingSnapshot {
        self.shared.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ListingSnapshot> {
        self.shared.state.subscribe()
    }

    /// Filters as edited so far.
    pub fn filters(&self) -> FilterSet {
        self.shared.lock().filters.clone()
    }

    /// Issue the first, undebounced query with the current filters.
    ///
    /// Only the first call does anything.
    pub fn mount(&self) {
        let filters = {
            let mut inner = self.shared.lock();
            if inner.mounted {
                debug!("listing already mounted");
                return;
            }
            inner.mounted = true;
            inner.filters.clone()
        };
        Shared::issue_now(&self.shared, filters);
    }

    /// Merge `patch` into the filters and restart the debounce timer.
    pub fn set_filter(&self, patch: FilterPatch) {
        let mut inner = self.shared.lock();
        inner.filters.apply(patch);
        if let Some(previous) = inner.pending.take() {
            previous.timer.abort();
            debug!(pending = previous.id, "debounce restarted");
        }
        inner.next_pending_id += 1;
        let id = inner.next_pending_id;
        let snapshot = inner.filters.clone();

        let shared = Arc::clone(&self.shared);
        // The deadline is fixed here, at edit time, not when the task first runs.
        let quiet_period = tokio::time::sleep(self.shared.config.debounce);
        let timer = tokio::spawn(async move {
            quiet_period.await;
            Shared::fire(&shared, id).await;
        });
        inner.pending = Some(PendingQuery {
            id,
            snapshot: snapshot.clone(),
            timer,
        });
        self.shared
            .state
            .send_modify(|state| state.filters = snapshot);
    }

    /// Skip the quiet period and query the current filters now.
    pub fn refresh(&self) {
        let filters = {
            let mut inner = self.shared.lock();
            if let Some(previous) = inner.pending.take() {
                previous.timer.abort();
            }
            inner.filters.clone()
        };
        Shared::issue_now(&self.shared, filters);
    }

    /// Cancel the pending debounce timer. In-flight queries still complete.
    pub fn shutdown(&self) {
        if let Some(previous) = self.shared.lock().pending.take() {
            previous.timer.abort();
        }
    }
}

impl Drop for QueryCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CoordinatorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocate the next generation and flag loading. Caller holds the lock.
    fn begin(&self, inner: &mut CoordinatorInner) -> u64 {
        inner.latest_issued += 1;
        let generation = inner.latest_issued;
        self.state.send_modify(|state| {
            state.loading = true;
            state.issued = generation;
        });
        generation
    }

    fn issue_now(shared: &Arc<Self>, filters: FilterSet) {
        let generation = {
            let mut inner = shared.lock();
            shared.begin(&mut inner)
        };
        let task_shared = Arc::clone(shared);
        tokio::spawn(async move { task_shared.execute(generation, filters).await });
    }

    /// Debounce expiry for pending timer `id`.
    ///
    /// Once the pending entry is taken the timer can no longer be aborted, so
    /// the query runs to completion inside this task.
    async fn fire(shared: &Arc<Self>, id: u64) {
        let (generation, filters) = {
            let mut inner = shared.lock();
            match inner.pending.take() {
                Some(pending) if pending.id == id => {
                    let generation = shared.begin(&mut inner);
                    (generation, pending.snapshot)
                }
                other => {
                    inner.pending = other;
                    return;
                }
            }
        };
        shared.execute(generation, filters).await;
    }

    async fn execute(&self, generation: u64, filters: FilterSet) {
        debug!(generation, ?filters, "listing shorts");
        let outcome = self.catalogue.list_shorts(&filters).await;

        let inner = self.lock();
        if generation != inner.latest_issued {
            debug!(
                generation,
                latest = inner.latest_issued,
                "discarding stale listing response"
            );
            return;
        }
        self.state.send_modify(|state| {
            state.loading = false;
            match outcome {
                Ok(shorts) => {
                    state.results = Arc::new(shorts);
                    state.applied = generation;
                    state.last_error = None;
                }
                Err(error) => {
                    warn!(generation, %error, "listing query failed; keeping previous results");
                    state.last_error = Some(error);
                }
            }
        });
        drop(inner);
    }
}

#[cfg(test)]
#[path = "query_coordinator_tests.rs"]
mod tests;

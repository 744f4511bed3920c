//! Action log manager: batch purge, staleness scan, and log pruning
//!
//! Every batch operation takes already-resolved concrete paths, runs one
//! worker task per path, and waits for all of them before returning a
//! [`BatchReport`]. A failing path never stops work on the others; it is
//! logged and counted, and [`BatchReport::check`] turns a non-zero count into
//! an "N of M paths failed" error.
//!
//! ```rust,ignore
//! use actionlog::manager::ActionLogManager;
//!
//! let manager = ActionLogManager::new(store);
//! let report = manager.prune_action_logs(&paths, 10).await;
//! report.check()?;
//! ```
//!
//! All reads and deletes are optimistic. No lock is taken in the coordination
//! store, so nodes created or removed by other actors mid-operation are
//! tolerated rather than reported.

mod batch;
mod fetch;
mod prune;
mod purge;
mod stale;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::observability::ActionMetrics;
use crate::store::CoordinationStore;

use batch::PathFailure;

pub use batch::BatchReport;
pub use stale::StaleActions;

pub(crate) use fetch::{fetch_actions, list_children};

#[derive(Clone)]
pub struct ActionLogManager {
    store: Arc<dyn CoordinationStore>,
    metrics: Arc<ActionMetrics>,
}

impl ActionLogManager {
    pub fn new(store: Arc<dyn CoordinationStore>) -> Self {
        Self::with_metrics(store, Arc::new(ActionMetrics::new()))
    }

    pub fn with_metrics(store: Arc<dyn CoordinationStore>, metrics: Arc<ActionMetrics>) -> Self {
        Self { store, metrics }
    }

    pub fn metrics(&self) -> &Arc<ActionMetrics> {
        &self.metrics
    }

    /// Delete every purgeable action under each path
    ///
    /// Results map each path to the number of actions deleted.
    pub async fn purge_actions(&self, paths: &[String]) -> BatchReport<usize> {
        info!(paths = paths.len(), "Purging actions");
        let report = batch::fan_out("purge_actions", paths, &self.metrics, |path| {
            let store = Arc::clone(&self.store);
            let metrics = Arc::clone(&self.metrics);
            async move {
                let purged = purge::purge_path(store.as_ref(), &path).await?;
                metrics.actions_purged(purged);
                Ok::<_, PathFailure<usize>>(purged)
            }
        })
        .await;
        info!(failed = report.failed, total = report.total, "Purge finished");
        report
    }

    /// Find actions that have not been modified within `max_staleness`
    ///
    /// With `purge` set, a path that has at least one stale action is purged
    /// right after its scan. That purge covers only that path. If it fails,
    /// the path counts as failed and its stale set lands in
    /// [`BatchReport::partial`].
    pub async fn stale_actions(
        &self,
        paths: &[String],
        max_staleness: Duration,
        purge: bool,
    ) -> BatchReport<StaleActions> {
        self.stale_actions_at(paths, Utc::now(), max_staleness, purge)
            .await
    }

    /// [`stale_actions`](Self::stale_actions) evaluated against a fixed `now`
    pub async fn stale_actions_at(
        &self,
        paths: &[String],
        now: DateTime<Utc>,
        max_staleness: Duration,
        purge: bool,
    ) -> BatchReport<StaleActions> {
        info!(
            paths = paths.len(),
            max_staleness_secs = max_staleness.as_secs(),
            purge,
            "Checking for stale actions"
        );
        let report = batch::fan_out("stale_actions", paths, &self.metrics, |path| {
            let store = Arc::clone(&self.store);
            let metrics = Arc::clone(&self.metrics);
            async move {
                stale::stale_path(&store, &metrics, &path, now, max_staleness, purge).await
            }
        })
        .await;
        info!(failed = report.failed, total = report.total, "Stale scan finished");
        report
    }

    /// Keep only the newest `keep_count` entries under each action log path
    ///
    /// Results map each path to the number of entries deleted. Deleted
    /// entries cannot be recovered.
    pub async fn prune_action_logs(&self, paths: &[String], keep_count: usize) -> BatchReport<usize> {
        info!(paths = paths.len(), keep_count, "Pruning action logs");
        let report = batch::fan_out("prune_action_logs", paths, &self.metrics, |path| {
            let store = Arc::clone(&self.store);
            let metrics = Arc::clone(&self.metrics);
            async move {
                let pruned = prune::prune_path(store.as_ref(), &path, keep_count).await?;
                metrics.log_entries_pruned(pruned);
                Ok::<_, PathFailure<usize>>(pruned)
            }
        })
        .await;
        info!(failed = report.failed, total = report.total, "Prune finished");
        report
    }
}

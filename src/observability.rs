//! In-process counters for action log operations

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle shared by the action log manager's workers
#[derive(Debug, Default)]
pub struct ActionMetrics {
    paths_processed: AtomicU64,
    paths_failed: AtomicU64,
    actions_purged: AtomicU64,
    stale_found: AtomicU64,
    log_entries_pruned: AtomicU64,
}

impl ActionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_processed(&self) {
        self.paths_processed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "paths_processed", "Metric incremented");
    }

    pub fn path_failed(&self) {
        self.paths_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "paths_failed", "Metric incremented");
    }

    pub fn actions_purged(&self, count: usize) {
        self.actions_purged.fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "actions_purged", count, "Metric incremented");
    }

    pub fn stale_found(&self, count: usize) {
        self.stale_found.fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "stale_found", count, "Metric incremented");
    }

    pub fn log_entries_pruned(&self, count: usize) {
        self.log_entries_pruned
            .fetch_add(count as u64, Ordering::Relaxed);
        tracing::debug!(counter = "log_entries_pruned", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            paths_processed: self.paths_processed.load(Ordering::Relaxed),
            paths_failed: self.paths_failed.load(Ordering::Relaxed),
            actions_purged: self.actions_purged.load(Ordering::Relaxed),
            stale_found: self.stale_found.load(Ordering::Relaxed),
            log_entries_pruned: self.log_entries_pruned.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub paths_processed: u64,
    pub paths_failed: u64,
    pub actions_purged: u64,
    pub stale_found: u64,
    pub log_entries_pruned: u64,
}

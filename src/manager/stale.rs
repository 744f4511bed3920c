use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::action::{ActionNode, stale};
use crate::observability::ActionMetrics;
use crate::store::CoordinationStore;

use super::batch::PathFailure;
use super::fetch::fetch_actions;
use super::purge::purge_path;

/// Stale actions found under one action path
#[derive(Debug, Clone)]
pub struct StaleActions {
    pub actions: Vec<ActionNode>,
    /// Nodes deleted by the follow-up purge, zero when purging was not requested
    pub purged: usize,
}

/// Scan one path, then purge it if requested and anything stale was found
///
/// A failed purge still hands back the stale set it was triggered by.
pub(crate) async fn stale_path(
    store: &Arc<dyn CoordinationStore>,
    metrics: &ActionMetrics,
    path: &str,
    now: DateTime<Utc>,
    max_staleness: Duration,
    purge: bool,
) -> Result<StaleActions, PathFailure<StaleActions>> {
    let actions: Vec<ActionNode> = fetch_actions(store, path)
        .await?
        .into_iter()
        .filter(|node| stale(node, now, max_staleness))
        .collect();
    metrics.stale_found(actions.len());

    let mut found = StaleActions { actions, purged: 0 };
    if !purge || found.actions.is_empty() {
        return Ok(found);
    }

    info!(path, stale = found.actions.len(), "Purging path with stale actions");
    match purge_path(store.as_ref(), path).await {
        Ok(purged) => {
            metrics.actions_purged(purged);
            found.purged = purged;
            Ok(found)
        }
        Err(error) => Err(PathFailure::with_partial(found, error)),
    }
}

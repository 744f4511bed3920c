use tracing::{debug, warn};

use crate::error::{ActionLogError, Result};
use crate::store::{ChildOrdering, CoordinationStore, StoreError, join_path};

use super::fetch::list_children;

/// Delete all but the newest `keep_count` children of an action log path
///
/// Returns the number of entries this call deleted.
pub(crate) async fn prune_path(
    store: &dyn CoordinationStore,
    path: &str,
    keep_count: usize,
) -> Result<usize> {
    let children = list_children(store, path).await?;
    if children.len() <= keep_count {
        return Ok(0);
    }

    let ordered = oldest_first(store, path, children).await?;
    let excess = ordered.len().saturating_sub(keep_count);

    let mut pruned = 0;
    for child in ordered.into_iter().take(excess) {
        let child_path = join_path(path, &child);
        match store.delete_node(&child_path).await {
            Ok(()) => pruned += 1,
            Err(StoreError::NotFound(_)) => {
                debug!(path = %child_path, "Action log entry deleted concurrently");
            }
            Err(e) => return Err(ActionLogError::from_store(&child_path, e)),
        }
    }

    debug!(path, pruned, keep_count, "Pruned action log");
    Ok(pruned)
}

/// Order children from oldest to newest
///
/// Backends with sequential child names sort lexically. Any other backend is
/// ordered by modification time, with the name as a tie breaker.
async fn oldest_first(
    store: &dyn CoordinationStore,
    path: &str,
    mut children: Vec<String>,
) -> Result<Vec<String>> {
    if store.child_ordering() == ChildOrdering::Sequential {
        children.sort();
        return Ok(children);
    }

    let mut stamped = Vec::with_capacity(children.len());
    for child in children {
        let child_path = join_path(path, &child);
        match store.get_node(&child_path).await {
            Ok(data) => stamped.push((data.modified_at, child)),
            Err(StoreError::NotFound(_)) => {
                warn!(path = %child_path, "Action log entry vanished before it could be ordered");
            }
            Err(e) => return Err(ActionLogError::from_store(&child_path, e)),
        }
    }
    stamped.sort();
    Ok(stamped.into_iter().map(|(_, child)| child).collect())
}

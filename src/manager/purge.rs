use tracing::{debug, info, warn};

use crate::action::{ActionNode, purgeable};
use crate::error::{ActionLogError, Result};
use crate::store::{CoordinationStore, StoreError, join_path};

use super::fetch::list_children;

/// Delete every purgeable action node directly under `path`
///
/// Returns the number of nodes this call deleted. Nodes removed concurrently
/// by someone else are not counted.
pub(crate) async fn purge_path(store: &dyn CoordinationStore, path: &str) -> Result<usize> {
    let children = list_children(store, path).await?;
    let mut purged = 0;

    for child in children {
        let child_path = join_path(path, &child);
        let data = match store.get_node(&child_path).await {
            Ok(data) => data,
            Err(StoreError::NotFound(_)) => {
                debug!(path = %child_path, "Action node already gone");
                continue;
            }
            Err(e) => return Err(ActionLogError::from_store(&child_path, e)),
        };

        let node = match ActionNode::decode(&child_path, &data) {
            Ok(node) => node,
            Err(err) => {
                warn!(path = %child_path, error = %err, "Not purging undecodable action node");
                continue;
            }
        };
        if !purgeable(&node) {
            continue;
        }

        match store.delete_node(&child_path).await {
            Ok(()) => purged += 1,
            Err(StoreError::NotFound(_)) => {
                debug!(path = %child_path, "Action node deleted concurrently");
            }
            Err(e) => return Err(ActionLogError::from_store(&child_path, e)),
        }
    }

    info!(path, purged, "Purged actions");
    Ok(purged)
}

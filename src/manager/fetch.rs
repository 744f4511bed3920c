use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::action::ActionNode;
use crate::error::{ActionLogError, Result};
use crate::store::{CoordinationStore, StoreError, join_path};

/// List the children of `path` or an empty list if `path` does not exist
pub(crate) async fn list_children(store: &dyn CoordinationStore, path: &str) -> Result<Vec<String>> {
    match store.get_children(path).await {
        Ok(children) => Ok(children),
        Err(StoreError::NotFound(_)) => {
            debug!(path, "Action path does not exist");
            Ok(Vec::new())
        }
        Err(e) => Err(ActionLogError::from_store(path, e)),
    }
}

/// Fetch and decode every action node directly under `path`, sorted by path
///
/// Children are fetched concurrently. Nodes that vanish before they are read
/// or that fail to decode are logged and left out.
pub(crate) async fn fetch_actions(
    store: &Arc<dyn CoordinationStore>,
    path: &str,
) -> Result<Vec<ActionNode>> {
    let children = list_children(store.as_ref(), path).await?;

    let mut fetches = JoinSet::new();
    for child in children {
        let store = Arc::clone(store);
        let child_path = join_path(path, &child);
        fetches.spawn(async move {
            let fetched = store.get_node(&child_path).await;
            (child_path, fetched)
        });
    }

    let mut nodes = Vec::with_capacity(fetches.len());
    while let Some(joined) = fetches.join_next().await {
        let (child_path, fetched) = joined?;
        let data = match fetched {
            Ok(data) => data,
            Err(StoreError::NotFound(_)) => {
                warn!(path = %child_path, "Action node vanished before it could be read");
                continue;
            }
            Err(e) => return Err(ActionLogError::from_store(&child_path, e)),
        };
        match ActionNode::decode(&child_path, &data) {
            Ok(node) => nodes.push(node),
            Err(err) => warn!(path = %child_path, error = %err, "Skipping undecodable action node"),
        }
    }

    nodes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(nodes)
}

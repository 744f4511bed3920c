use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::action::ActionNode;
use crate::error::Result;
use crate::manager::fetch_actions;
use crate::store::CoordinationStore;

use super::discovery::ReplicaDiscovery;
use super::layout::TopologyLayout;

/// Merges a shard's own actions with the actions queued on its replicas
pub struct ShardActionAggregator {
    store: Arc<dyn CoordinationStore>,
    discovery: Arc<dyn ReplicaDiscovery>,
    layout: TopologyLayout,
}

impl ShardActionAggregator {
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        discovery: Arc<dyn ReplicaDiscovery>,
        layout: TopologyLayout,
    ) -> Self {
        Self {
            store,
            discovery,
            layout,
        }
    }

    /// Every action for the shard and its replicas, sorted by path
    ///
    /// Failing to read the shard's own actions or to discover its replicas
    /// fails the listing. A replica whose actions cannot be read is skipped.
    pub async fn list_shard_actions(&self, keyspace: &str, shard: &str) -> Result<Vec<ActionNode>> {
        let shard_action_path = self.layout.shard_action_path(keyspace, shard);
        let (shard_actions, replicas) = tokio::try_join!(
            fetch_actions(&self.store, &shard_action_path),
            self.discovery.replicas_in_shard(keyspace, shard),
        )?;
        debug!(
            keyspace,
            shard,
            shard_actions = shard_actions.len(),
            replicas = replicas.len(),
            "Fetched shard actions and replica list"
        );

        let mut merged: BTreeMap<String, ActionNode> = shard_actions
            .into_iter()
            .map(|node| (node.path.clone(), node))
            .collect();

        let mut fetches = JoinSet::new();
        for alias in replicas {
            let store = Arc::clone(&self.store);
            let path = self.layout.replica_action_path(&alias);
            fetches.spawn(async move {
                let fetched = fetch_actions(&store, &path).await;
                (path, fetched)
            });
        }

        while let Some(joined) = fetches.join_next().await {
            match joined {
                Ok((_, Ok(nodes))) => {
                    for node in nodes {
                        merged.insert(node.path.clone(), node);
                    }
                }
                Ok((path, Err(err))) => {
                    warn!(path = %path, error = %err, "Skipping replica actions");
                }
                Err(err) => {
                    warn!(error = %err, "Replica action fetch aborted");
                }
            }
        }

        Ok(merged.into_values().collect())
    }
}

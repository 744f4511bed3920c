use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::manager::list_children;
use crate::store::CoordinationStore;

use super::layout::{ReplicaAlias, TopologyLayout};

/// Finds the replicas serving a shard
#[async_trait]
pub trait ReplicaDiscovery: Send + Sync {
    async fn replicas_in_shard(&self, keyspace: &str, shard: &str) -> Result<Vec<ReplicaAlias>>;
}

/// Discovery that reads replica aliases from the shard's `tablets` directory
pub struct StoreReplicaDiscovery {
    store: Arc<dyn CoordinationStore>,
    layout: TopologyLayout,
}

impl StoreReplicaDiscovery {
    pub fn new(store: Arc<dyn CoordinationStore>, layout: TopologyLayout) -> Self {
        Self { store, layout }
    }
}

#[async_trait]
impl ReplicaDiscovery for StoreReplicaDiscovery {
    async fn replicas_in_shard(&self, keyspace: &str, shard: &str) -> Result<Vec<ReplicaAlias>> {
        let path = self.layout.shard_replicas_path(keyspace, shard);
        let mut replicas = Vec::new();
        for name in list_children(self.store.as_ref(), &path).await? {
            match name.parse::<ReplicaAlias>() {
                Ok(alias) => replicas.push(alias),
                Err(err) => warn!(path = %path, name = %name, error = %err, "Skipping malformed replica alias"),
            }
        }
        replicas.sort();
        Ok(replicas)
    }
}

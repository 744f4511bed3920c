//! In-memory coordination tree for tests and embedding

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::RwLock;

use super::{
    ChildOrdering, CoordinationStore, NodeData, Result, StoreError, WildcardExpander, ancestors,
    child_prefix, join_path, wildcard,
};

#[derive(Default)]
struct Tree {
    nodes: BTreeMap<String, NodeData>,
    sequences: HashMap<String, u64>,
}

impl Tree {
    fn insert(&mut self, path: &str, payload: Bytes, modified_at: DateTime<Utc>) {
        for ancestor in ancestors(path) {
            self.nodes.entry(ancestor).or_insert_with(|| NodeData {
                payload: Bytes::new(),
                modified_at,
            });
        }
        self.nodes.insert(
            path.to_string(),
            NodeData {
                payload,
                modified_at,
            },
        );
    }

    fn exists(&self, path: &str) -> bool {
        path == "/" || self.nodes.contains_key(path)
    }
}

/// Coordination tree held in process memory
///
/// Paths under a prefix registered with [`MemoryStore::set_unavailable`]
/// fail every operation with [`StoreError::Unavailable`].
pub struct MemoryStore {
    tree: RwLock<Tree>,
    unavailable: RwLock<HashSet<String>>,
    ordering: ChildOrdering,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ordering(ChildOrdering::Sequential)
    }

    /// Create a store that advertises the given child naming contract
    pub fn with_ordering(ordering: ChildOrdering) -> Self {
        Self {
            tree: RwLock::new(Tree::default()),
            unavailable: RwLock::new(HashSet::new()),
            ordering,
        }
    }

    /// Create or overwrite a node, creating missing ancestors
    pub async fn put(&self, path: &str, payload: impl Into<Bytes>) -> Result<()> {
        self.put_with_mtime(path, payload, Utc::now()).await
    }

    /// Create or overwrite a node with an explicit modification time
    pub async fn put_with_mtime(
        &self,
        path: &str,
        payload: impl Into<Bytes>,
        modified_at: DateTime<Utc>,
    ) -> Result<()> {
        self.check_available(path).await?;
        self.tree
            .write()
            .await
            .insert(path, payload.into(), modified_at);
        Ok(())
    }

    /// Create a child of `parent` named by the next sequence number
    pub async fn create_sequential(
        &self,
        parent: &str,
        payload: impl Into<Bytes>,
    ) -> Result<String> {
        self.create_sequential_with_mtime(parent, payload, Utc::now())
            .await
    }

    pub async fn create_sequential_with_mtime(
        &self,
        parent: &str,
        payload: impl Into<Bytes>,
        modified_at: DateTime<Utc>,
    ) -> Result<String> {
        self.check_available(parent).await?;
        let mut tree = self.tree.write().await;
        let seq = tree.sequences.entry(parent.to_string()).or_insert(0);
        let path = join_path(parent, &format!("{:010}", *seq));
        *seq += 1;
        tree.insert(&path, payload.into(), modified_at);
        Ok(path)
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.tree.read().await.exists(path)
    }

    /// Fail every operation on `prefix` and its descendants
    pub async fn set_unavailable(&self, prefix: &str) {
        self.unavailable.write().await.insert(prefix.to_string());
    }

    pub async fn clear_unavailable(&self) {
        self.unavailable.write().await.clear();
    }

    async fn check_available(&self, path: &str) -> Result<()> {
        let unavailable = self.unavailable.read().await;
        let blocked = unavailable
            .iter()
            .any(|prefix| path == prefix || path.starts_with(&child_prefix(prefix)));
        if blocked {
            return Err(StoreError::Unavailable(format!(
                "injected failure at {}",
                path
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn get_children(&self, path: &str) -> Result<Vec<String>> {
        self.check_available(path).await?;
        let tree = self.tree.read().await;
        if !tree.exists(path) {
            return Err(StoreError::NotFound(path.to_string()));
        }

        let prefix = child_prefix(path);
        let children = tree
            .nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| &key[prefix.len()..])
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(String::from)
            .collect();
        Ok(children)
    }

    async fn get_node(&self, path: &str) -> Result<NodeData> {
        self.check_available(path).await?;
        self.tree
            .read()
            .await
            .nodes
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn delete_node(&self, path: &str) -> Result<()> {
        self.check_available(path).await?;
        match self.tree.write().await.nodes.remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    fn child_ordering(&self) -> ChildOrdering {
        self.ordering
    }
}

#[async_trait]
impl WildcardExpander for MemoryStore {
    async fn expand(&self, pattern: &str) -> Result<Vec<String>> {
        wildcard::expand(self, pattern).await
    }
}

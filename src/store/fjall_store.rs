//! Fjall-backed coordination tree
//!
//! Partition structure:
//! - `nodes`: {absolute path} -> {modified_at millis: i64 BE}{payload}
//! - `sequences`: {parent path} -> next sequential child id (u64 BE)
//!
//! Sequential children are named with ten zero-padded digits, so the backend
//! honors [`ChildOrdering::Sequential`].

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    ChildOrdering, CoordinationStore, NodeData, Result, StoreError, WildcardExpander, ancestors,
    child_prefix, join_path, wildcard,
};

const MTIME_LEN: usize = 8;

pub struct FjallStore {
    keyspace: Keyspace,
    nodes: PartitionHandle,
    sequences: PartitionHandle,
    sequence_lock: Mutex<()>,
}

impl FjallStore {
    /// Open or create a store at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Fjall coordination store at: {}", path.display());

        let keyspace = Config::new(path).open()?;
        let nodes = keyspace.open_partition("nodes", PartitionCreateOptions::default())?;
        let sequences = keyspace.open_partition("sequences", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            nodes,
            sequences,
            sequence_lock: Mutex::new(()),
        })
    }

    /// Create or overwrite a node, creating missing ancestors
    pub fn put(&self, path: &str, payload: &[u8]) -> Result<()> {
        self.put_with_mtime(path, payload, Utc::now())
    }

    pub fn put_with_mtime(
        &self,
        path: &str,
        payload: &[u8],
        modified_at: DateTime<Utc>,
    ) -> Result<()> {
        for ancestor in ancestors(path) {
            if !self.nodes.contains_key(ancestor.as_bytes())? {
                self.nodes
                    .insert(ancestor.as_bytes(), encode_node(&[], modified_at))?;
            }
        }
        self.nodes
            .insert(path.as_bytes(), encode_node(payload, modified_at))?;
        debug!(path, size = payload.len(), "Stored node");
        Ok(())
    }

    /// Create a child of `parent` named by the next sequence number
    pub async fn create_sequential(&self, parent: &str, payload: &[u8]) -> Result<String> {
        let _guard = self.sequence_lock.lock().await;

        let seq = self
            .sequences
            .get(parent.as_bytes())?
            .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
            .unwrap_or(0);

        let path = join_path(parent, &format!("{:010}", seq));
        self.put(&path, payload)?;
        self.sequences
            .insert(parent.as_bytes(), (seq + 1).to_be_bytes())?;
        Ok(path)
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(path == "/" || self.nodes.contains_key(path.as_bytes())?)
    }
}

fn encode_node(payload: &[u8], modified_at: DateTime<Utc>) -> Vec<u8> {
    let mut value = Vec::with_capacity(MTIME_LEN + payload.len());
    value.extend_from_slice(&modified_at.timestamp_millis().to_be_bytes());
    value.extend_from_slice(payload);
    value
}

fn decode_node(path: &str, value: &[u8]) -> Result<NodeData> {
    let corrupt = || StoreError::Unavailable(format!("corrupt node record at {}", path));
    if value.len() < MTIME_LEN {
        return Err(corrupt());
    }
    let (mtime, payload) = value.split_at(MTIME_LEN);
    let millis = i64::from_be_bytes(mtime.try_into().map_err(|_| corrupt())?);
    let modified_at = DateTime::from_timestamp_millis(millis).ok_or_else(corrupt)?;
    Ok(NodeData {
        payload: Bytes::copy_from_slice(payload),
        modified_at,
    })
}

#[async_trait]
impl CoordinationStore for FjallStore {
    async fn get_children(&self, path: &str) -> Result<Vec<String>> {
        if !self.exists(path)? {
            return Err(StoreError::NotFound(path.to_string()));
        }

        let prefix = child_prefix(path);
        let mut children = Vec::new();
        for item in self.nodes.prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Ok(key) = std::str::from_utf8(&key) else {
                continue;
            };
            let rest = &key[prefix.len()..];
            if !rest.is_empty() && !rest.contains('/') {
                children.push(rest.to_string());
            }
        }
        Ok(children)
    }

    async fn get_node(&self, path: &str) -> Result<NodeData> {
        match self.nodes.get(path.as_bytes())? {
            Some(value) => decode_node(path, &value),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }

    async fn delete_node(&self, path: &str) -> Result<()> {
        if !self.nodes.contains_key(path.as_bytes())? {
            return Err(StoreError::NotFound(path.to_string()));
        }
        self.nodes.remove(path.as_bytes())?;
        debug!(path, "Deleted node");
        Ok(())
    }

    fn child_ordering(&self) -> ChildOrdering {
        ChildOrdering::Sequential
    }
}

#[async_trait]
impl WildcardExpander for FjallStore {
    async fn expand(&self, pattern: &str) -> Result<Vec<String>> {
        wildcard::expand(self, pattern).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FjallStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FjallStore::open(temp_dir.path().join("coordination")).unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get_node() {
        let (store, _temp) = create_test_store();
        let mtime = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        store.put_with_mtime("/vt/action/1", b"{}", mtime).unwrap();

        let node = store.get_node("/vt/action/1").await.unwrap();
        assert_eq!(&node.payload[..], b"{}");
        assert_eq!(node.modified_at, mtime);

        let parent = store.get_node("/vt/action").await.unwrap();
        assert!(parent.payload.is_empty());
    }

    #[tokio::test]
    async fn test_children_and_delete() {
        let (store, _temp) = create_test_store();
        store.put("/vt/action/a", b"").unwrap();
        store.put("/vt/action/b", b"").unwrap();
        store.put("/vt/action/b/nested", b"").unwrap();
        store.put("/vt/actionlog/c", b"").unwrap();

        let children = store.get_children("/vt/action").await.unwrap();
        assert_eq!(children, vec!["a", "b"]);

        store.delete_node("/vt/action/a").await.unwrap();
        assert!(store.get_node("/vt/action/a").await.unwrap_err().is_not_found());
        assert!(store.delete_node("/vt/action/a").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_missing_parent() {
        let (store, _temp) = create_test_store();
        let err = store.get_children("/nothing/here").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_sequential_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("coordination");

        {
            let store = FjallStore::open(&path).unwrap();
            let first = store.create_sequential("/log", b"1").await.unwrap();
            assert_eq!(first, "/log/0000000000");
            store.persist().unwrap();
        }

        let store = FjallStore::open(&path).unwrap();
        let second = store.create_sequential("/log", b"2").await.unwrap();
        assert_eq!(second, "/log/0000000001");
        assert_eq!(store.get_children("/log").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_wildcard_expansion() {
        let (store, _temp) = create_test_store();
        store.put("/zk/nyc/vt/tablets/0000000100/action", b"").unwrap();
        store.put("/zk/sfo/vt/tablets/0000000200/action", b"").unwrap();

        let paths = store.expand("/zk/*/vt/tablets/*/action").await.unwrap();
        assert_eq!(
            paths,
            vec![
                "/zk/nyc/vt/tablets/0000000100/action",
                "/zk/sfo/vt/tablets/0000000200/action",
            ]
        );
    }
}

//! Coordination store capability interface
//!
//! The action log layer talks to the coordination service only through
//! [`CoordinationStore`]. Wildcard expansion is a separate capability
//! ([`WildcardExpander`]) because only some backends provide it; callers that
//! need it receive it explicitly at construction time.
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`] - in-process tree with fault injection, for tests
//! - [`FjallStore`] - persistent local tree on the Fjall embedded LSM store

mod fjall_store;
mod memory;
pub mod wildcard;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use fjall_store::FjallStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<fjall::Error> for StoreError {
    fn from(value: fjall::Error) -> Self {
        StoreError::Unavailable(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Payload and store-assigned modification time of a single node
#[derive(Debug, Clone)]
pub struct NodeData {
    pub payload: Bytes,
    pub modified_at: DateTime<Utc>,
}

/// How a backend names the children it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOrdering {
    /// Child names are monotonically increasing ids assigned at creation,
    /// so lexical order equals creation order.
    Sequential,
    /// No ordering guarantee; callers must sort by modification time.
    Unordered,
}

/// Operations the action log layer needs from the coordination service
///
/// Timeouts and retries belong to the implementation; callers never retry.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// List the names (not full paths) of the direct children of `path`
    async fn get_children(&self, path: &str) -> Result<Vec<String>>;

    /// Fetch a node's payload and modification time
    async fn get_node(&self, path: &str) -> Result<NodeData>;

    /// Delete a single node
    async fn delete_node(&self, path: &str) -> Result<()>;

    /// Naming contract for children created by this backend
    fn child_ordering(&self) -> ChildOrdering {
        ChildOrdering::Unordered
    }
}

/// Optional capability: expand a wildcard pattern into concrete paths
#[async_trait]
pub trait WildcardExpander: Send + Sync {
    async fn expand(&self, pattern: &str) -> Result<Vec<String>>;
}

/// Join a child name onto a parent path
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Proper ancestors of `path`, outermost first ("/a/b/c" -> ["/a", "/a/b"])
pub(crate) fn ancestors(path: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return result;
    }
    for segment in &segments[..segments.len() - 1] {
        current.push('/');
        current.push_str(segment);
        result.push(current.clone());
    }
    result
}

/// Key prefix under which the direct children of `path` live
pub(crate) fn child_prefix(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

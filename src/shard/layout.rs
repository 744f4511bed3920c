use std::fmt;
use std::str::FromStr;

use crate::error::{ActionLogError, Result};
use crate::store::join_path;

const CELL_PLACEHOLDER: &str = "{cell}";

/// Identity of one replica of a shard: its cell and numeric uid
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplicaAlias {
    pub cell: String,
    pub uid: u32,
}

impl ReplicaAlias {
    pub fn new(cell: impl Into<String>, uid: u32) -> Self {
        Self {
            cell: cell.into(),
            uid,
        }
    }
}

/// Text form is `cell-0000000100`
impl fmt::Display for ReplicaAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:010}", self.cell, self.uid)
    }
}

impl FromStr for ReplicaAlias {
    type Err = ActionLogError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ActionLogError::Configuration(format!("invalid replica alias: {}", s));
        let (cell, uid) = s.rsplit_once('-').ok_or_else(invalid)?;
        if cell.is_empty() {
            return Err(invalid());
        }
        let uid = uid.parse().map_err(|_| invalid())?;
        Ok(Self::new(cell, uid))
    }
}

/// Where shard and replica records live in the coordination tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyLayout {
    global_root: String,
    cell_root: String,
}

impl TopologyLayout {
    /// `cell_root` must contain the `{cell}` placeholder
    pub fn new(global_root: impl Into<String>, cell_root: impl Into<String>) -> Self {
        Self {
            global_root: global_root.into().trim_end_matches('/').to_string(),
            cell_root: cell_root.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn shard_path(&self, keyspace: &str, shard: &str) -> String {
        format!("{}/keyspaces/{}/shards/{}", self.global_root, keyspace, shard)
    }

    pub fn shard_action_path(&self, keyspace: &str, shard: &str) -> String {
        join_path(&self.shard_path(keyspace, shard), "action")
    }

    /// Directory whose children name the replicas serving a shard
    pub fn shard_replicas_path(&self, keyspace: &str, shard: &str) -> String {
        join_path(&self.shard_path(keyspace, shard), "tablets")
    }

    pub fn replica_path(&self, alias: &ReplicaAlias) -> String {
        format!(
            "{}/tablets/{:010}",
            self.cell_root.replace(CELL_PLACEHOLDER, &alias.cell),
            alias.uid
        )
    }

    pub fn replica_action_path(&self, alias: &ReplicaAlias) -> String {
        join_path(&self.replica_path(alias), "action")
    }

    /// Accept either `keyspace/shard` or a full shard path under the global root
    pub fn parse_shard_param(&self, param: &str) -> Result<(String, String)> {
        let invalid = || {
            ActionLogError::Configuration(format!(
                "expected <keyspace/shard> or a shard path under {}, got {:?}",
                self.global_root, param
            ))
        };

        let param = param.trim_end_matches('/');
        if param.starts_with('/') {
            let rest = param
                .strip_prefix(&self.global_root)
                .and_then(|rest| rest.strip_prefix("/keyspaces/"))
                .ok_or_else(invalid)?;
            return match rest.split('/').collect::<Vec<_>>().as_slice() {
                [keyspace, "shards", shard] if !keyspace.is_empty() && !shard.is_empty() => {
                    Ok((keyspace.to_string(), shard.to_string()))
                }
                _ => Err(invalid()),
            };
        }

        match param.split_once('/') {
            Some((keyspace, shard))
                if !keyspace.is_empty() && !shard.is_empty() && !shard.contains('/') =>
            {
                Ok((keyspace.to_string(), shard.to_string()))
            }
            _ => Err(invalid()),
        }
    }
}

impl Default for TopologyLayout {
    fn default() -> Self {
        Self::new("/zk/global/vt", "/zk/{cell}/vt")
    }
}

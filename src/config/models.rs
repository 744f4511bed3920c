use crate::humanize::HumanDuration;
use crate::shard::TopologyLayout;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
}

impl Config {
    pub fn layout(&self) -> TopologyLayout {
        TopologyLayout::new(&self.topology.global_root, &self.topology.cell_root)
    }
}

/// Coordination store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory of the Fjall keyspace holding the coordination tree
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Expose the store's wildcard expansion to path resolution
    #[serde(default = "default_wildcards")]
    pub wildcards: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            wildcards: default_wildcards(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/coordination")
}

fn default_wildcards() -> bool {
    true
}

/// Layout of shard and replica records in the coordination tree
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopologyConfig {
    #[serde(default = "default_global_root")]
    pub global_root: String,
    /// Per-cell root; `{cell}` is replaced with the replica's cell name
    #[serde(default = "default_cell_root")]
    pub cell_root: String,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            global_root: default_global_root(),
            cell_root: default_cell_root(),
        }
    }
}

fn default_global_root() -> String {
    "/zk/global/vt".to_string()
}

fn default_cell_root() -> String {
    "/zk/{cell}/vt".to_string()
}

/// Defaults for the action commands
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionsConfig {
    /// How long since the last modification before an action is stale
    #[serde(default = "default_max_staleness")]
    pub max_staleness: HumanDuration,
    /// Action log entries kept per path by pruning
    #[serde(default = "default_keep_count")]
    pub keep_count: usize,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            max_staleness: default_max_staleness(),
            keep_count: default_keep_count(),
        }
    }
}

fn default_max_staleness() -> HumanDuration {
    HumanDuration::from_secs(5 * 60)
}

fn default_keep_count() -> usize {
    10
}

use actionlog::humanize::HumanDuration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "actionlog")]
#[command(about = "Inspect and garbage-collect coordination store action records", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $ACTIONLOG_CONFIG or config/actionlog.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove every finished action under the given action paths
    PurgeActions(PurgeArgs),
    /// List queued actions that are considered stale
    StaleActions(StaleArgs),
    /// Remove older action log entries until at most keep-count are left
    PruneActionLogs(PruneArgs),
    /// List all actions of a shard and of the replicas serving it
    ListShardActions(ListShardArgs),
}

#[derive(clap::Args, Debug)]
pub struct PurgeArgs {
    /// Action paths or wildcard patterns, e.g. /zk/global/vt/keyspaces/*/shards/*/action
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct StaleArgs {
    /// How long since the last modification before an action is considered stale
    #[arg(long)]
    pub max_staleness: Option<HumanDuration>,

    /// Purge the paths where stale actions were found
    #[arg(long)]
    pub purge: bool,

    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct PruneArgs {
    /// Number of newest entries to keep per action log
    #[arg(long)]
    pub keep_count: Option<usize>,

    /// Action log paths or wildcard patterns
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListShardArgs {
    /// <keyspace/shard> or a shard path under the global root
    pub shard: String,
}

//! Shard-wide action listing
//!
//! A shard keeps its own action directory in the global tree, and every
//! replica serving the shard keeps another in its cell. The
//! [`ShardActionAggregator`] reads all of them concurrently and merges the
//! results into one listing ordered by path.

mod aggregator;
mod discovery;
mod layout;

pub use aggregator::ShardActionAggregator;
pub use discovery::{ReplicaDiscovery, StoreReplicaDiscovery};
pub use layout::{ReplicaAlias, TopologyLayout};

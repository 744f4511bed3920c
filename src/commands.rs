use std::sync::Arc;

use actionlog::config::Config;
use actionlog::manager::ActionLogManager;
use actionlog::observability::ActionMetrics;
use actionlog::resolver::PathResolver;
use actionlog::shard::{ShardActionAggregator, StoreReplicaDiscovery};
use actionlog::store::{CoordinationStore, FjallStore, WildcardExpander};
use tracing::{debug, info};

use crate::cli::{Cli, Commands};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(cli: Cli) -> Result<(), AnyError> {
    let config = match cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    let fjall = Arc::new(FjallStore::open(&config.store.path)?);
    let store: Arc<dyn CoordinationStore> = fjall.clone();
    let expander: Option<Arc<dyn WildcardExpander>> = if config.store.wildcards {
        Some(fjall.clone() as Arc<dyn WildcardExpander>)
    } else {
        None
    };
    let resolver = PathResolver::new(expander);
    let metrics = Arc::new(ActionMetrics::new());
    let manager = ActionLogManager::with_metrics(Arc::clone(&store), Arc::clone(&metrics));

    let outcome = match cli.command {
        Commands::PurgeActions(args) => {
            let paths = resolver.resolve(&args.paths).await?;
            let report = manager.purge_actions(&paths).await;
            let purged: usize = report.results.values().sum();
            info!(paths = paths.len(), purged, "Purged actions");
            report.check()
        }
        Commands::StaleActions(args) => {
            let max_staleness = args
                .max_staleness
                .unwrap_or(config.actions.max_staleness)
                .as_duration();
            let paths = resolver.resolve(&args.paths).await?;
            let report = manager
                .stale_actions(&paths, max_staleness, args.purge)
                .await;
            for (_, found) in report.outputs() {
                for action in &found.actions {
                    println!("{}", action);
                }
            }
            report.check()
        }
        Commands::PruneActionLogs(args) => {
            let keep_count = args.keep_count.unwrap_or(config.actions.keep_count);
            let paths = resolver.resolve(&args.paths).await?;
            let report = manager.prune_action_logs(&paths, keep_count).await;
            for (path, pruned) in &report.results {
                debug!(path = %path, pruned, "Pruned action log");
            }
            report.check()
        }
        Commands::ListShardActions(args) => {
            let layout = config.layout();
            let (keyspace, shard) = layout.parse_shard_param(&args.shard)?;
            let discovery = Arc::new(StoreReplicaDiscovery::new(
                Arc::clone(&store),
                layout.clone(),
            ));
            let aggregator = ShardActionAggregator::new(Arc::clone(&store), discovery, layout);
            for action in aggregator.list_shard_actions(&keyspace, &shard).await? {
                println!("{}", action);
            }
            Ok(())
        }
    };

    fjall.persist()?;
    debug!(metrics = ?metrics.snapshot(), "Command finished");
    outcome?;
    Ok(())
}

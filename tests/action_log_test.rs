use std::sync::Arc;
use std::time::Duration;

use actionlog::action::{ActionRecord, ActionState};
use actionlog::manager::ActionLogManager;
use actionlog::resolver::PathResolver;
use actionlog::store::{
    ChildOrdering, CoordinationStore, FjallStore, MemoryStore, NodeData, StoreError,
    WildcardExpander,
};
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use tempfile::TempDir;

fn record(state: ActionState) -> Vec<u8> {
    ActionRecord::new("Scrap", state)
        .with_target("/zk/nyc/vt/tablets/0000000100")
        .encode()
}

fn paths(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_empty_path_set_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    let manager = ActionLogManager::new(store);

    assert!(manager.purge_actions(&[]).await.check().is_ok());
    assert!(
        manager
            .stale_actions(&[], Duration::from_secs(300), true)
            .await
            .check()
            .is_ok()
    );
    assert!(manager.prune_action_logs(&[], 10).await.check().is_ok());
    assert_eq!(manager.metrics().snapshot().paths_processed, 0);
}

#[tokio::test]
async fn test_purge_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    store.create_sequential("/a", record(ActionState::Completed)).await.unwrap();
    store.create_sequential("/a", record(ActionState::Pending)).await.unwrap();

    let manager = ActionLogManager::new(store.clone());
    let first = manager.purge_actions(&paths(&["/a"])).await;
    let second = manager.purge_actions(&paths(&["/a"])).await;

    assert_eq!(first.results["/a"], 1);
    assert_eq!(second.results["/a"], 0);
    assert_eq!(store.get_children("/a").await.unwrap(), vec!["0000000001"]);
}

#[tokio::test]
async fn test_missing_path_is_not_a_failure() {
    let store = Arc::new(MemoryStore::new());
    store.create_sequential("/a", record(ActionState::Completed)).await.unwrap();
    store.create_sequential("/b", record(ActionState::Failed)).await.unwrap();
    store.create_sequential("/b", record(ActionState::Pending)).await.unwrap();

    let manager = ActionLogManager::new(store.clone());
    let report = manager.purge_actions(&paths(&["/a", "/b", "/missing"])).await;

    report.check().unwrap();
    assert_eq!(report.results["/a"], 1);
    assert_eq!(report.results["/b"], 1);
    assert_eq!(report.results["/missing"], 0);
    assert!(store.get_children("/a").await.unwrap().is_empty());
    assert_eq!(store.get_children("/b").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_purge_failures_are_isolated_per_path() {
    let store = Arc::new(MemoryStore::new());
    let all = ["/p0", "/p1", "/p2", "/p3", "/p4"];
    for path in all {
        store.create_sequential(path, record(ActionState::Completed)).await.unwrap();
    }
    store.set_unavailable("/p1").await;
    store.set_unavailable("/p3").await;

    let manager = ActionLogManager::new(store.clone());
    let report = manager.purge_actions(&paths(&all)).await;

    assert_eq!(report.failed, 2);
    assert_eq!(report.total, 5);
    assert_eq!(
        report.check().unwrap_err().to_string(),
        "2 of 5 paths failed, check the log for details"
    );
    assert!(!report.results.contains_key("/p1"));
    assert!(!report.results.contains_key("/p3"));

    store.clear_unavailable().await;
    for path in ["/p0", "/p2", "/p4"] {
        assert!(store.get_children(path).await.unwrap().is_empty(), "{}", path);
    }
    for path in ["/p1", "/p3"] {
        assert_eq!(store.get_children(path).await.unwrap().len(), 1, "{}", path);
    }
    assert_eq!(manager.metrics().snapshot().paths_failed, 2);
}

#[tokio::test]
async fn test_stale_failures_are_isolated_per_path() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let old = now - TimeDelta::hours(1);
    let all = ["/s0", "/s1", "/s2", "/s3"];
    for path in all {
        store
            .create_sequential_with_mtime(path, record(ActionState::StaleCandidate), old)
            .await
            .unwrap();
    }
    store.set_unavailable("/s2").await;

    let manager = ActionLogManager::new(store.clone());
    let report = manager
        .stale_actions_at(&paths(&all), now, Duration::from_secs(60), true)
        .await;

    assert_eq!(report.failed, 1);
    assert_eq!(
        report.check().unwrap_err().to_string(),
        "1 of 4 paths failed, check the log for details"
    );
    assert!(!report.results.contains_key("/s2"));
    for path in ["/s0", "/s1", "/s3"] {
        assert_eq!(report.results[path].actions.len(), 1, "{}", path);
        assert_eq!(report.results[path].purged, 1, "{}", path);
    }

    store.clear_unavailable().await;
    assert_eq!(store.get_children("/s2").await.unwrap().len(), 1);
    for path in ["/s0", "/s1", "/s3"] {
        assert!(store.get_children(path).await.unwrap().is_empty(), "{}", path);
    }
}

#[tokio::test]
async fn test_prune_failures_are_isolated_per_path() {
    let store = Arc::new(MemoryStore::new());
    let all = ["/l0", "/l1", "/l2", "/l3", "/l4", "/l5"];
    for path in all {
        for _ in 0..4 {
            store.create_sequential(path, record(ActionState::Completed)).await.unwrap();
        }
    }
    store.set_unavailable("/l1").await;
    store.set_unavailable("/l4").await;

    let manager = ActionLogManager::new(store.clone());
    let report = manager.prune_action_logs(&paths(&all), 1).await;

    assert_eq!(report.failed, 2);
    assert_eq!(report.total, 6);
    assert_eq!(
        report.check().unwrap_err().to_string(),
        "2 of 6 paths failed, check the log for details"
    );
    assert_eq!(report.results.len(), 4);

    store.clear_unavailable().await;
    for path in ["/l0", "/l2", "/l3", "/l5"] {
        assert_eq!(report.results[path], 3, "{}", path);
        assert_eq!(store.get_children(path).await.unwrap(), vec!["0000000003"], "{}", path);
    }
    for path in ["/l1", "/l4"] {
        assert_eq!(store.get_children(path).await.unwrap().len(), 4, "{}", path);
    }
}

/// Reads succeed but every delete is refused
struct ReadOnlyStore {
    inner: MemoryStore,
}

#[async_trait]
impl CoordinationStore for ReadOnlyStore {
    async fn get_children(&self, path: &str) -> std::result::Result<Vec<String>, StoreError> {
        self.inner.get_children(path).await
    }

    async fn get_node(&self, path: &str) -> std::result::Result<NodeData, StoreError> {
        self.inner.get_node(path).await
    }

    async fn delete_node(&self, path: &str) -> std::result::Result<(), StoreError> {
        Err(StoreError::Unavailable(format!("read-only replica at {}", path)))
    }

    fn child_ordering(&self) -> ChildOrdering {
        ChildOrdering::Sequential
    }
}

#[tokio::test]
async fn test_failed_stale_purge_still_reports_stale_actions() {
    let now = Utc::now();
    let inner = MemoryStore::new();
    let stale = inner
        .create_sequential_with_mtime(
            "/a",
            record(ActionState::StaleCandidate),
            now - TimeDelta::hours(1),
        )
        .await
        .unwrap();

    let manager = ActionLogManager::new(Arc::new(ReadOnlyStore { inner }));
    let report = manager
        .stale_actions_at(&paths(&["/a"]), now, Duration::from_secs(60), true)
        .await;

    assert_eq!(report.failed, 1);
    assert!(report.check().is_err());
    assert!(!report.results.contains_key("/a"));

    let found = &report.partial["/a"];
    assert_eq!(found.actions.len(), 1);
    assert_eq!(found.actions[0].path, stale);
    assert_eq!(found.purged, 0);

    let listed: Vec<&str> = report.outputs().map(|(path, _)| path.as_str()).collect();
    assert_eq!(listed, vec!["/a"]);

    let metrics = manager.metrics().snapshot();
    assert_eq!(metrics.stale_found, 1);
    assert_eq!(metrics.actions_purged, 0);
    assert_eq!(metrics.paths_failed, 1);
}

#[tokio::test]
async fn test_prune_keeps_lexically_greatest_entries() {
    let store = Arc::new(MemoryStore::new());
    for _ in 0..12 {
        store.create_sequential("/log", record(ActionState::Completed)).await.unwrap();
    }
    store.create_sequential("/short", record(ActionState::Completed)).await.unwrap();

    let manager = ActionLogManager::new(store.clone());
    let report = manager.prune_action_logs(&paths(&["/log", "/short"]), 10).await;

    report.check().unwrap();
    assert_eq!(report.results["/log"], 2);
    assert_eq!(report.results["/short"], 0);

    let remaining = store.get_children("/log").await.unwrap();
    let expected: Vec<String> = (2..12).map(|n| format!("{:010}", n)).collect();
    assert_eq!(remaining, expected);
    assert_eq!(store.get_children("/short").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_prune_with_zero_keep_count_empties_the_log() {
    let store = Arc::new(MemoryStore::new());
    for _ in 0..3 {
        store.create_sequential("/log", "entry").await.unwrap();
    }

    let manager = ActionLogManager::new(store.clone());
    let report = manager.prune_action_logs(&paths(&["/log"]), 0).await;

    assert_eq!(report.results["/log"], 3);
    assert!(store.get_children("/log").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_scan_reports_only_old_unfinished_actions() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let old = now - TimeDelta::minutes(30);

    let stale = store
        .create_sequential_with_mtime("/a", record(ActionState::Pending), old)
        .await
        .unwrap();
    // finished actions are never stale, however old
    store
        .create_sequential_with_mtime("/a", record(ActionState::Completed), old)
        .await
        .unwrap();
    store
        .create_sequential_with_mtime("/a", record(ActionState::Pending), now)
        .await
        .unwrap();
    // clock skew: a modification time in the future is not stale
    store
        .create_sequential_with_mtime(
            "/a",
            record(ActionState::Pending),
            now + TimeDelta::minutes(30),
        )
        .await
        .unwrap();

    let manager = ActionLogManager::new(store.clone());
    let report = manager
        .stale_actions_at(&paths(&["/a"]), now, Duration::from_secs(300), false)
        .await;

    let results = report.into_result().unwrap();
    let found = &results["/a"];
    assert_eq!(found.actions.len(), 1);
    assert_eq!(found.actions[0].path, stale);
    assert_eq!(store.get_children("/a").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_resolver_feeds_wildcard_matches_to_manager() {
    let store = Arc::new(MemoryStore::new());
    for shard in ["-80", "80-"] {
        let action = format!("/zk/global/vt/keyspaces/ks/shards/{}/action", shard);
        store.create_sequential(&action, record(ActionState::Completed)).await.unwrap();
    }
    store.put("/zk/global/vt/keyspaces/ks/shards/0/other", "").await.unwrap();

    let expander: Arc<dyn WildcardExpander> = store.clone();
    let resolver = PathResolver::new(Some(expander));
    let resolved = resolver
        .resolve(&["/zk/global/vt/keyspaces/*/shards/*/action"])
        .await
        .unwrap();
    assert_eq!(
        resolved,
        vec![
            "/zk/global/vt/keyspaces/ks/shards/-80/action",
            "/zk/global/vt/keyspaces/ks/shards/80-/action",
        ]
    );

    let manager = ActionLogManager::new(store.clone());
    let report = manager.purge_actions(&resolved).await;
    assert_eq!(report.results.values().sum::<usize>(), 2);
}

#[tokio::test]
async fn test_fjall_backend_purges_and_prunes_durably() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("coordination");

    {
        let store = Arc::new(FjallStore::open(&db_path).unwrap());
        for _ in 0..4 {
            store
                .create_sequential("/log", &record(ActionState::Completed))
                .await
                .unwrap();
        }
        store
            .create_sequential("/queue", &record(ActionState::Failed))
            .await
            .unwrap();
        store
            .create_sequential("/queue", &record(ActionState::Pending))
            .await
            .unwrap();

        let manager = ActionLogManager::new(store.clone());
        manager.prune_action_logs(&paths(&["/log"]), 1).await.check().unwrap();
        manager.purge_actions(&paths(&["/queue"])).await.check().unwrap();
        store.persist().unwrap();
    }

    let store = FjallStore::open(&db_path).unwrap();
    assert_eq!(store.get_children("/log").await.unwrap(), vec!["0000000003"]);
    assert_eq!(store.get_children("/queue").await.unwrap(), vec!["0000000001"]);
}

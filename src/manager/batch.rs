use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::{ActionLogError, Result};
use crate::observability::ActionMetrics;

/// Aggregated outcome of a batch operation over many paths
///
/// `results` holds one entry per path that succeeded. Failed paths are
/// counted and logged. A path that failed after producing output keeps that
/// output in `partial`.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub results: BTreeMap<String, T>,
    pub partial: BTreeMap<String, T>,
    pub failed: usize,
    pub total: usize,
}

impl<T> BatchReport<T> {
    fn new(total: usize) -> Self {
        Self {
            results: BTreeMap::new(),
            partial: BTreeMap::new(),
            failed: 0,
            total,
        }
    }

    /// Output of every path, finished or not, in path order
    pub fn outputs(&self) -> impl Iterator<Item = (&String, &T)> {
        let mut all: Vec<_> = self.results.iter().chain(self.partial.iter()).collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all.into_iter()
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Fail with "N of M paths failed" if any path failed
    pub fn check(&self) -> Result<()> {
        if self.failed > 0 {
            return Err(ActionLogError::BatchFailed {
                failed: self.failed,
                total: self.total,
            });
        }
        Ok(())
    }

    pub fn into_result(self) -> Result<BTreeMap<String, T>> {
        self.check()?;
        Ok(self.results)
    }
}

/// Error from one path's worker, with whatever it produced before failing
#[derive(Debug)]
pub(crate) struct PathFailure<T> {
    pub partial: Option<T>,
    pub error: ActionLogError,
}

impl<T> PathFailure<T> {
    pub fn with_partial(partial: T, error: ActionLogError) -> Self {
        Self {
            partial: Some(partial),
            error,
        }
    }
}

impl<T> From<ActionLogError> for PathFailure<T> {
    fn from(error: ActionLogError) -> Self {
        Self {
            partial: None,
            error,
        }
    }
}

/// Run `worker` once per path on its own task and wait for all of them
///
/// There is no concurrency ceiling and no early cancellation: every worker
/// runs until it finishes or fails.
pub(crate) async fn fan_out<T, F, Fut>(
    operation: &'static str,
    paths: &[String],
    metrics: &Arc<ActionMetrics>,
    worker: F,
) -> BatchReport<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = std::result::Result<T, PathFailure<T>>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for path in paths {
        let work = worker(path.clone());
        let path = path.clone();
        tasks.spawn(async move { (path, work.await) });
    }

    let mut report = BatchReport::new(paths.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, Ok(value))) => {
                debug!(operation, path = %path, "Path processed");
                metrics.path_processed();
                report.results.insert(path, value);
            }
            Ok((path, Err(failure))) => {
                error!(operation, path = %path, error = %failure.error, "Path failed");
                metrics.path_failed();
                report.failed += 1;
                if let Some(partial) = failure.partial {
                    report.partial.insert(path, partial);
                }
            }
            Err(err) => {
                error!(operation, error = %err, "Worker task aborted");
                metrics.path_failed();
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_counts_failures() {
        let metrics = Arc::new(ActionMetrics::new());
        let paths: Vec<String> = ["/a", "/b", "/c"].iter().map(|s| s.to_string()).collect();

        let report = fan_out("test", &paths, &metrics, |path| async move {
            if path == "/b" {
                Err(ActionLogError::StoreUnavailable {
                    path,
                    reason: "down".to_string(),
                }
                .into())
            } else {
                Ok(path.len())
            }
        })
        .await;

        assert_eq!(report.total, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.results.keys().collect::<Vec<_>>(), vec!["/a", "/c"]);
        assert!(!report.is_success());
        assert_eq!(
            report.check().unwrap_err().to_string(),
            "1 of 3 paths failed, check the log for details"
        );
        assert_eq!(metrics.snapshot().paths_failed, 1);
        assert_eq!(metrics.snapshot().paths_processed, 2);
    }

    #[tokio::test]
    async fn test_fan_out_empty_is_success() {
        let metrics = Arc::new(ActionMetrics::new());
        let report: BatchReport<()> =
            fan_out("test", &[], &metrics, |_| async { Ok(()) }).await;

        assert_eq!(report.total, 0);
        assert!(report.is_success());
        assert!(report.into_result().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_worker_counts_as_failure() {
        let metrics = Arc::new(ActionMetrics::new());
        let paths = vec!["/boom".to_string(), "/ok".to_string()];

        let report = fan_out("test", &paths, &metrics, |path| async move {
            if path == "/boom" {
                panic!("worker exploded");
            }
            Ok(())
        })
        .await;

        assert_eq!(report.failed, 1);
        assert!(report.results.contains_key("/ok"));
    }

    #[tokio::test]
    async fn test_partial_output_kept_on_failure() {
        let metrics = Arc::new(ActionMetrics::new());
        let paths = vec!["/a".to_string(), "/b".to_string()];

        let report = fan_out("test", &paths, &metrics, |path| async move {
            if path == "/a" {
                return Err(PathFailure::with_partial(
                    7,
                    ActionLogError::NotFound(path),
                ));
            }
            Ok(1)
        })
        .await;

        assert_eq!(report.failed, 1);
        assert!(report.check().is_err());
        assert_eq!(report.partial["/a"], 7);
        assert!(!report.results.contains_key("/a"));
        let outputs: Vec<_> = report.outputs().map(|(p, v)| (p.as_str(), *v)).collect();
        assert_eq!(outputs, vec![("/a", 7), ("/b", 1)]);
    }
}

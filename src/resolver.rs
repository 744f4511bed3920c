//! Operator path pattern resolution
//!
//! Patterns are expanded one at a time through the store's wildcard
//! capability when the backend provides it. Without that capability every
//! pattern is used as a literal path.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ActionLogError, Result};
use crate::store::{StoreError, WildcardExpander, wildcard};

#[derive(Clone, Default)]
pub struct PathResolver {
    expander: Option<Arc<dyn WildcardExpander>>,
}

impl PathResolver {
    pub fn new(expander: Option<Arc<dyn WildcardExpander>>) -> Self {
        Self { expander }
    }

    /// A resolver that never expands wildcards
    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn supports_wildcards(&self) -> bool {
        self.expander.is_some()
    }

    /// Expand every pattern into concrete paths
    ///
    /// Output keeps the order of the input patterns with duplicates removed.
    /// A pattern that matches nothing contributes nothing.
    pub async fn resolve<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let expanded = match &self.expander {
                Some(expander) => match expander.expand(pattern).await {
                    Ok(paths) => paths,
                    Err(StoreError::NotFound(_)) => Vec::new(),
                    Err(e) => return Err(ActionLogError::from_store(pattern, e)),
                },
                None => {
                    if wildcard::has_wildcard(pattern) {
                        warn!(
                            pattern,
                            "Store cannot expand wildcards, using pattern as a literal path"
                        );
                    }
                    vec![pattern.to_string()]
                }
            };

            debug!(pattern, matches = expanded.len(), "Resolved path pattern");
            for path in expanded {
                if seen.insert(path.clone()) {
                    resolved.push(path);
                }
            }
        }

        Ok(resolved)
    }
}

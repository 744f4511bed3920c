//! Segment-wise wildcard expansion over any [`CoordinationStore`]
//!
//! A pattern is split on `/`. Segments containing `*` (any run of characters)
//! or `?` (exactly one character) are matched against the children of every
//! prefix built so far. Literal segments are appended without a lookup, and
//! candidates that do not exist are dropped at the end.

use super::{CoordinationStore, Result, StoreError, join_path};

/// True if the pattern has at least one wildcard metacharacter
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Match a single path segment against a glob segment
pub fn segment_matches(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();

    let (mut pi, mut ni) = (0, 0);
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ni;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ni = mark;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Expand `pattern` into the existing paths it matches, sorted
///
/// A pattern without wildcards expands to itself whether or not it exists.
/// A wildcard segment under a missing parent contributes nothing.
pub async fn expand<S>(store: &S, pattern: &str) -> Result<Vec<String>>
where
    S: CoordinationStore + ?Sized,
{
    if !has_wildcard(pattern) {
        return Ok(vec![pattern.to_string()]);
    }

    let mut prefixes = vec!["/".to_string()];
    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for prefix in &prefixes {
            if !has_wildcard(segment) {
                next.push(join_path(prefix, segment));
                continue;
            }
            let children = match store.get_children(prefix).await {
                Ok(children) => children,
                Err(StoreError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            next.extend(
                children
                    .iter()
                    .filter(|child| segment_matches(segment, child))
                    .map(|child| join_path(prefix, child)),
            );
        }
        if next.is_empty() {
            tracing::debug!(pattern, segment, "Wildcard matched nothing");
            return Ok(next);
        }
        prefixes = next;
    }

    let mut matched = Vec::with_capacity(prefixes.len());
    for candidate in prefixes {
        match store.get_node(&candidate).await {
            Ok(_) => matched.push(candidate),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }
    matched.sort();
    Ok(matched)
}

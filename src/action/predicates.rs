//! Pure predicates over decoded action nodes

use chrono::{DateTime, Utc};
use std::time::Duration;

use super::node::{ActionNode, ActionState};

/// True if the node records an action that can be deleted safely
///
/// Pending and unrecognized states are never purged.
pub fn purgeable(node: &ActionNode) -> bool {
    matches!(
        node.state(),
        ActionState::Completed | ActionState::Failed | ActionState::StaleCandidate
    )
}

/// True if a non-terminal node has gone unmodified for longer than `max_staleness`
///
/// A modification time later than `now` is never stale.
pub fn stale(node: &ActionNode, now: DateTime<Utc>, max_staleness: Duration) -> bool {
    if node.state().is_terminal() {
        return false;
    }
    match (now - node.modified_at).to_std() {
        Ok(age) => age > max_staleness,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionRecord;
    use chrono::TimeDelta;

    fn node(state: ActionState, modified_at: DateTime<Utc>) -> ActionNode {
        ActionNode {
            path: "/vt/action/0000000001".to_string(),
            record: ActionRecord::new("Snapshot", state),
            modified_at,
        }
    }

    #[test]
    fn test_purgeable_states() {
        let now = Utc::now();
        assert!(purgeable(&node(ActionState::Completed, now)));
        assert!(purgeable(&node(ActionState::Failed, now)));
        assert!(purgeable(&node(ActionState::StaleCandidate, now)));
        assert!(!purgeable(&node(ActionState::Pending, now)));
        assert!(!purgeable(&node(ActionState::Unknown, now)));
    }

    #[test]
    fn test_stale_boundary() {
        let now = Utc::now();
        let max = Duration::from_secs(300);

        let exactly = node(ActionState::Pending, now - TimeDelta::seconds(300));
        assert!(!stale(&exactly, now, max));

        let older = node(ActionState::Pending, now - TimeDelta::seconds(301));
        assert!(stale(&older, now, max));

        let fresh = node(ActionState::Pending, now - TimeDelta::seconds(10));
        assert!(!stale(&fresh, now, max));
    }

    #[test]
    fn test_terminal_nodes_never_stale() {
        let now = Utc::now();
        let old = now - TimeDelta::days(30);
        let max = Duration::from_secs(60);

        assert!(!stale(&node(ActionState::Completed, old), now, max));
        assert!(!stale(&node(ActionState::Failed, old), now, max));
        assert!(stale(&node(ActionState::StaleCandidate, old), now, max));
        assert!(stale(&node(ActionState::Unknown, old), now, max));
    }

    #[test]
    fn test_future_mtime_not_stale() {
        let now = Utc::now();
        let future = node(ActionState::Pending, now + TimeDelta::minutes(5));
        assert!(!stale(&future, now, Duration::ZERO));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::store::NodeData;

#[derive(Debug, Error)]
#[error("malformed action payload at {path}: {source}")]
pub struct DecodeError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

/// Declared state of an administrative action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionState {
    Pending,
    Completed,
    Failed,
    StaleCandidate,
    /// A state written by a newer orchestrator than this reader knows
    #[serde(other)]
    Unknown,
}

impl ActionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionState::Completed | ActionState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionState::Pending => "pending",
            ActionState::Completed => "completed",
            ActionState::Failed => "failed",
            ActionState::StaleCandidate => "stale-candidate",
            ActionState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted payload of an action node, as written by the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub kind: String,
    pub state: ActionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionRecord {
    pub fn new(kind: impl Into<String>, state: ActionState) -> Self {
        Self {
            kind: kind.into(),
            state,
            target: None,
            created_at: None,
            args: BTreeMap::new(),
            guid: None,
            error: None,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Serialize to the JSON payload layout
    pub fn encode(&self) -> Vec<u8> {
        // Plain JSON values only; to_vec has no failure path here
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// A decoded action node: its path, record, and store modification time
#[derive(Debug, Clone, PartialEq)]
pub struct ActionNode {
    pub path: String,
    pub record: ActionRecord,
    pub modified_at: DateTime<Utc>,
}

impl ActionNode {
    /// Decode a node fetched from the coordination store
    pub fn decode(path: &str, data: &NodeData) -> Result<Self, DecodeError> {
        let record = decode_record(&data.payload, path)?;
        Ok(Self {
            path: path.to_string(),
            record,
            modified_at: data.modified_at,
        })
    }

    pub fn kind(&self) -> &str {
        &self.record.kind
    }

    pub fn state(&self) -> ActionState {
        self.record.state
    }
}

/// Decode a raw payload into an [`ActionRecord`]
pub fn decode_record(payload: &[u8], path: &str) -> Result<ActionRecord, DecodeError> {
    serde_json::from_slice(payload).map_err(|source| DecodeError {
        path: path.to_string(),
        source,
    })
}

impl fmt::Display for ActionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<20} {:<15} {} {}",
            self.record.kind,
            self.record.state.as_str(),
            self.path,
            self.record.target.as_deref().unwrap_or("-"),
        )?;
        if let Some(error) = &self.record.error {
            write!(f, " error={:?}", error)?;
        }
        Ok(())
    }
}

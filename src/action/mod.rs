//! Action node model and codec
//!
//! Action nodes are JSON records written by the orchestration system, one per
//! administrative action, under action directories in the coordination store.
//! This module decodes them into [`ActionNode`] and provides the pure
//! [`purgeable`] and [`stale`] predicates used by the action log manager.
//!
//! ```rust,ignore
//! use actionlog::action::{ActionNode, purgeable};
//!
//! let data = store.get_node(path).await?;
//! let node = ActionNode::decode(path, &data)?;
//! if purgeable(&node) {
//!     store.delete_node(path).await?;
//! }
//! ```

mod node;
mod predicates;

pub use node::{ActionNode, ActionRecord, ActionState, DecodeError, decode_record};
pub use predicates::{purgeable, stale};

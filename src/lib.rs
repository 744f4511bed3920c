pub mod action;
pub mod config;
pub mod error;
pub mod humanize;
pub mod manager;
pub mod observability;
pub mod resolver;
pub mod shard;
pub mod store;

pub use error::{ActionLogError, Result};

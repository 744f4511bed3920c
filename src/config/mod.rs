//! Configuration management for actionlog
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use actionlog::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Coordination store at: {}", config.store.path.display());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `ACTIONLOG__<section>__<key>`
//!
//! Examples:
//! - `ACTIONLOG__STORE__PATH=/var/lib/actionlog`
//! - `ACTIONLOG__ACTIONS__MAX_STALENESS=10m`
//! - `ACTIONLOG__ACTIONS__KEEP_COUNT=25`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/actionlog.toml`.
//! This can be overridden using the `ACTIONLOG_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{ActionsConfig, Config, StoreConfig, TopologyConfig};
pub use validation::ValidationError;

use crate::error::ActionLogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl From<ConfigError> for ActionLogError {
    fn from(value: ConfigError) -> Self {
        ActionLogError::Configuration(value.to_string())
    }
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation
    /// fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[actions]\nkeep_count = 4\n").unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.actions.keep_count, 4);
        assert!(config.store.wildcards);
    }

    #[test]
    fn test_validation_error_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[topology]\ncell_root = \"/zk/vt\"\n").unwrap();

        let err = Config::load_from_path(config_path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError(ValidationError::MissingCellPlaceholder { .. })
        ));
        assert!(matches!(
            ActionLogError::from(err),
            ActionLogError::Configuration(_)
        ));
    }

    #[test]
    fn test_layout_from_config() {
        let config: Config = toml::from_str(
            r#"
[topology]
global_root = "/coord/global/"
cell_root = "/coord/{cell}"
            "#,
        )
        .unwrap();

        let layout = config.layout();
        assert_eq!(
            layout.shard_action_path("ks", "0"),
            "/coord/global/keyspaces/ks/shards/0/action"
        );
    }
}

use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Store path must not be empty")]
    EmptyStorePath,

    #[error("Topology root must be an absolute path: {field} = {value:?}")]
    RelativeRoot { field: String, value: String },

    #[error("cell_root {value:?} must contain the {{cell}} placeholder")]
    MissingCellPlaceholder { value: String },

    #[error("max_staleness must be positive")]
    ZeroStaleness,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_store(config)?;
    validate_topology(config)?;
    validate_actions(config)?;
    Ok(())
}

fn validate_store(config: &Config) -> Result<(), ValidationError> {
    if config.store.path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyStorePath);
    }
    Ok(())
}

fn validate_topology(config: &Config) -> Result<(), ValidationError> {
    let roots = [
        ("global_root", &config.topology.global_root),
        ("cell_root", &config.topology.cell_root),
    ];
    for (field, value) in roots {
        if !value.starts_with('/') {
            return Err(ValidationError::RelativeRoot {
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }

    if !config.topology.cell_root.contains("{cell}") {
        return Err(ValidationError::MissingCellPlaceholder {
            value: config.topology.cell_root.clone(),
        });
    }
    Ok(())
}

fn validate_actions(config: &Config) -> Result<(), ValidationError> {
    if config.actions.max_staleness.as_duration().is_zero() {
        return Err(ValidationError::ZeroStaleness);
    }
    Ok(())
}

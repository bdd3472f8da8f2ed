//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_changelog(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_changelog(config: &Config) -> Result<()> {
    let file = &config.changelog.file;
    if file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "changelog.file".to_string(),
            message: "file cannot be empty".to_string(),
        }
        .into());
    }

    let valid_extensions = ["md", "markdown"];
    let extension = file.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !valid_extensions.contains(&extension) {
        return Err(ConfigError::InvalidValue {
            field: "changelog.file".to_string(),
            message: format!("extension must be one of: {}", valid_extensions.join(", ")),
        }
        .into());
    }

    // The title line grammar captures a single token.
    if let Some(title) = &config.changelog.title {
        if title.is_empty() || title.starts_with('#') || title.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "changelog.title".to_string(),
                message: "title must be a single word".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

//! Error types for Chronicle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChronicleError
pub type Result<T> = std::result::Result<T, ChronicleError>;

/// Result type alias for changelog model, parser and file operations
pub type ChangelogResult<T> = std::result::Result<T, ChangelogError>;

/// Main error type for Chronicle operations
#[derive(Debug, Error)]
pub enum ChronicleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Version does not follow Semantic Versioning 2.0.0
    #[error("invalid semantic version {version}, expected to match regex {pattern}")]
    InvalidVersion {
        version: String,
        pattern: &'static str,
    },

    /// Date does not have the `YYYY-MM-DD` shape
    #[error("invalid date {date}, expected to match regex {pattern}")]
    InvalidDate { date: String, pattern: &'static str },

    /// Date has the right shape but is not a calendar date
    #[error("invalid date {date}, expected format {format}")]
    InvalidDateFormat { date: String, format: &'static str },

    /// URL could not be parsed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A release with this version is already present
    #[error("version {0} already exists")]
    VersionExists(String),

    /// Promotion requested without any unreleased changes
    #[error("missing 'Unreleased' section")]
    MissingUnreleased,

    /// Category outside of the Keep a Changelog set
    #[error("unexpected scope: {0} (supported: [added,changed,deprecated,removed,fixed,security])")]
    UnknownCategory(String),

    /// Changelog file not found
    #[error("file {} not found", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read the changelog into the line buffer
    #[error("error loading a buffer: {0}")]
    LoadBuffer(#[source] std::io::Error),

    /// Failed to create the target file
    #[error("error creating a file: {0}")]
    CreateFile(#[source] std::io::Error),

    /// Failed to write rendered content
    #[error("error writing to file: {0}")]
    WriteFile(#[source] std::io::Error),

    /// Failed to flush rendered content to durable storage
    #[error("error committing file content to disk: {0}")]
    CommitFile(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_category_lists_supported() {
        let err = ChangelogError::UnknownCategory("INVALID".to_string());
        assert_eq!(
            err.to_string(),
            "unexpected scope: INVALID (supported: [added,changed,deprecated,removed,fixed,security])"
        );
    }

    #[test]
    fn test_io_wrappers_prefix_message() {
        let err = ChangelogError::CreateFile(io::Error::other("reason"));
        assert_eq!(err.to_string(), "error creating a file: reason");

        let err = ChangelogError::LoadBuffer(io::Error::other("broken pipe"));
        assert_eq!(err.to_string(), "error loading a buffer: broken pipe");
    }

    #[test]
    fn test_changelog_error_is_transparent() {
        let err: ChronicleError = ChangelogError::VersionExists("1.0.0".to_string()).into();
        assert_eq!(err.to_string(), "version 1.0.0 already exists");
    }
}

//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for Chronicle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Changelog configuration
    pub changelog: ChangelogConfig,
}

/// Changelog file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogConfig {
    /// Changelog file path
    pub file: PathBuf,

    /// Start from an empty changelog when the file does not exist yet
    pub create_if_missing: bool,

    /// Title given to a freshly created changelog
    pub title: Option<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("CHANGELOG.md"),
            create_if_missing: false,
            title: None,
        }
    }
}

impl ChangelogConfig {
    /// Set the changelog file path
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = file.into();
        self
    }

    /// Set whether a missing file yields an empty changelog
    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set the title used for new changelogs
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

//! Configuration discovery
//!
//! A project is configured by the first `chronicle.{toml,yaml}` (or its hidden
//! variant) found walking up from a start directory. Paths in the file are
//! relative to the directory holding it.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::types::Config;
use super::validation::validate_config;

/// File names probed in every directory, in priority order
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "chronicle.toml",
    "chronicle.yaml",
    ".chronicle.toml",
    ".chronicle.yaml",
];

/// Serialization format of a config file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Format for a path; anything not ending in `.toml` is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }

    fn parse(self, content: &str) -> Result<Config> {
        let config = match self {
            Self::Toml => toml::from_str(content).map_err(ConfigError::TomlError)?,
            Self::Yaml => serde_yaml::from_str(content).map_err(ConfigError::YamlError)?,
        };
        Ok(config)
    }
}

/// A validated config together with the file it came from
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config: Config,
    pub path: PathBuf,
}

impl ProjectConfig {
    /// Read and validate a config file
    pub fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = ConfigFormat::from_path(&path);
        info!(path = %path.display(), ?format, "reading config");

        let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
        let config = format.parse(&content)?;
        validate_config(&config)?;

        Ok(Self { config, path })
    }

    /// Directory that relative paths in the config resolve against
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Absolute location of the configured changelog
    pub fn changelog_path(&self) -> PathBuf {
        self.root().join(&self.config.changelog.file)
    }
}

/// Path of the nearest config file at or above `start`
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let found = start
        .ancestors()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file());

    debug!(start = %start.display(), found = ?found, "config lookup finished");
    found
}

/// Find and read the nearest config file, if there is one
pub fn discover_config(start: &Path) -> Result<Option<ProjectConfig>> {
    find_config(start).map(ProjectConfig::read).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("chronicle.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new(".chronicle.yaml")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_find_config_priority() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join(".chronicle.yaml"), "changelog:\n  file: A.md\n");
        write(&temp.path().join("chronicle.yaml"), "changelog:\n  file: B.md\n");

        assert_eq!(find_config(temp.path()), Some(temp.path().join("chronicle.yaml")));
    }

    #[test]
    fn test_find_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.toml");
        write(&config_path, "[changelog]\nfile = \"CHANGELOG.md\"\n");
        let nested = temp.path().join("crates").join("core");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config(&nested), Some(config_path));
    }

    #[test]
    fn test_read_toml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.toml");
        write(
            &config_path,
            "[changelog]\nfile = \"docs/HISTORY.md\"\ncreate_if_missing = true\ntitle = \"History\"\n",
        );

        let project = ProjectConfig::read(&config_path).unwrap();
        assert!(project.config.changelog.create_if_missing);
        assert_eq!(project.config.changelog.title.as_deref(), Some("History"));
        assert_eq!(project.changelog_path(), temp.path().join("docs/HISTORY.md"));
    }

    #[test]
    fn test_read_yaml() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.yaml");
        write(&config_path, "changelog:\n  file: CHANGES.md\n");

        let project = ProjectConfig::read(&config_path).unwrap();
        assert_eq!(project.config.changelog.file, PathBuf::from("CHANGES.md"));
        assert!(!project.config.changelog.create_if_missing);
    }

    #[test]
    fn test_read_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("chronicle.toml");
        write(&config_path, "[changelog]\nfile = \"CHANGES.txt\"\n");

        assert!(ProjectConfig::read(&config_path).is_err());
    }

    #[test]
    fn test_discover_resolves_against_config_dir() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("chronicle.toml"), "[changelog]\nfile = \"HISTORY.md\"\n");
        let nested = temp.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let project = discover_config(&nested).unwrap().unwrap();
        assert_eq!(project.root(), temp.path());
        assert_eq!(project.changelog_path(), temp.path().join("HISTORY.md"));
    }

    #[test]
    fn test_discover_without_file() {
        let temp = TempDir::new().unwrap();
        assert!(discover_config(temp.path()).unwrap().is_none());
    }
}

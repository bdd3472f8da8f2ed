//! Loading and saving changelog files

use std::io::Write;
use std::path::{Path, PathBuf};

use chronicle_core::config::discover_config;
use chronicle_core::{ChangelogConfig, ChangelogError, ChangelogResult, Filesystem, OsFilesystem};
use tracing::{debug, info, instrument};

use crate::parser::ChangelogParser;
use crate::types::Changelog;

impl Changelog {
    /// Render the changelog and write it to `path`.
    ///
    /// The file is created (or truncated), written and synced to storage.
    #[instrument(skip(self, filesystem, path), fields(path = %path.as_ref().display()))]
    pub fn save_to_file(&self, filesystem: &dyn Filesystem, path: impl AsRef<Path>) -> ChangelogResult<()> {
        let path = path.as_ref();
        let content = self.render();

        let mut file = filesystem.create(path).map_err(ChangelogError::CreateFile)?;
        file.write_all(content.as_bytes())
            .map_err(ChangelogError::WriteFile)?;
        file.sync().map_err(ChangelogError::CommitFile)?;

        info!(bytes = content.len(), "changelog saved");
        Ok(())
    }
}

/// Load and parse the changelog stored at `path`
pub fn load_changelog(filesystem: &dyn Filesystem, path: impl Into<PathBuf>) -> ChangelogResult<Changelog> {
    ChangelogParser::with_filesystem(filesystem, path)?.parse()
}

/// A changelog file located through configuration
#[derive(Debug, Clone)]
pub struct ChangelogFile<F: Filesystem = OsFilesystem> {
    filesystem: F,
    config: ChangelogConfig,
}

impl ChangelogFile<OsFilesystem> {
    /// Locate the changelog for a project directory.
    ///
    /// The nearest config file at or above `dir` decides the changelog path,
    /// relative to the directory holding that file. Without a config file the
    /// defaults apply, relative to `dir`.
    pub fn discover(dir: &Path) -> chronicle_core::Result<Self> {
        let changelog = match discover_config(dir)? {
            Some(project) => {
                let file = project.changelog_path();
                ChangelogConfig {
                    file,
                    ..project.config.changelog
                }
            }
            None => {
                let defaults = ChangelogConfig::default();
                ChangelogConfig {
                    file: dir.join(&defaults.file),
                    ..defaults
                }
            }
        };

        debug!(dir = %dir.display(), file = %changelog.file.display(), "changelog file resolved");
        Ok(Self::from_config(OsFilesystem::new(), changelog))
    }
}

impl<F: Filesystem> ChangelogFile<F> {
    /// Bind a changelog configuration to a filesystem
    pub fn from_config(filesystem: F, config: ChangelogConfig) -> Self {
        Self { filesystem, config }
    }

    /// Path of the changelog file
    pub fn path(&self) -> &Path {
        &self.config.file
    }

    /// Load the changelog.
    ///
    /// A missing file yields a fresh document when `create_if_missing` is set.
    pub fn load(&self) -> ChangelogResult<Changelog> {
        match ChangelogParser::with_filesystem(&self.filesystem, self.path()) {
            Ok(parser) => parser.parse(),
            Err(ChangelogError::FileNotFound { .. }) if self.config.create_if_missing => {
                info!(path = %self.path().display(), "changelog not found, starting a new one");
                let mut changelog = Changelog::new();
                if let Some(title) = &self.config.title {
                    changelog.set_title(title.as_str());
                }
                Ok(changelog)
            }
            Err(e) => Err(e),
        }
    }

    /// Write the changelog back to its file
    pub fn save(&self, changelog: &Changelog) -> ChangelogResult<()> {
        changelog.save_to_file(&self.filesystem, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle_core::{FileInfo, FileSink, MemoryFilesystem};
    use std::io::{self, Read};
    use tempfile::TempDir;

    /// Filesystem that fails at a chosen step
    struct BrokenFilesystem {
        create: bool,
        write: bool,
    }

    struct BrokenSink {
        write: bool,
    }

    impl Write for BrokenSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.write {
                Err(io::Error::other("no space left"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl FileSink for BrokenSink {
        fn sync(&mut self) -> io::Result<()> {
            Err(io::Error::other("fsync failed"))
        }
    }

    impl Filesystem for BrokenFilesystem {
        fn stat(&self, path: &Path) -> io::Result<FileInfo> {
            Ok(FileInfo {
                path: path.to_path_buf(),
                len: 0,
            })
        }

        fn open(&self, _path: &Path) -> io::Result<Box<dyn Read>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
        }

        fn create(&self, _path: &Path) -> io::Result<Box<dyn FileSink>> {
            if self.create {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"))
            } else {
                Ok(Box::new(BrokenSink { write: self.write }))
            }
        }
    }

    fn sample() -> Changelog {
        let mut changelog = Changelog::new();
        changelog.set_title("Changelog");
        changelog
            .create_release("1.0.0", "2021-05-19")
            .unwrap()
            .add_change("added", "First release")
            .unwrap();
        changelog
    }

    #[test]
    fn test_save_to_memory_filesystem() {
        let fs = MemoryFilesystem::new();
        let changelog = sample();
        changelog.save_to_file(&fs, "CHANGELOG.md").unwrap();

        let saved = fs.read_to_string(Path::new("CHANGELOG.md")).unwrap();
        assert_eq!(saved, changelog.render());
        assert_eq!(load_changelog(&fs, "CHANGELOG.md").unwrap(), changelog);
    }

    #[test]
    fn test_save_overwrites_existing_content() {
        let fs = MemoryFilesystem::new().with_file("CHANGELOG.md", "x".repeat(4096));
        sample().save_to_file(&fs, "CHANGELOG.md").unwrap();

        let saved = fs.read_to_string(Path::new("CHANGELOG.md")).unwrap();
        assert_eq!(saved, sample().render());
    }

    #[test]
    fn test_save_error_wrapping() {
        let changelog = sample();

        let fs = BrokenFilesystem { create: true, write: false };
        let err = changelog.save_to_file(&fs, "CHANGELOG.md").unwrap_err();
        assert_eq!(err.to_string(), "error creating a file: permission denied");

        let fs = BrokenFilesystem { create: false, write: true };
        let err = changelog.save_to_file(&fs, "CHANGELOG.md").unwrap_err();
        assert_eq!(err.to_string(), "error writing to file: no space left");

        let fs = BrokenFilesystem { create: false, write: false };
        let err = changelog.save_to_file(&fs, "CHANGELOG.md").unwrap_err();
        assert_eq!(err.to_string(), "error committing file content to disk: fsync failed");
    }

    #[test]
    fn test_load_error_wrapping() {
        let fs = BrokenFilesystem { create: false, write: false };
        let err = load_changelog(&fs, "CHANGELOG.md").unwrap_err();
        assert_eq!(err.to_string(), "error loading a buffer: permission denied");
    }

    #[test]
    fn test_changelog_file_missing() {
        let config = ChangelogConfig::default();
        let file = ChangelogFile::from_config(MemoryFilesystem::new(), config);
        assert!(matches!(file.load(), Err(ChangelogError::FileNotFound { .. })));
    }

    #[test]
    fn test_changelog_file_create_if_missing() {
        let config = ChangelogConfig::default()
            .with_file("docs/CHANGES.md")
            .with_create_if_missing(true)
            .with_title("Changelog");
        let fs = MemoryFilesystem::new();
        let file = ChangelogFile::from_config(fs.clone(), config);
        assert_eq!(file.path(), Path::new("docs/CHANGES.md"));

        let mut changelog = file.load().unwrap();
        assert_eq!(changelog.title(), Some("Changelog"));
        assert!(changelog.releases().is_empty());

        changelog.add_unreleased_change("fixed", "Crash on empty input").unwrap();
        file.save(&changelog).unwrap();

        assert_eq!(
            fs.read_to_string(Path::new("docs/CHANGES.md")).unwrap(),
            "# Changelog\n\n## [Unreleased]\n\n### Fixed\n\n- Crash on empty input\n"
        );
        assert_eq!(file.load().unwrap(), changelog);
    }

    #[test]
    fn test_discover_uses_config_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("chronicle.toml"),
            "[changelog]\nfile = \"HISTORY.md\"\ncreate_if_missing = true\ntitle = \"History\"\n",
        )
        .unwrap();

        let file = ChangelogFile::discover(temp.path()).unwrap();
        assert_eq!(file.path(), temp.path().join("HISTORY.md"));

        let mut changelog = file.load().unwrap();
        assert_eq!(changelog.title(), Some("History"));

        changelog.create_release("0.1.0", "2024-01-01").unwrap();
        file.save(&changelog).unwrap();

        let content = std::fs::read_to_string(temp.path().join("HISTORY.md")).unwrap();
        assert_eq!(content, "# History\n\n## [0.1.0] - 2024-01-01\n");
    }

    #[test]
    fn test_discover_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("CHANGELOG.md"), "# Changelog\n").unwrap();

        let file = ChangelogFile::discover(temp.path()).unwrap();
        assert_eq!(file.path(), temp.path().join("CHANGELOG.md"));
        assert_eq!(file.load().unwrap().title(), Some("Changelog"));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("chronicle.yaml"), "changelog:\n  file: HISTORY.md\n").unwrap();
        let nested = temp.path().join("crates").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        let file = ChangelogFile::discover(&nested).unwrap();
        assert_eq!(file.path(), temp.path().join("HISTORY.md"));
    }

    #[test]
    fn test_discover_invalid_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("chronicle.toml"), "[changelog]\nfile = \"HISTORY.txt\"\n").unwrap();

        let err = ChangelogFile::discover(temp.path()).unwrap_err();
        assert!(err.to_string().contains("changelog.file"));
    }
}

//! Changelog parsing
//!
//! Parsing runs in two passes over a line buffer: the first records the index
//! of every structural line (its "margins"), the second slices the buffer
//! between margins into title, description and releases. Lines that match no
//! recognizer are never an error; they end up in a description, a notice or an
//! entry depending on where they sit.

mod extract;
mod margins;

pub use margins::Margins;

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chronicle_core::{ChangelogError, ChangelogResult, Filesystem, OsFilesystem};
use tracing::{debug, info, instrument};

use crate::types::Changelog;
use extract::Extractor;

/// Parse a changelog from a sequence of lines
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Changelog {
    Extractor::new(lines).extract()
}

/// Parse a changelog from a string
pub fn parse_str(content: &str) -> Changelog {
    let lines: Vec<&str> = content.lines().collect();
    parse_lines(&lines)
}

/// Parse a changelog from a byte source.
///
/// The source is drained into a line buffer first; only read errors fail.
#[instrument(skip(reader))]
pub fn parse_reader<R: Read>(reader: R) -> ChangelogResult<Changelog> {
    let lines = BufReader::new(reader)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .map_err(ChangelogError::LoadBuffer)?;
    debug!(line_count = lines.len(), "buffer loaded");

    Ok(parse_lines(&lines))
}

/// Parser bound to a changelog file on a filesystem
#[derive(Debug, Clone)]
pub struct ChangelogParser<F: Filesystem = OsFilesystem> {
    filesystem: F,
    path: PathBuf,
}

impl ChangelogParser<OsFilesystem> {
    /// Create a parser for a file on the OS filesystem
    pub fn new(path: impl Into<PathBuf>) -> ChangelogResult<Self> {
        Self::with_filesystem(OsFilesystem::new(), path)
    }
}

impl<F: Filesystem> ChangelogParser<F> {
    /// Create a parser for a file on a specific filesystem.
    ///
    /// Fails when the file does not exist.
    pub fn with_filesystem(filesystem: F, path: impl Into<PathBuf>) -> ChangelogResult<Self> {
        let path = path.into();
        if let Err(source) = filesystem.stat(&path) {
            if source.kind() == std::io::ErrorKind::NotFound {
                return Err(ChangelogError::FileNotFound { path, source });
            }
        }

        Ok(Self { filesystem, path })
    }

    /// Path of the parsed file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn parse(&self) -> ChangelogResult<Changelog> {
        info!("parsing changelog");
        let reader = self
            .filesystem
            .open(&self.path)
            .map_err(ChangelogError::LoadBuffer)?;
        parse_reader(reader)
    }
}

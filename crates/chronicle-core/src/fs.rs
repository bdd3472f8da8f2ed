//! Filesystem access
//!
//! Changelogs are read and written through the [`Filesystem`] trait so the
//! parser and the saver can run against the real disk ([`OsFilesystem`]) or
//! against an in-memory tree ([`MemoryFilesystem`]) in tests.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Metadata returned by [`Filesystem::stat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path that was inspected
    pub path: PathBuf,
    /// Size in bytes
    pub len: u64,
}

/// A writable file handle whose content is durably committed by [`FileSink::sync`]
pub trait FileSink: Write {
    /// Flush buffered bytes and commit them to storage
    fn sync(&mut self) -> io::Result<()>;
}

impl FileSink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

/// Trait for filesystem backends
pub trait Filesystem: Send + Sync {
    /// Return metadata for a file, or an error of kind `NotFound`
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Open a file for reading
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Create (or truncate) a file for writing
    fn create(&self, path: &Path) -> io::Result<Box<dyn FileSink>>;
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        (**self).stat(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        (**self).open(path)
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileSink>> {
        (**self).create(path)
    }
}

/// Filesystem backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl OsFilesystem {
    /// Create a new OS filesystem handle
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for OsFilesystem {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let metadata = std::fs::metadata(path)?;
        Ok(FileInfo {
            path: path.to_path_buf(),
            len: metadata.len(),
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        debug!(path = %path.display(), "opening file");
        Ok(Box::new(File::open(path)?))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileSink>> {
        debug!(path = %path.display(), "creating file");
        Ok(Box::new(File::create(path)?))
    }
}

type FileMap = Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>;

/// In-memory filesystem
///
/// Clones share the same file tree. Bytes written through a handle returned by
/// [`Filesystem::create`] become visible on `flush`, `sync`, or when the
/// handle is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    files: FileMap,
}

impl MemoryFilesystem {
    /// Create an empty in-memory filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), content.into());
        }
        self
    }

    /// Read a file's content as UTF-8 text
    pub fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut content = String::new();
        self.open(path)?.read_to_string(&mut content)?;
        Ok(content)
    }
}

fn poisoned() -> io::Error {
    io::Error::other("memory filesystem lock poisoned")
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: file does not exist", path.display()),
    )
}

impl Filesystem for MemoryFilesystem {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        let files = self.files.read().map_err(|_| poisoned())?;
        let content = files.get(path).ok_or_else(|| not_found(path))?;
        Ok(FileInfo {
            path: path.to_path_buf(),
            len: content.len() as u64,
        })
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        let files = self.files.read().map_err(|_| poisoned())?;
        let content = files.get(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(Cursor::new(content.clone())))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileSink>> {
        self.files
            .write()
            .map_err(|_| poisoned())?
            .insert(path.to_path_buf(), Vec::new());

        Ok(Box::new(MemoryFile {
            path: path.to_path_buf(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }
}

struct MemoryFile {
    path: PathBuf,
    buffer: Vec<u8>,
    files: FileMap,
}

impl MemoryFile {
    fn commit(&self) -> io::Result<()> {
        self.files
            .write()
            .map_err(|_| poisoned())?
            .insert(self.path.clone(), self.buffer.clone());
        Ok(())
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit()
    }
}

impl FileSink for MemoryFile {
    fn sync(&mut self) -> io::Result<()> {
        self.commit()
    }
}

impl Drop for MemoryFile {
    fn drop(&mut self) {
        let _ = self.commit();
    }
}

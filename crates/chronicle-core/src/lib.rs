//! Chronicle Core - Shared foundations for changelog manipulation
//!
//! This crate provides the error types, configuration loading and the
//! filesystem abstraction used by the Chronicle changelog crates.

pub mod config;
pub mod error;
pub mod fs;

pub use config::{ChangelogConfig, Config};
pub use error::{ChangelogError, ChangelogResult, ChronicleError, ConfigError, Result};
pub use fs::{FileInfo, FileSink, Filesystem, MemoryFilesystem, OsFilesystem};

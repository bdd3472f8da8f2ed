//! Chronicle Changelog - Keep a Changelog documents as data
//!
//! This crate parses Markdown changelogs following the
//! [Keep a Changelog](https://keepachangelog.com/en/1.0.0/) conventions into a
//! typed model, lets callers edit it (add changes, cut releases, promote the
//! unreleased section) and renders it back to canonical Markdown.
//!
//! ```
//! use chronicle_changelog::{parse_str, Category};
//!
//! let mut changelog = parse_str("# Changelog\n\n## [Unreleased]\n\n### Added\n\n- New flag\n");
//! changelog.promote_unreleased("1.0.0", "2024-03-01").unwrap();
//!
//! let release = changelog.get_release("1.0.0").unwrap();
//! assert_eq!(release.changes().unwrap().entries(Category::Added).unwrap().len(), 1);
//! assert!(changelog.render().contains("## [1.0.0] - 2024-03-01"));
//! ```

pub mod file;
pub mod formatter;
pub mod grammar;
pub mod parser;
pub mod releases;
pub mod types;
pub mod validation;

pub use chronicle_core::{ChangelogError, ChangelogResult};
pub use file::{load_changelog, ChangelogFile};
pub use formatter::{ChangelogFormatter, MarkdownFormatter};
pub use parser::{parse_lines, parse_reader, parse_str, ChangelogParser};
pub use releases::{cmp_precedence, Releases};
pub use types::{Category, Changelog, Changes, Release};

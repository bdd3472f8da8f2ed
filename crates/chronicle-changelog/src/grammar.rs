//! Line grammar for Keep a Changelog documents
//!
//! Every structural line shape the parser recognizes is defined here. Each
//! recognizer is anchored to the full line.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::Category;

/// Semantic Versioning 2.0.0 (https://semver.org)
pub const SEMVER_PATTERN: &str = r"(?:0|[1-9][0-9]*)\.(?:0|[1-9][0-9]*)\.(?:0|[1-9][0-9]*)(?:-(?:(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9][0-9]*|[0-9]*[a-zA-Z-][0-9a-zA-Z-]*))*))?(?:\+(?:[0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?";

/// Calendar date shape `YYYY-MM-DD`
pub const DATE_PATTERN: &str = r"[0-9]{4}-[0-9]{2}-[0-9]{2}";

/// Permissive URL shape: a scheme with `//`, or a dotted host with an optional path
pub const URL_PATTERN: &str = r"(?:[A-Za-z][A-Za-z0-9+.\-]*://[^\s()<>]+|[A-Za-z0-9][A-Za-z0-9\-]*(?:\.[A-Za-z0-9\-]+)+(?:[/?#:][^\s()<>]*)?)";

/// `chrono` format of release dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Human-readable form of [`DATE_FORMAT`]
pub const DATE_FORMAT_DISPLAY: &str = "YYYY-MM-DD";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid regex")
}

static TITLE: LazyLock<Regex> = LazyLock::new(|| compile(r"^#\s*(?P<title>[^\s#]\S*)\s*$"));

static UNRELEASED_HEADER: LazyLock<Regex> = LazyLock::new(|| compile(r"^## \[Unreleased\]$"));

static UNRELEASED_HEADER_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(r"^## \[Unreleased\]\((?P<url>{URL_PATTERN})\)$"))
});

static VERSION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^## \[(?P<version>{SEMVER_PATTERN})\] - (?P<date>{DATE_PATTERN})(?P<yanked> \[YANKED\])?$"
    ))
});

static VERSION_HEADER_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^## \[(?P<version>{SEMVER_PATTERN})\]\((?P<url>{URL_PATTERN})\) - (?P<date>{DATE_PATTERN})(?P<yanked> \[YANKED\])?$"
    ))
});

static UNRELEASED_LINK_DEF: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"^\[Unreleased\]: (?P<url>{URL_PATTERN})$")));

static VERSION_LINK_DEF: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\[(?P<version>{SEMVER_PATTERN})\]: (?P<url>{URL_PATTERN})$"
    ))
});

static CATEGORY_HEADERS: LazyLock<Vec<(Category, Regex)>> = LazyLock::new(|| {
    Category::ALL
        .iter()
        .map(|category| (*category, compile(&format!("^### {}$", category.heading()))))
        .collect()
});

static ENTRY: LazyLock<Regex> = LazyLock::new(|| compile(r"^[-*+]\s*(?P<entry>.*)$"));

static BLANK: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s*$"));

pub(crate) static SEMVER_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!("^{SEMVER_PATTERN}$")));

pub(crate) static DATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!("^{DATE_PATTERN}$")));

/// Structural shape of a recognized line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineShape {
    /// `# <title>`
    Title,
    /// `## [Unreleased]`, optionally with an inline link
    UnreleasedHeader,
    /// `## [<version>] - <date>`, optionally with an inline link
    VersionHeader,
    /// `[Unreleased]: <url>` or `[<version>]: <url>`
    LinkDefinition,
    /// `### <Category>`
    CategoryHeader(Category),
}

/// Recognize the structural shape of a line, if it has one
pub fn recognize(line: &str) -> Option<LineShape> {
    if TITLE.is_match(line) {
        return Some(LineShape::Title);
    }
    if UNRELEASED_HEADER.is_match(line) || UNRELEASED_HEADER_INLINE.is_match(line) {
        return Some(LineShape::UnreleasedHeader);
    }
    if VERSION_HEADER.is_match(line) || VERSION_HEADER_INLINE.is_match(line) {
        return Some(LineShape::VersionHeader);
    }
    if UNRELEASED_LINK_DEF.is_match(line) || VERSION_LINK_DEF.is_match(line) {
        return Some(LineShape::LinkDefinition);
    }
    CATEGORY_HEADERS
        .iter()
        .find(|(_, regex)| regex.is_match(line))
        .map(|(category, _)| LineShape::CategoryHeader(*category))
}

/// Title token of a `# <title>` line
pub fn title(line: &str) -> Option<&str> {
    TITLE
        .captures(line)
        .and_then(|caps| caps.name("title"))
        .map(|m| m.as_str())
}

/// URL of a `## [Unreleased](<url>)` line
pub fn unreleased_inline_url(line: &str) -> Option<&str> {
    UNRELEASED_HEADER_INLINE
        .captures(line)
        .and_then(|caps| caps.name("url"))
        .map(|m| m.as_str())
}

/// Captures of a version header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionHeader<'a> {
    /// Version as written
    pub version: &'a str,
    /// Date as written, not yet validated
    pub date: &'a str,
    /// Inline URL, if the header carries one
    pub url: Option<&'a str>,
    /// Whether the header ends with `[YANKED]`
    pub yanked: bool,
}

/// Parse a `## [<version>] - <date>` or `## [<version>](<url>) - <date>` line
pub fn version_header(line: &str) -> Option<VersionHeader<'_>> {
    let caps = VERSION_HEADER_INLINE
        .captures(line)
        .or_else(|| VERSION_HEADER.captures(line))?;

    Some(VersionHeader {
        version: caps.name("version")?.as_str(),
        date: caps.name("date")?.as_str(),
        url: caps.name("url").map(|m| m.as_str()),
        yanked: caps.name("yanked").is_some(),
    })
}

/// Target of a link definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget<'a> {
    /// `[Unreleased]: <url>`
    Unreleased,
    /// `[<version>]: <url>`
    Version(&'a str),
}

/// Parse a reference-style link definition, returning its target and URL
pub fn link_definition(line: &str) -> Option<(LinkTarget<'_>, &str)> {
    if let Some(caps) = UNRELEASED_LINK_DEF.captures(line) {
        return Some((LinkTarget::Unreleased, caps.name("url")?.as_str()));
    }

    let caps = VERSION_LINK_DEF.captures(line)?;
    Some((
        LinkTarget::Version(caps.name("version")?.as_str()),
        caps.name("url")?.as_str(),
    ))
}

/// Text after the bullet marker of an entry line
pub fn entry_text(line: &str) -> Option<&str> {
    ENTRY
        .captures(line)
        .and_then(|caps| caps.name("entry"))
        .map(|m| m.as_str())
}

/// Check whether a line is empty or whitespace only
pub fn is_blank(line: &str) -> bool {
    BLANK.is_match(line)
}

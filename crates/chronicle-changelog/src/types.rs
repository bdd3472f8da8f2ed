//! Changelog document model

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use chronicle_core::{ChangelogError, ChangelogResult};
use serde::{Deserialize, Serialize};
use semver::Version;

use crate::formatter::{ChangelogFormatter, MarkdownFormatter};
use crate::releases::Releases;
use crate::validation::{parse_date, parse_version, validate_url};

/// Change category of a Keep a Changelog release
///
/// The declaration order is the canonical rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// New features
    Added,
    /// Changes in existing functionality
    Changed,
    /// Soon-to-be removed features
    Deprecated,
    /// Removed features
    Removed,
    /// Bug fixes
    Fixed,
    /// Vulnerability fixes
    Security,
}

impl Category {
    /// All categories in canonical order
    pub const ALL: [Category; 6] = [
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Removed,
        Self::Fixed,
        Self::Security,
    ];

    /// Returns the lowercase name used on mutation input
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Changed => "changed",
            Self::Deprecated => "deprecated",
            Self::Removed => "removed",
            Self::Fixed => "fixed",
            Self::Security => "security",
        }
    }

    /// Returns the title-cased name used in `### <Category>` headers
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "changed" => Ok(Self::Changed),
            "deprecated" => Ok(Self::Deprecated),
            "removed" => Ok(Self::Removed),
            "fixed" => Ok(Self::Fixed),
            "security" => Ok(Self::Security),
            _ => Err(ChangelogError::UnknownCategory(s.to_string())),
        }
    }
}

/// Body of a release: an optional notice and categorized entries
///
/// Category lists are never empty; an empty category is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changes {
    pub(crate) notice: Option<String>,
    pub(crate) entries: BTreeMap<Category, Vec<String>>,
}

impl Changes {
    /// Create an empty changeset
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-form prose preceding the first category
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Replace the notice; an empty notice clears it
    pub fn add_notice(&mut self, notice: impl Into<String>) {
        let notice = notice.into();
        self.notice = (!notice.is_empty()).then_some(notice);
    }

    /// Append an entry under a category given by name (case-insensitive).
    ///
    /// Supported categories: added, changed, deprecated, removed, fixed, security.
    /// An empty entry is accepted and ignored.
    pub fn add_change(&mut self, category: &str, change: impl Into<String>) -> ChangelogResult<()> {
        let category: Category = category.parse()?;
        self.push(category, change);
        Ok(())
    }

    /// Append an entry under a category; empty entries are ignored
    pub fn push(&mut self, category: Category, change: impl Into<String>) {
        let change = change.into();
        if change.is_empty() {
            return;
        }
        self.entries.entry(category).or_default().push(change);
    }

    /// Entries of a category, if present
    pub fn entries(&self, category: Category) -> Option<&[String]> {
        self.entries.get(&category).map(Vec::as_slice)
    }

    /// Present categories with their entries, in canonical order
    pub fn categories(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries
            .iter()
            .map(|(category, entries)| (*category, entries.as_slice()))
    }

    /// Check if neither a notice nor any entry is present
    pub fn is_empty(&self) -> bool {
        self.notice.is_none() && self.entries.is_empty()
    }

    pub(crate) fn set_entries(&mut self, category: Category, entries: Vec<String>) {
        if !entries.is_empty() {
            self.entries.insert(category, entries);
        }
    }
}

/// A single changelog version, or the unreleased slot when it has no version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub(crate) version: Option<Version>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) yanked: bool,
    pub(crate) url: Option<String>,
    pub(crate) changes: Option<Changes>,
}

impl Release {
    /// Create the unreleased slot
    pub fn unreleased() -> Self {
        Self::default()
    }

    /// Create a release for a version
    pub fn new(version: Version) -> Self {
        Self {
            version: Some(version),
            ..Self::default()
        }
    }

    /// Check if this is the unreleased slot
    pub fn is_unreleased(&self) -> bool {
        self.version.is_none()
    }

    /// Semantic version, absent for the unreleased slot
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Release date
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Whether the release was retracted
    pub fn is_yanked(&self) -> bool {
        self.yanked
    }

    /// Link target of the release
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Notice and categorized entries
    pub fn changes(&self) -> Option<&Changes> {
        self.changes.as_ref()
    }

    /// Label used in headers and link definitions
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => version.to_string(),
            None => "Unreleased".to_string(),
        }
    }

    /// Set the version; must follow Semantic Versioning 2.0.0.
    ///
    /// Uniqueness within a changelog is checked when releases are created, not here.
    pub fn set_version(&mut self, version: &str) -> ChangelogResult<()> {
        self.version = Some(parse_version(version)?);
        Ok(())
    }

    /// Set the release date, formatted `YYYY-MM-DD`
    pub fn set_date(&mut self, date: &str) -> ChangelogResult<()> {
        self.date = Some(parse_date(date)?);
        Ok(())
    }

    /// Set the release URL
    pub fn set_url(&mut self, link: &str) -> ChangelogResult<()> {
        validate_url(link)?;
        self.url = Some(link.to_string());
        Ok(())
    }

    /// Mark or unmark the release as yanked
    pub fn set_yanked(&mut self, yanked: bool) {
        self.yanked = yanked;
    }

    /// Replace the notice of the release
    pub fn add_notice(&mut self, notice: impl Into<String>) {
        let changes = self.changes.get_or_insert_with(Changes::default);
        changes.add_notice(notice);
        self.drop_empty_changes();
    }

    /// Append an entry under a category given by name (case-insensitive)
    pub fn add_change(&mut self, category: &str, change: impl Into<String>) -> ChangelogResult<()> {
        let category: Category = category.parse()?;
        self.changes
            .get_or_insert_with(Changes::default)
            .push(category, change);
        self.drop_empty_changes();
        Ok(())
    }

    pub(crate) fn take_changes(&mut self) -> Option<Changes> {
        self.changes.take()
    }

    fn drop_empty_changes(&mut self) {
        if self.changes.as_ref().is_some_and(Changes::is_empty) {
            self.changes = None;
        }
    }
}

/// A complete changelog document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changelog {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) unreleased: Option<Release>,
    pub(crate) releases: Releases,
}

impl Changelog {
    /// Create an empty changelog
    pub fn new() -> Self {
        Self::default()
    }

    /// Document title
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the title; an empty title clears it.
    ///
    /// The `# <title>` line only reads back a single word, so a title with
    /// whitespace in it comes back as description text after a render/parse cycle.
    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.title = (!title.is_empty()).then_some(title);
    }

    /// Free-form text between the title and the first release
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Set the description; an empty description clears it
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.description = (!description.is_empty()).then_some(description);
    }

    /// The unreleased slot
    pub fn unreleased(&self) -> Option<&Release> {
        self.unreleased.as_ref()
    }

    /// Released versions, in document order
    pub fn releases(&self) -> &Releases {
        &self.releases
    }

    /// Set the URL of the unreleased slot, creating the slot if needed
    pub fn set_unreleased_url(&mut self, link: &str) -> ChangelogResult<()> {
        validate_url(link)?;
        self.unreleased.get_or_insert_with(Release::unreleased).url = Some(link.to_string());
        Ok(())
    }

    /// Replace the notice of the unreleased slot, creating the slot if needed
    pub fn add_unreleased_notice(&mut self, notice: impl Into<String>) {
        self.unreleased
            .get_or_insert_with(Release::unreleased)
            .add_notice(notice);
    }

    /// Append an entry to the unreleased slot.
    ///
    /// Supported categories: added, changed, deprecated, removed, fixed, security.
    /// The changelog is left untouched when the category is unknown.
    pub fn add_unreleased_change(&mut self, category: &str, change: impl Into<String>) -> ChangelogResult<()> {
        let category: Category = category.parse()?;
        let change = change.into();
        if change.is_empty() {
            return Ok(());
        }

        self.unreleased
            .get_or_insert_with(Release::unreleased)
            .changes
            .get_or_insert_with(Changes::default)
            .push(category, change);
        Ok(())
    }

    /// Find a release by version
    pub fn get_release(&self, version: &str) -> Option<&Release> {
        self.releases.get_release(version)
    }

    /// Find a release by version for modification
    pub fn get_release_mut(&mut self, version: &str) -> Option<&mut Release> {
        self.releases.get_release_mut(version)
    }

    /// Create an empty release
    pub fn create_release(&mut self, version: &str, date: &str) -> ChangelogResult<&mut Release> {
        self.releases.create_release(version, date)
    }

    /// Create an empty release with a URL
    pub fn create_release_with_url(
        &mut self,
        version: &str,
        date: &str,
        link: &str,
    ) -> ChangelogResult<&mut Release> {
        self.releases.create_release_with_url(version, date, link)
    }

    /// Create a release holding every unreleased change and clear the unreleased slot
    pub fn promote_unreleased(&mut self, version: &str, date: &str) -> ChangelogResult<&mut Release> {
        self.promote(version, date, None)
    }

    /// Same as [`Changelog::promote_unreleased`], also setting the release URL
    pub fn promote_unreleased_with_url(
        &mut self,
        version: &str,
        date: &str,
        link: &str,
    ) -> ChangelogResult<&mut Release> {
        self.promote(version, date, Some(link))
    }

    fn promote(&mut self, version: &str, date: &str, link: Option<&str>) -> ChangelogResult<&mut Release> {
        let has_changes = self
            .unreleased
            .as_ref()
            .is_some_and(|release| release.changes.is_some());
        if !has_changes {
            return Err(ChangelogError::MissingUnreleased);
        }

        let mut release = self.releases.build_release(version, date, link)?;
        release.changes = self.unreleased.as_mut().and_then(Release::take_changes);
        Ok(self.releases.push(release))
    }

    /// Render the changelog as Markdown
    pub fn render(&self) -> String {
        self.render_with(&MarkdownFormatter::new())
    }

    /// Render the changelog with a specific formatter
    pub fn render_with(&self, formatter: &dyn ChangelogFormatter) -> String {
        formatter.format(self)
    }
}

impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

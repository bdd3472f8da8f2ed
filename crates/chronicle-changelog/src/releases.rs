//! Released versions of a changelog

use std::cmp::Ordering;

use chronicle_core::{ChangelogError, ChangelogResult};
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Release;
use crate::validation::{parse_date, parse_version, validate_url};

/// Compare two versions by SemVer 2 precedence, ignoring build metadata
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

/// Ordered collection of versioned releases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Releases(Vec<Release>);

impl Releases {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of releases
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no releases
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if release `i` has lower precedence than release `j`
    pub fn less(&self, i: usize, j: usize) -> bool {
        compare(&self.0[i], &self.0[j]) == Ordering::Less
    }

    /// Swap the positions of two releases
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Iterate in stored order
    pub fn iter(&self) -> std::slice::Iter<'_, Release> {
        self.0.iter()
    }

    /// Releases ordered by descending precedence, without reordering the collection
    pub fn sorted(&self) -> Vec<&Release> {
        let mut sorted: Vec<&Release> = self.0.iter().collect();
        sorted.sort_by(|a, b| compare(b, a));
        sorted
    }

    /// Reorder the collection by descending precedence
    pub fn sort_descending(&mut self) {
        self.0.sort_by(|a, b| compare(b, a));
    }

    /// Find a release by version
    pub fn get_release(&self, version: &str) -> Option<&Release> {
        let version = Version::parse(version).ok()?;
        self.0.iter().find(|r| r.version.as_ref() == Some(&version))
    }

    /// Find a release by version for modification
    pub fn get_release_mut(&mut self, version: &str) -> Option<&mut Release> {
        let version = Version::parse(version).ok()?;
        self.0.iter_mut().find(|r| r.version.as_ref() == Some(&version))
    }

    /// Create an empty release
    pub fn create_release(&mut self, version: &str, date: &str) -> ChangelogResult<&mut Release> {
        let release = self.build_release(version, date, None)?;
        Ok(self.push(release))
    }

    /// Create an empty release with a URL.
    ///
    /// Nothing is added when any of the inputs is invalid.
    pub fn create_release_with_url(
        &mut self,
        version: &str,
        date: &str,
        link: &str,
    ) -> ChangelogResult<&mut Release> {
        let release = self.build_release(version, date, Some(link))?;
        Ok(self.push(release))
    }

    /// Validate inputs and build a release that is not yet part of the collection
    pub(crate) fn build_release(
        &self,
        version: &str,
        date: &str,
        link: Option<&str>,
    ) -> ChangelogResult<Release> {
        if self
            .0
            .iter()
            .any(|r| r.version.as_ref().is_some_and(|v| v.to_string() == version))
        {
            return Err(ChangelogError::VersionExists(version.to_string()));
        }

        let date = parse_date(date)?;
        let version = parse_version(version)?;
        if let Some(link) = link {
            validate_url(link)?;
        }

        Ok(Release {
            version: Some(version),
            date: Some(date),
            url: link.map(str::to_string),
            ..Release::default()
        })
    }

    pub(crate) fn push(&mut self, release: Release) -> &mut Release {
        debug!(version = %release.label(), "adding release");
        let index = self.0.len();
        self.0.push(release);
        &mut self.0[index]
    }
}

fn compare(a: &Release, b: &Release) -> Ordering {
    match (&a.version, &b.version) {
        (Some(a), Some(b)) => cmp_precedence(a, b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl<'a> IntoIterator for &'a Releases {
    type Item = &'a Release;
    type IntoIter = std::slice::Iter<'a, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn releases(versions: &[&str]) -> Releases {
        let mut releases = Releases::new();
        for version in versions {
            releases.create_release(version, "2021-05-19").unwrap();
        }
        releases
    }

    fn labels(releases: &[&Release]) -> Vec<String> {
        releases.iter().map(|r| r.label()).collect()
    }

    #[test]
    fn test_precedence_ignores_build_metadata() {
        let a = Version::parse("1.0.0+build.1").unwrap();
        let b = Version::parse("1.0.0+build.2").unwrap();
        assert_eq!(cmp_precedence(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_precedence_prerelease() {
        let ordered = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in ordered.windows(2) {
            let a = Version::parse(pair[0]).unwrap();
            let b = Version::parse(pair[1]).unwrap();
            assert_eq!(cmp_precedence(&a, &b), Ordering::Less, "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_less_and_swap() {
        let mut releases = releases(&["0.0.1", "0.0.2"]);
        assert_eq!(releases.len(), 2);
        assert!(releases.less(0, 1));
        assert!(!releases.less(1, 0));

        releases.swap(0, 1);
        assert!(releases.less(1, 0));
    }

    #[test]
    fn test_sorted_descending() {
        let releases = releases(&["0.1.0", "1.0.0-rc.1", "0.10.0", "1.0.0", "0.2.0"]);
        assert_eq!(
            labels(&releases.sorted()),
            vec!["1.0.0", "1.0.0-rc.1", "0.10.0", "0.2.0", "0.1.0"]
        );
        // the collection itself keeps insertion order
        assert_eq!(releases.iter().next().unwrap().label(), "0.1.0");
    }

    #[test]
    fn test_sort_descending_in_place() {
        let mut releases = releases(&["0.0.1", "0.0.3", "0.0.2"]);
        releases.sort_descending();
        let sorted: Vec<String> = releases.iter().map(Release::label).collect();
        assert_eq!(sorted, vec!["0.0.3", "0.0.2", "0.0.1"]);
    }

    #[test]
    fn test_get_release() {
        let mut releases = releases(&["0.0.1", "0.0.2"]);
        assert_eq!(releases.get_release("0.0.2").unwrap().label(), "0.0.2");
        assert!(releases.get_release("0.0.3").is_none());
        assert!(releases.get_release("garbage").is_none());

        releases
            .get_release_mut("0.0.1")
            .unwrap()
            .set_yanked(true);
        assert!(releases.get_release("0.0.1").unwrap().is_yanked());
    }

    #[test]
    fn test_create_release_duplicate() {
        let mut releases = releases(&["1.0.0"]);
        let err = releases.create_release("1.0.0", "2021-06-01").unwrap_err();
        assert_eq!(err.to_string(), "version 1.0.0 already exists");
        assert_eq!(releases.len(), 1);
    }

    #[test]
    fn test_create_release_validates_inputs() {
        let mut releases = Releases::new();
        assert!(matches!(
            releases.create_release("1.0.0", "2021-13-01"),
            Err(ChangelogError::InvalidDateFormat { .. })
        ));
        assert!(matches!(
            releases.create_release("1.0.0", "May 19"),
            Err(ChangelogError::InvalidDate { .. })
        ));
        assert!(matches!(
            releases.create_release("1.0", "2021-05-19"),
            Err(ChangelogError::InvalidVersion { .. })
        ));
        assert!(releases.is_empty());

        let release = releases.create_release("1.0.0", "2021-05-19").unwrap();
        assert!(release.changes().is_none());
        assert_eq!(release.date().unwrap().to_string(), "2021-05-19");
    }

    #[test]
    fn test_create_release_with_invalid_url_adds_nothing() {
        let mut releases = Releases::new();
        let err = releases
            .create_release_with_url("1.0.0", "2021-05-19", "not a url")
            .unwrap_err();
        assert!(matches!(err, ChangelogError::InvalidUrl { .. }));
        assert!(releases.is_empty());

        let release = releases
            .create_release_with_url("1.0.0", "2021-05-19", "https://example.com/v1.0.0")
            .unwrap();
        assert_eq!(release.url(), Some("https://example.com/v1.0.0"));
    }
}

//! Validation of mutator inputs

use chrono::NaiveDate;
use chronicle_core::{ChangelogError, ChangelogResult};
use semver::Version;

use crate::grammar::{
    DATE_FORMAT, DATE_FORMAT_DISPLAY, DATE_LINE, DATE_PATTERN, SEMVER_LINE, SEMVER_PATTERN,
};

/// Parse a Semantic Versioning 2.0.0 version
pub fn parse_version(version: &str) -> ChangelogResult<Version> {
    let invalid = || ChangelogError::InvalidVersion {
        version: version.to_string(),
        pattern: SEMVER_PATTERN,
    };

    if !SEMVER_LINE.is_match(version) {
        return Err(invalid());
    }
    Version::parse(version).map_err(|_| invalid())
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_date(date: &str) -> ChangelogResult<NaiveDate> {
    if !DATE_LINE.is_match(date) {
        return Err(ChangelogError::InvalidDate {
            date: date.to_string(),
            pattern: DATE_PATTERN,
        });
    }

    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| ChangelogError::InvalidDateFormat {
        date: date.to_string(),
        format: DATE_FORMAT_DISPLAY,
    })
}

/// Check that a string is an absolute URL
pub fn validate_url(link: &str) -> ChangelogResult<()> {
    url::Url::parse(link)
        .map(|_| ())
        .map_err(|e| ChangelogError::InvalidUrl {
            url: link.to_string(),
            reason: e.to_string(),
        })
}

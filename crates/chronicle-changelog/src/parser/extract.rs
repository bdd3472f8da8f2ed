//! Second parser pass: building the document from located margins

use chrono::NaiveDate;
use semver::Version;
use tracing::{debug, warn};

use super::margins::Margins;
use crate::grammar::{self, LinkTarget, DATE_FORMAT};
use crate::releases::Releases;
use crate::types::{Category, Changelog, Changes, Release};

/// Extracts a [`Changelog`] from a line buffer and its margins
pub(crate) struct Extractor<'a, S: AsRef<str>> {
    buffer: &'a [S],
    margins: Margins,
    boundaries: Vec<usize>,
}

impl<'a, S: AsRef<str>> Extractor<'a, S> {
    pub(crate) fn new(buffer: &'a [S]) -> Self {
        let margins = Margins::identify(buffer);
        let boundaries = margins.boundaries();
        debug!(
            lines = buffer.len(),
            margins = margins.lines.len(),
            releases = margins.releases.len(),
            links = margins.links.len(),
            "margins identified"
        );

        Self {
            buffer,
            margins,
            boundaries,
        }
    }

    pub(crate) fn extract(&self) -> Changelog {
        Changelog {
            title: self.parse_title(),
            description: self.parse_description(),
            unreleased: self.parse_unreleased(),
            releases: self.parse_releases(),
        }
    }

    fn line(&self, index: usize) -> &'a str {
        self.buffer[index].as_ref()
    }

    fn parse_title(&self) -> Option<String> {
        let line = self.margins.title?;
        grammar::title(self.line(line)).map(str::to_string)
    }

    fn parse_description(&self) -> Option<String> {
        let block = match self.margins.title {
            Some(title) => {
                let end = self.margins.next_margin(title).unwrap_or(self.buffer.len());
                &self.buffer[title + 1..end]
            }
            None => match self.margins.lines.first() {
                // the line right before the first margin is its separator
                Some(&first) if first > 0 => &self.buffer[..first - 1],
                Some(_) => &self.buffer[..0],
                None => self.buffer,
            },
        };

        join_trimmed(block)
    }

    fn parse_unreleased(&self) -> Option<Release> {
        let line = self.margins.unreleased?;

        let url = grammar::unreleased_inline_url(self.line(line))
            .or_else(|| self.link_url(None))
            .map(str::to_string);

        Some(Release {
            url,
            changes: self.parse_changes(line),
            ..Release::unreleased()
        })
    }

    fn parse_releases(&self) -> Releases {
        let mut releases = Releases::new();

        for &line in &self.margins.releases {
            let Some(header) = grammar::version_header(self.line(line)) else {
                continue;
            };
            let Ok(version) = Version::parse(header.version) else {
                debug!(line, version = header.version, "skipping unparseable version header");
                continue;
            };

            let date = NaiveDate::parse_from_str(header.date, DATE_FORMAT).ok();
            if date.is_none() {
                warn!(line, version = header.version, date = header.date, "ignoring invalid release date");
            }

            let url = header
                .url
                .or_else(|| self.link_url(Some(header.version)))
                .map(str::to_string);

            releases.push(Release {
                version: Some(version),
                date,
                yanked: header.yanked,
                url,
                changes: self.parse_changes(line),
            });
        }

        releases
    }

    /// URL of a reference-style link definition for the unreleased slot (`None`) or a version
    fn link_url(&self, version: Option<&str>) -> Option<&'a str> {
        self.margins.links.iter().find_map(|&line| {
            let (target, url) = grammar::link_definition(self.line(line))?;
            match (target, version) {
                (LinkTarget::Unreleased, None) => Some(url),
                (LinkTarget::Version(found), Some(wanted)) if found == wanted => Some(url),
                _ => None,
            }
        })
    }

    /// Last line belonging to the release whose header is at `header`
    fn release_end_line(&self, header: usize) -> usize {
        match self.boundaries.iter().find(|&&n| n > header) {
            Some(&next) => next - 1,
            None => self.buffer.len() - 1,
        }
    }

    fn parse_changes(&self, header: usize) -> Option<Changes> {
        let end = self.release_end_line(header);
        if end <= header {
            return None;
        }

        let starts: Vec<(Category, usize)> = Category::ALL
            .iter()
            .filter_map(|&category| {
                self.margins
                    .category_line(category, header, end)
                    .map(|line| (category, line))
            })
            .collect();

        let mut ordered: Vec<usize> = starts.iter().map(|&(_, line)| line).collect();
        ordered.sort_unstable();

        let notice_end = ordered.first().copied().unwrap_or(end + 1);
        let mut changes = Changes {
            notice: join_trimmed(&self.buffer[header + 1..notice_end]),
            ..Changes::default()
        };

        for (category, start) in starts {
            let stop = ordered
                .iter()
                .find(|&&line| line > start)
                .map_or(end, |&next| next - 1);
            changes.set_entries(category, self.parse_entries(start, stop));
        }

        (!changes.is_empty()).then_some(changes)
    }

    /// Entries between a category header (exclusive) and `stop` (inclusive)
    fn parse_entries(&self, header: usize, stop: usize) -> Vec<String> {
        let mut entries: Vec<Vec<&str>> = Vec::new();

        for line in &self.buffer[header + 1..=stop] {
            let line = line.as_ref();
            if let Some(text) = grammar::entry_text(line) {
                entries.push(vec![text]);
            } else if let Some(current) = entries.last_mut() {
                current.push(line);
            }
        }

        entries
            .iter()
            .filter_map(|lines| join_trimmed(lines.as_slice()))
            .collect()
    }
}

/// Join lines with `\n` after dropping leading and trailing blank lines
pub(crate) fn join_trimmed<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let is_content = |line: &S| !grammar::is_blank(line.as_ref());
    let first = lines.iter().position(is_content)?;
    let last = lines.iter().rposition(is_content)?;

    let joined = lines[first..=last]
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<&str>>()
        .join("\n");
    Some(joined)
}

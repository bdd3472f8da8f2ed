//! First parser pass: locating structural lines

use std::collections::BTreeMap;

use crate::grammar::{self, LineShape};
use crate::types::Category;

/// Indexes of every structural line in a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Margins {
    /// Every recognized line, ascending
    pub lines: Vec<usize>,
    /// Last `# <title>` line, the one the title is read from
    pub title: Option<usize>,
    /// Every `# <title>` line
    pub titles: Vec<usize>,
    /// Last `## [Unreleased]` line, the one the unreleased slot is read from
    pub unreleased: Option<usize>,
    /// Every `## [Unreleased]` line
    pub unreleased_headers: Vec<usize>,
    /// Version header lines
    pub releases: Vec<usize>,
    /// Link definition lines
    pub links: Vec<usize>,
    /// Category header lines, per category
    pub categories: BTreeMap<Category, Vec<usize>>,
}

impl Margins {
    /// Scan a buffer and record the index of every recognized line
    pub fn identify<S: AsRef<str>>(buffer: &[S]) -> Self {
        let mut margins = Self::default();

        for (i, line) in buffer.iter().enumerate() {
            let Some(shape) = grammar::recognize(line.as_ref()) else {
                continue;
            };

            match shape {
                LineShape::Title => {
                    margins.title = Some(i);
                    margins.titles.push(i);
                }
                LineShape::UnreleasedHeader => {
                    margins.unreleased = Some(i);
                    margins.unreleased_headers.push(i);
                }
                LineShape::VersionHeader => margins.releases.push(i),
                LineShape::LinkDefinition => margins.links.push(i),
                LineShape::CategoryHeader(category) => {
                    margins.categories.entry(category).or_default().push(i)
                }
            }

            margins.lines.push(i);
        }

        margins
    }

    /// First margin strictly after `line`
    pub fn next_margin(&self, line: usize) -> Option<usize> {
        self.lines.iter().copied().find(|&n| n > line)
    }

    /// Lines that end a release: titles, unreleased headers, version headers and link definitions
    pub fn boundaries(&self) -> Vec<usize> {
        let mut boundaries: Vec<usize> = self
            .titles
            .iter()
            .chain(self.unreleased_headers.iter())
            .chain(self.releases.iter())
            .chain(self.links.iter())
            .copied()
            .collect();
        boundaries.sort_unstable();
        boundaries
    }

    /// The single header of `category` within `(start, end]`, if there is exactly one
    pub fn category_line(&self, category: Category, start: usize, end: usize) -> Option<usize> {
        let lines = self.categories.get(&category)?;
        let mut within = lines.iter().copied().filter(|&n| n > start && n <= end);

        match (within.next(), within.next()) {
            (Some(line), None) => Some(line),
            _ => None,
        }
    }
}

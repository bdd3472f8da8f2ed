//! Markdown changelog formatter

use tracing::{debug, instrument};

use super::ChangelogFormatter;
use crate::grammar::DATE_FORMAT;
use crate::types::{Changelog, Release};

/// Markdown changelog formatter
///
/// Blocks (title, description, releases, link definitions) are separated by
/// a single blank line. Releases are emitted unreleased first, then by
/// descending version precedence, and links always use the reference style.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    /// Create a new markdown formatter
    pub fn new() -> Self {
        Self
    }

    /// Format a single release block, without a trailing newline
    pub fn format_release(&self, release: &Release) -> String {
        let mut output = match (release.version(), release.date()) {
            (None, _) => "## [Unreleased]".to_string(),
            (Some(version), None) => format!("## [{}]", version),
            (Some(version), Some(date)) => {
                format!("## [{}] - {}", version, date.format(DATE_FORMAT))
            }
        };

        if release.is_yanked() {
            output.push_str(" [YANKED]");
        }

        let Some(changes) = release.changes() else {
            return output;
        };

        if let Some(notice) = changes.notice() {
            output.push_str("\n\n");
            output.push_str(notice);
        }

        for (category, entries) in changes.categories() {
            output.push_str(&format!("\n\n### {}\n", category.heading()));
            for entry in entries {
                output.push_str(&format!("\n- {}", entry));
            }
        }

        output
    }
}

impl ChangelogFormatter for MarkdownFormatter {
    #[instrument(skip(self, changelog), fields(release_count = changelog.releases().len()))]
    fn format(&self, changelog: &Changelog) -> String {
        let mut blocks: Vec<String> = Vec::new();
        let mut links: Vec<String> = Vec::new();

        if let Some(title) = changelog.title() {
            blocks.push(format!("# {}", title));
        }

        if let Some(description) = changelog.description() {
            blocks.push(description.to_string());
        }

        let releases = changelog
            .unreleased()
            .into_iter()
            .chain(changelog.releases().sorted());

        for release in releases {
            blocks.push(self.format_release(release));
            if let Some(url) = release.url() {
                links.push(format!("[{}]: {}", release.label(), url));
            }
        }

        if !links.is_empty() {
            blocks.push(links.join("\n"));
        }

        if blocks.is_empty() {
            return String::new();
        }

        let mut output = blocks.join("\n\n");
        output.push('\n');

        debug!(output_len = output.len(), link_count = links.len(), "markdown changelog formatted");
        output
    }
}

use autospec_utils::date::CommitDate;

use crate::items::commitlog_to_changelog_items;
use crate::wrap::wrap_item;

/// Prefix for items that report a problem instead of describing a change.
pub const ERROR_PREFIX: &str = "RPMAUTOSPEC: ";

/// A changelog entry produced from one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedEntry {
    /// Commit time in the commit's own timezone.
    pub timestamp: CommitDate,
    /// `Name <email>` of the author.
    pub authorblurb: String,
    pub epoch_version: Option<String>,
    pub release_complete: Option<String>,
    /// The full commit message.
    pub commitlog: String,
    /// Problems to report in place of the commit message items.
    pub error: Option<Vec<String>>,
}

/// One entry of an RPM `%changelog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogEntry {
    /// Text carried over unchanged from a pre-existing changelog.
    Verbatim(String),
    Generated(GeneratedEntry),
}

impl GeneratedEntry {
    /// The `* <day> <blurb>[ - <evr>]` header line.
    pub fn header(&self) -> String {
        let mut header = format!("* {} {}", self.timestamp.changelog_day(), self.authorblurb);
        if let Some(ev) = &self.epoch_version {
            header.push_str(" - ");
            header.push_str(ev);
            if let Some(rel) = &self.release_complete {
                header.push('-');
                header.push_str(rel);
            }
        }
        header
    }

    /// The item texts of this entry, before wrapping and escaping.
    pub fn items(&self) -> Vec<String> {
        match &self.error {
            Some(details) => details
                .iter()
                .map(|d| format!("{}{}", ERROR_PREFIX, d))
                .collect(),
            None => commitlog_to_changelog_items(&self.commitlog),
        }
    }

    /// Render header and wrapped items.
    pub fn format(&self) -> String {
        let mut lines = vec![self.header()];
        for item in self.items() {
            lines.extend(wrap_item(&escape_macros(&item)));
        }
        lines.join("\n")
    }
}

impl ChangelogEntry {
    /// Render the entry as RPM changelog text, without a trailing newline.
    pub fn format(&self) -> String {
        match self {
            ChangelogEntry::Verbatim(data) => data.trim_end().to_string(),
            ChangelogEntry::Generated(entry) => entry.format(),
        }
    }
}

/// Double `%` so rpm does not expand macros inside changelog text.
pub fn escape_macros(text: &str) -> String {
    text.replace('%', "%%")
}

/// Render entries accumulated oldest first as a changelog, newest first,
/// separated by blank lines and ending with a newline.
pub fn render(entries: &[ChangelogEntry]) -> String {
    let mut out = entries
        .iter()
        .rev()
        .map(ChangelogEntry::format)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

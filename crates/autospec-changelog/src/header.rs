use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use autospec_utils::date::parse_changelog_day;

use crate::ChangelogError;

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\*\s+(?P<day>\S+\s+\S+\s+\S+\s+\S+)\s+(?P<blurb>.+?)(?:\s+-\s+(?P<ev>[^\s-]+)(?:-(?P<rel>[^\s-]+))?)?\s*$",
        )
        .expect("valid changelog header regex")
    })
}

/// The parsed `* <day> <blurb>[ - <evr>]` line that opens a changelog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogHeader {
    pub day: NaiveDate,
    pub authorblurb: String,
    pub epoch_version: Option<String>,
    pub release_complete: Option<String>,
}

impl ChangelogHeader {
    /// Parse a header line.
    pub fn parse(line: &str) -> Result<Self, ChangelogError> {
        let caps = header_re()
            .captures(line.trim_end())
            .ok_or_else(|| ChangelogError::InvalidHeader(line.to_string()))?;

        let day = parse_changelog_day(&caps["day"])?;
        Ok(Self {
            day,
            authorblurb: caps["blurb"].to_string(),
            epoch_version: caps.name("ev").map(|m| m.as_str().to_string()),
            release_complete: caps.name("rel").map(|m| m.as_str().to_string()),
        })
    }

    /// The full `[epoch:]version-release` string, if any.
    pub fn evr(&self) -> Option<String> {
        let ev = self.epoch_version.as_ref()?;
        Some(match &self.release_complete {
            Some(rel) => format!("{}-{}", ev, rel),
            None => ev.clone(),
        })
    }
}

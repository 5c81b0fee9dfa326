use std::sync::OnceLock;

use regex::Regex;

fn bracketed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[(.*)\]\s*$").expect("valid bracket regex"))
}

fn skip_changelog_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^skip\s+changelog$").expect("valid skip regex"))
}

fn bump_release_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^bump\s+release\s*:?\s*(\d+)$").expect("valid bump regex")
    })
}

/// Control annotations found in a commit message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MagicCommentResult {
    /// `[skip changelog]`: the commit gets no changelog entry.
    pub skip_changelog: bool,
    /// `[bump release: N]`: lowest release number for the commit, 0 if unset.
    pub bump_release: u32,
}

impl MagicCommentResult {
    /// Scan every fully bracketed line of a commit message.
    ///
    /// Lines look like `[skip changelog, bump release: 5]`. Unknown parts are
    /// ignored, and the largest bump wins.
    pub fn parse(message: &str) -> Self {
        let mut result = Self::default();

        for line in message.lines() {
            let Some(caps) = bracketed_re().captures(line) else {
                continue;
            };
            for part in caps[1].split(',') {
                let part = part.trim();
                if skip_changelog_re().is_match(part) {
                    result.skip_changelog = true;
                } else if let Some(bump) = bump_release_re().captures(part) {
                    match bump[1].parse::<u32>() {
                        Ok(n) => result.bump_release = result.bump_release.max(n),
                        Err(_) => tracing::debug!(part, "ignoring out of range release bump"),
                    }
                }
            }
        }

        result
    }
}

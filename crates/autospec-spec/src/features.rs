use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::SpecError;

fn autorelease_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*release\s*:\s*%(?:autorelease\b|\{\??autorelease\b)")
            .expect("valid autorelease regex")
    })
}

fn changelog_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^%changelog(?:\s.*)?$").expect("valid changelog regex"))
}

fn autochangelog_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^%(?:autochangelog|\{\??autochangelog\})\s*$")
            .expect("valid autochangelog regex")
    })
}

/// Which automation markers a spec file uses.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecFeatures {
    pub has_autorelease: bool,
    pub has_autochangelog: bool,
    /// Line of the first `%changelog`, `None` if the spec has no changelog section.
    pub changelog_lineno: Option<usize>,
    pub autochangelog_lineno: Option<usize>,
}

impl SpecFeatures {
    /// Scan spec text for `%autorelease`, `%changelog` and `%autochangelog`.
    pub fn detect(text: &str) -> Self {
        Self::detect_lines(text.lines())
    }

    /// Scan an iterator of lines.
    pub fn detect_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut features = SpecFeatures::default();
        let mut looking_for_autochangelog = false;

        for (idx, line) in lines.into_iter().enumerate() {
            let lineno = idx + 1;

            if features.changelog_lineno.is_none() {
                if autorelease_re().is_match(line) {
                    features.has_autorelease = true;
                }
                if changelog_re().is_match(line.trim_end()) {
                    features.changelog_lineno = Some(lineno);
                    looking_for_autochangelog = true;
                }
                continue;
            }

            if looking_for_autochangelog {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if autochangelog_re().is_match(trimmed) {
                    features.has_autochangelog = true;
                    features.autochangelog_lineno = Some(lineno);
                }
                break;
            }
        }

        features
    }

    /// Read and scan a spec file.
    pub fn detect_file(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| SpecError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::detect(&String::from_utf8_lossy(&bytes)))
    }

    /// True when the spec leaves release or changelog to autospec, or has
    /// no changelog section that would need one appended.
    pub fn needs_processing(&self) -> bool {
        self.has_autorelease || self.has_autochangelog || self.changelog_lineno.is_none()
    }
}

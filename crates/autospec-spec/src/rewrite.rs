use std::sync::OnceLock;

use regex::Regex;

use crate::features::SpecFeatures;
use crate::SpecError;

/// First line of the block that defines `%autorelease` in a processed spec.
pub const AUTORELEASE_BLOCK_START: &str = "## START: Set by rpmautospec";
/// Last line of that block.
pub const AUTORELEASE_BLOCK_END: &str = "## END: Set by rpmautospec";

/// The block prepended to a processed spec file so `%autorelease` expands to
/// a fixed release number without autospec installed.
pub fn autorelease_block(release_number: u32, features: &SpecFeatures) -> String {
    let mut used = Vec::new();
    if features.has_autorelease {
        used.push("autorelease");
    }
    if features.has_autochangelog {
        used.push("autochangelog");
    }

    format!(
        "{start}\n\
         ## (autospec version {version})\n\
         ## RPMAUTOSPEC: {used}\n\
         %define autorelease(e:s:pb:n) %{{?-p:0.}}%{{lua:\n\
         \x20   release_number = {number};\n\
         \x20   base_release_number = tonumber(rpm.expand(\"%{{?-b*}}%{{!?-b:1}}\"));\n\
         \x20   print(release_number + base_release_number - 1);\n\
         }}%{{?-e:.%{{-e*}}}}%{{?-s:.%{{-s*}}}}%{{!?-n:%{{?dist}}}}\n\
         {end}\n",
        start = AUTORELEASE_BLOCK_START,
        version = env!("CARGO_PKG_VERSION"),
        used = used.join(", "),
        number = release_number,
        end = AUTORELEASE_BLOCK_END,
    )
}

/// Remove a block left by an earlier processing run.
pub fn strip_autorelease_block(text: &str) -> &str {
    let Some(rest) = text.strip_prefix(AUTORELEASE_BLOCK_START) else {
        return text;
    };
    match rest.find(AUTORELEASE_BLOCK_END) {
        Some(pos) => {
            let after = &rest[pos + AUTORELEASE_BLOCK_END.len()..];
            after.strip_prefix('\n').unwrap_or(after)
        }
        None => text,
    }
}

/// Produce the processed spec text.
///
/// With `%autorelease` the release block is prepended. With
/// `%autochangelog` everything after the `%changelog` line is replaced by
/// `changelog`; a spec without a changelog section gets one appended. A
/// manual changelog is left alone.
pub fn splice_spec(text: &str, release_number: u32, changelog: &str) -> String {
    let text = strip_autorelease_block(text);
    let features = SpecFeatures::detect(text);
    let mut out = String::new();

    if features.has_autorelease {
        out.push_str(&autorelease_block(release_number, &features));
    }

    match (features.has_autochangelog, features.changelog_lineno) {
        (true, Some(lineno)) => {
            for line in text.lines().take(lineno) {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str(changelog);
        }
        (_, None) => {
            out.push_str(text.trim_end());
            out.push_str("\n\n%changelog\n");
            out.push_str(changelog);
        }
        (false, Some(_)) => out.push_str(text),
    }

    out
}

fn release_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(\s*release\s*:\s*)(\S.*?)\s*$").expect("valid release tag regex")
    })
}

/// Which parts of a spec to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    pub release: bool,
    pub changelog: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            release: true,
            changelog: true,
        }
    }
}

/// Result of converting a spec to use autospec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub spec: String,
    /// Former `%changelog` body, to be stored in the `changelog` file.
    pub changelog: Option<String>,
    pub release_converted: bool,
    pub changelog_converted: bool,
}

/// Switch a spec with a literal `Release:` and a manual `%changelog` over
/// to `%autorelease` and `%autochangelog`.
pub fn convert_text(text: &str, options: ConvertOptions) -> Result<Converted, SpecError> {
    let features = SpecFeatures::detect(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);
    let mut release_converted = false;
    let mut changelog = None;
    let mut changelog_converted = false;

    let convert_release = options.release && !features.has_autorelease;
    let convert_changelog = options.changelog && !features.has_autochangelog;

    let body_end = match (convert_changelog, features.changelog_lineno) {
        (true, Some(lineno)) => lineno,
        _ => lines.len(),
    };

    for line in &lines[..body_end] {
        if convert_release && !release_converted {
            if let Some(caps) = release_tag_re().captures(line) {
                out.push(format!("{}%autorelease", &caps[1]));
                release_converted = true;
                continue;
            }
        }
        out.push((*line).to_string());
    }

    if convert_release && !release_converted {
        return Err(SpecError::NoReleaseTag);
    }

    if convert_changelog {
        match features.changelog_lineno {
            Some(lineno) => {
                let body = lines[lineno..].join("\n");
                let body = body.trim();
                if !body.is_empty() {
                    changelog = Some(format!("{}\n", body));
                }
            }
            None => {
                while out.last().is_some_and(|l| l.trim().is_empty()) {
                    out.pop();
                }
                out.push(String::new());
                out.push("%changelog".to_string());
            }
        }
        out.push("%autochangelog".to_string());
        changelog_converted = true;
    }

    let mut spec = out.join("\n");
    spec.push('\n');

    Ok(Converted {
        spec,
        changelog,
        release_converted,
        changelog_converted,
    })
}

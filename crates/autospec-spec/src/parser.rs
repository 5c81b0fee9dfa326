use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};

use autospec_utils::subprocess::ProcessCommand;

/// Environment variable naming the `rpm` executable to query spec files with.
pub const RPM_ENV: &str = "AUTOSPEC_RPM";

const RPM_TIMEOUT: Duration = Duration::from_secs(120);

const QUERY_FORMAT: &str = "%|epoch?{%{epoch}:}:{}|%{version}\\n%{release}\\n";

/// `%autorelease` is redefined to this marker so its flags survive macro
/// expansion: `@AUTORELEASE@<p>@<base>@<extraver>@<snapinfo>@<n>@`.
const AUTORELEASE_MARKER_DEF: &str =
    "autorelease(e:s:pb:n) @AUTORELEASE@%{?-p:p}@%{?-b*}@%{?-e*}@%{?-s*}@%{?-n:n}@";

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"@AUTORELEASE@(p?)@(\d*)@([^@]*)@([^@]*)@(n?)@").expect("valid marker regex")
    })
}

/// Flags given to `%autorelease`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoreleaseFlags {
    /// `-p`: prerelease, prefix the release with `0.`.
    pub prerelease: bool,
    /// `-b <n>`: number of the first release, 1 by default.
    pub base: u32,
    /// `-e <extraver>`
    pub extraver: Option<String>,
    /// `-s <snapinfo>`
    pub snapinfo: Option<String>,
    /// `-n`: leave out `%{?dist}`.
    pub no_dist: bool,
}

impl Default for AutoreleaseFlags {
    fn default() -> Self {
        Self {
            prerelease: false,
            base: 1,
            extraver: None,
            snapinfo: None,
            no_dist: false,
        }
    }
}

impl AutoreleaseFlags {
    /// Expand to the release string for the given release number, without
    /// the dist tag: `[0.]<number + base - 1>[.<extraver>][.<snapinfo>]`.
    pub fn release_complete(&self, number: u32) -> String {
        let mut out = String::new();
        if self.prerelease {
            out.push_str("0.");
        }
        out.push_str(&number.saturating_add(self.base).saturating_sub(1).to_string());
        for extra in [&self.extraver, &self.snapinfo].into_iter().flatten() {
            out.push('.');
            out.push_str(extra);
        }
        out
    }

    fn marker(&self) -> String {
        format!(
            "@AUTORELEASE@{}@{}@{}@{}@{}@",
            if self.prerelease { "p" } else { "" },
            self.base,
            self.extraver.as_deref().unwrap_or(""),
            self.snapinfo.as_deref().unwrap_or(""),
            if self.no_dist { "n" } else { "" },
        )
    }

    fn from_marker(caps: &Captures<'_>) -> Self {
        let non_empty = |i: usize| {
            caps.get(i)
                .map(|m| m.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            prerelease: !caps[1].is_empty(),
            base: caps[2].parse().unwrap_or(1),
            extraver: non_empty(3),
            snapinfo: non_empty(4),
            no_dist: !caps[5].is_empty(),
        }
    }
}

/// What a spec file says about its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecVersion {
    /// `[epoch:]version`
    pub epoch_version: String,
    /// The expanded `Release:` value.
    pub release: String,
    /// Set when the release is computed by `%autorelease`.
    pub autorelease: Option<AutoreleaseFlags>,
}

impl SpecVersion {
    fn from_query(epoch_version: &str, release: &str) -> Self {
        let autorelease = marker_re()
            .captures(release)
            .map(|caps| AutoreleaseFlags::from_marker(&caps));
        Self {
            epoch_version: epoch_version.trim().to_string(),
            release: release.trim().to_string(),
            autorelease,
        }
    }
}

/// A spec file that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct SpecParseError {
    /// What the parser reported, possibly several lines.
    pub detail: String,
}

impl SpecParseError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// The first non-empty line of the detail.
    pub fn first_line(&self) -> &str {
        self.detail
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
    }
}

/// Expands a spec file found in a directory into its version information.
pub trait SpecParser {
    fn query(&self, dir: &Path, spec_file: &str) -> Result<SpecVersion, SpecParseError>;
}

impl<P: SpecParser + ?Sized> SpecParser for Box<P> {
    fn query(&self, dir: &Path, spec_file: &str) -> Result<SpecVersion, SpecParseError> {
        (**self).query(dir, spec_file)
    }
}

/// Spec parser backed by the `rpm` executable.
#[derive(Debug, Clone)]
pub struct RpmSpecParser {
    program: OsString,
    timeout: Duration,
}

impl Default for RpmSpecParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RpmSpecParser {
    /// Use `$AUTOSPEC_RPM`, or `rpm` from `PATH`.
    pub fn new() -> Self {
        let program = std::env::var_os(RPM_ENV).unwrap_or_else(|| OsString::from("rpm"));
        Self::with_program(program)
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            timeout: RPM_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl SpecParser for RpmSpecParser {
    fn query(&self, dir: &Path, spec_file: &str) -> Result<SpecVersion, SpecParseError> {
        let cmd = ProcessCommand::new(&self.program)
            .arg("--define")
            .arg("_invalid_encoding_terminates_build 0")
            .arg("--define")
            .arg(AUTORELEASE_MARKER_DEF)
            .arg("--define")
            .arg("autochangelog %{nil}")
            .arg("--define")
            .arg(format!("_sourcedir {}", dir.display()))
            .arg("--query")
            .arg("--queryformat")
            .arg(QUERY_FORMAT)
            .arg("--specfile")
            .arg(spec_file)
            .working_dir(dir)
            .timeout(self.timeout);

        let output = cmd
            .run()
            .map_err(|e| SpecParseError::new(format!("error: {}", e)))?;

        if !output.success() {
            let stderr = output.stderr_lossy();
            let detail = if stderr.trim().is_empty() {
                format!("error: rpm exited with {}", output.status)
            } else {
                stderr.trim_end().to_string()
            };
            tracing::debug!(spec = spec_file, status = %output.status, "rpm rejected spec file");
            return Err(SpecParseError::new(detail));
        }

        let stdout = output.stdout_lossy();
        let mut lines = stdout.lines();
        match (lines.next(), lines.next()) {
            (Some(ev), Some(release)) => {
                let version = SpecVersion::from_query(ev, release);
                tracing::debug!(
                    spec = spec_file,
                    epoch_version = %version.epoch_version,
                    autorelease = version.autorelease.is_some(),
                    "queried spec file"
                );
                Ok(version)
            }
            _ => Err(SpecParseError::new(format!(
                "error: unexpected rpm query output: '{}'",
                stdout.trim_end()
            ))),
        }
    }
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(name|epoch|version|release)\s*:\s*(.*?)\s*$").expect("valid tag regex")
    })
}

fn define_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^%(?:global|define)\s+([A-Za-z_][A-Za-z0-9_]*)\s+(.*?)\s*$")
            .expect("valid define regex")
    })
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^%(?:package|description|prep|build|install|check|files|changelog|pre|post|preun|postun)\b",
        )
        .expect("valid section regex")
    })
}

fn macro_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"%\{(\??)([A-Za-z_][A-Za-z0-9_]*)((?:\s[^}]*)?)\}|%([A-Za-z_][A-Za-z0-9_]*)")
            .expect("valid macro regex")
    })
}

/// Spec parser that reads the preamble itself.
///
/// Understands `Name`, `Epoch`, `Version` and `Release` tags, `%global` and
/// `%define` of plain macros, `%{?macro}` and `%autorelease` with its flags.
/// Anything else that looks like a macro is an error. Meant for systems
/// without `rpm` and for tests.
#[derive(Debug, Clone, Default)]
pub struct BuiltinSpecParser;

impl BuiltinSpecParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse spec text directly.
    pub fn parse_text(&self, text: &str) -> Result<SpecVersion, SpecParseError> {
        let mut macros: HashMap<String, String> = HashMap::new();
        let mut tags: HashMap<String, String> = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if section_re().is_match(line) {
                break;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(caps) = define_re().captures(line) {
                let value = expand(&caps[2], &macros)
                    .map_err(|e| SpecParseError::new(format!("error: line {}: {}", idx + 1, e)))?;
                macros.insert(caps[1].to_string(), value);
                continue;
            }
            if let Some(caps) = tag_re().captures(line) {
                let tag = caps[1].to_ascii_lowercase();
                let value = expand(&caps[2], &macros)
                    .map_err(|e| SpecParseError::new(format!("error: line {}: {}", idx + 1, e)))?;
                if tag != "release" {
                    macros.insert(tag.clone(), value.clone());
                }
                tags.entry(tag).or_insert(value);
            }
        }

        let version = tags
            .get("version")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SpecParseError::new("error: Version field must be present in package"))?;
        let release = tags
            .get("release")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SpecParseError::new("error: Release field must be present in package"))?;

        let epoch_version = match tags.get("epoch") {
            Some(epoch) if epoch.chars().all(|c| c.is_ascii_digit()) && !epoch.is_empty() => {
                format!("{}:{}", epoch, version)
            }
            Some(epoch) => {
                return Err(SpecParseError::new(format!(
                    "error: Epoch field must be an unsigned number: {}",
                    epoch
                )))
            }
            None => version.clone(),
        };

        Ok(SpecVersion::from_query(&epoch_version, release))
    }
}

impl SpecParser for BuiltinSpecParser {
    fn query(&self, dir: &Path, spec_file: &str) -> Result<SpecVersion, SpecParseError> {
        let path = dir.join(spec_file);
        let bytes = std::fs::read(&path).map_err(|e| {
            SpecParseError::new(format!("error: Unable to open {}: {}", path.display(), e))
        })?;
        self.parse_text(&String::from_utf8_lossy(&bytes))
    }
}

fn bare_autorelease_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"%autorelease(?:\s|$)").expect("valid autorelease regex"))
}

fn expand(value: &str, macros: &HashMap<String, String>) -> Result<String, String> {
    // Bare `%autorelease` takes the rest of the line as its arguments.
    if let Some(m) = bare_autorelease_re().find(value) {
        let head = expand_macros(&value[..m.start()], macros)?;
        let flags = parse_autorelease_args(&value[m.start() + "%autorelease".len()..])?;
        return Ok(head + &flags.marker());
    }
    expand_macros(value, macros)
}

fn expand_macros(value: &str, macros: &HashMap<String, String>) -> Result<String, String> {
    let mut error = None;
    let expanded = macro_re().replace_all(value, |caps: &Captures<'_>| {
        let (optional, name, args) = match caps.get(2) {
            Some(name) => (!caps[1].is_empty(), name.as_str(), caps[3].trim()),
            None => (false, &caps[4], ""),
        };
        if name == "autorelease" {
            return match parse_autorelease_args(args) {
                Ok(flags) => flags.marker(),
                Err(e) => {
                    error.get_or_insert(e);
                    String::new()
                }
            };
        }
        match macros.get(name) {
            Some(v) => v.clone(),
            None if optional => String::new(),
            None => {
                error.get_or_insert(format!("unresolved macro: {}", &caps[0]));
                String::new()
            }
        }
    });

    match error {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn parse_autorelease_args(args: &str) -> Result<AutoreleaseFlags, String> {
    let mut flags = AutoreleaseFlags::default();
    let mut tokens = args.split_whitespace();

    while let Some(token) = tokens.next() {
        let Some(opt) = token.strip_prefix('-') else {
            return Err(format!("%autorelease: unexpected argument '{}'", token));
        };
        let mut chars = opt.chars();
        let Some(flag) = chars.next() else {
            return Err("%autorelease: empty option".to_string());
        };
        let attached = chars.as_str();

        match flag {
            'p' if attached.is_empty() => flags.prerelease = true,
            'n' if attached.is_empty() => flags.no_dist = true,
            'b' | 'e' | 's' => {
                let value = if attached.is_empty() {
                    tokens
                        .next()
                        .ok_or_else(|| format!("%autorelease: option -{} needs a value", flag))?
                } else {
                    attached
                };
                match flag {
                    'b' => {
                        flags.base = value.parse().map_err(|_| {
                            format!("%autorelease: -b needs a number, got '{}'", value)
                        })?
                    }
                    'e' => flags.extraver = Some(value.to_string()),
                    _ => flags.snapinfo = Some(value.to_string()),
                }
            }
            _ => return Err(format!("%autorelease: unknown option '{}'", token)),
        }
    }

    Ok(flags)
}

use autospec_history::CHANGELOG_FILE;
use autospec_spec::{BuiltinSpecParser, RpmSpecParser, SpecParser};

/// Which spec parser to query historical spec files with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParserKind {
    /// The `rpm` executable, honouring `AUTOSPEC_RPM`.
    #[default]
    Rpm,
    /// The text parser, for systems without `rpm`.
    Builtin,
}

impl ParserKind {
    pub fn parser(self) -> Box<dyn SpecParser> {
        match self {
            ParserKind::Rpm => Box::new(RpmSpecParser::new()),
            ParserKind::Builtin => Box::new(BuiltinSpecParser::new()),
        }
    }
}

/// Settings shared by the dist-git operations.
#[derive(Debug, Clone)]
pub struct DistgitOptions {
    pub parser: ParserKind,
    /// Account for uncommitted changes in the package directory.
    pub include_uncommitted: bool,
    /// Fail when the current spec file cannot be parsed.
    pub strict: bool,
    /// File holding changelog entries from before autospec.
    pub changelog_file: String,
}

impl Default for DistgitOptions {
    fn default() -> Self {
        Self {
            parser: ParserKind::default(),
            include_uncommitted: true,
            strict: false,
            changelog_file: CHANGELOG_FILE.to_string(),
        }
    }
}

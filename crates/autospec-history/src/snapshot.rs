use std::collections::HashMap;
use std::rc::Rc;

use tempfile::TempDir;

use autospec_spec::{SpecParseError, SpecParser, SpecVersion};

use crate::Result;

/// The spec file as found in one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecSnapshot {
    /// No spec file in this commit.
    Absent,
    Parsed(SpecVersion),
    Unparseable { detail: String },
}

impl SpecSnapshot {
    pub fn epoch_version(&self) -> Option<&str> {
        match self {
            SpecSnapshot::Parsed(v) => Some(&v.epoch_version),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SpecSnapshot::Absent)
    }

    pub fn parse_error(&self) -> Option<SpecParseError> {
        match self {
            SpecSnapshot::Unparseable { detail } => Some(SpecParseError::new(detail.clone())),
            _ => None,
        }
    }
}

/// Parses historical spec files in a scratch directory, once per distinct
/// spec content.
pub(crate) struct SnapshotLoader<'p> {
    parser: &'p dyn SpecParser,
    spec_file: String,
    workdir: TempDir,
    cache: HashMap<Vec<u8>, Rc<SpecSnapshot>>,
    absent: Rc<SpecSnapshot>,
}

impl<'p> SnapshotLoader<'p> {
    pub(crate) fn new(parser: &'p dyn SpecParser, spec_file: impl Into<String>) -> Result<Self> {
        Ok(Self {
            parser,
            spec_file: spec_file.into(),
            workdir: tempfile::Builder::new().prefix("autospec-").tempdir()?,
            cache: HashMap::new(),
            absent: Rc::new(SpecSnapshot::Absent),
        })
    }

    pub(crate) fn load(&mut self, contents: Option<Vec<u8>>) -> Result<Rc<SpecSnapshot>> {
        let Some(contents) = contents else {
            return Ok(Rc::clone(&self.absent));
        };
        if let Some(cached) = self.cache.get(&contents) {
            return Ok(Rc::clone(cached));
        }

        let dir = self.workdir.path();
        std::fs::write(dir.join(&self.spec_file), &contents)?;

        let snapshot = match self.parser.query(dir, &self.spec_file) {
            Ok(version) => SpecSnapshot::Parsed(version),
            Err(err) => {
                tracing::warn!(spec = %self.spec_file, error = err.first_line(), "spec file can't be parsed");
                SpecSnapshot::Unparseable { detail: err.detail }
            }
        };

        let snapshot = Rc::new(snapshot);
        self.cache.insert(contents, Rc::clone(&snapshot));
        Ok(snapshot)
    }
}

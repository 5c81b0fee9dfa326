use std::path::{Path, PathBuf};

use crate::{HistoryError, Result};

/// A package directory and the name of its spec file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePath {
    /// Directory holding the spec file.
    pub dir: PathBuf,
    /// Package name, the spec file name without `.spec`.
    pub name: String,
}

impl PackagePath {
    /// Resolve a package directory or a spec file path.
    ///
    /// A directory must contain `<dirname>.spec`; a file must have the
    /// `.spec` extension.
    pub fn resolve(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HistoryError::PathNotFound(path.to_path_buf()));
        }
        let path = path.canonicalize()?;

        let (dir, name) = if path.is_dir() {
            let name = file_name(&path)?;
            (path, name)
        } else {
            if path.extension().and_then(|e| e.to_str()) != Some("spec") {
                return Err(HistoryError::NotASpecFile(path));
            }
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| HistoryError::NotASpecFile(path.clone()))?;
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| HistoryError::NotASpecFile(path.clone()))?;
            (dir, name)
        };

        let package = Self { dir, name };
        let spec = package.spec_path();
        if !spec.is_file() {
            return Err(HistoryError::MissingSpec(spec));
        }
        Ok(package)
    }

    /// `<name>.spec`
    pub fn spec_file_name(&self) -> String {
        format!("{}.spec", self.name)
    }

    pub fn spec_path(&self) -> PathBuf {
        self.dir.join(self.spec_file_name())
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| HistoryError::PathNotFound(path.to_path_buf()))
}

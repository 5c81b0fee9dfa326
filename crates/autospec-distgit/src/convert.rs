use std::path::{Path, PathBuf};

use autospec_history::PackagePath;
use autospec_spec::{convert_text, ConvertOptions, SpecError};
use autospec_utils::lockfile::write_atomically;

use crate::{DistgitError, DistgitOptions, Result};

/// What [`convert`] changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub release_converted: bool,
    pub changelog_converted: bool,
    /// Where the former `%changelog` body went, if there was one.
    pub changelog_file: Option<PathBuf>,
}

/// Switch the spec file of the package at `path` to `%autorelease` and
/// `%autochangelog`, moving a manual changelog into the changelog file.
///
/// Only the working tree is changed; committing is left to the user.
pub fn convert(
    path: impl AsRef<Path>,
    what: ConvertOptions,
    options: &DistgitOptions,
) -> Result<ConvertOutcome> {
    let package = PackagePath::resolve(path)?;
    let spec_path = package.spec_path();
    let data = std::fs::read(&spec_path).map_err(|e| SpecError::Read {
        path: spec_path.clone(),
        source: e,
    })?;
    let converted = convert_text(&String::from_utf8_lossy(&data), what)?;

    if !converted.release_converted && !converted.changelog_converted {
        return Err(DistgitError::NothingToConvert(spec_path));
    }

    let changelog_file = match &converted.changelog {
        Some(text) => {
            let path = package.dir.join(&options.changelog_file);
            if path.exists() {
                return Err(DistgitError::ChangelogFileExists(path));
            }
            write_atomically(&path, text.as_bytes())?;
            Some(path)
        }
        None => None,
    };
    write_atomically(&spec_path, converted.spec.as_bytes())?;

    tracing::debug!(
        spec = %spec_path.display(),
        release = converted.release_converted,
        changelog = converted.changelog_converted,
        "converted spec file"
    );
    Ok(ConvertOutcome {
        release_converted: converted.release_converted,
        changelog_converted: converted.changelog_converted,
        changelog_file,
    })
}

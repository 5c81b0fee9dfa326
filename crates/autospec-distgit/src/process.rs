use std::path::Path;

use autospec_history::{PackagePath, Visitor};
use autospec_spec::{splice_spec, SpecError, SpecFeatures};
use autospec_utils::lockfile::write_atomically;

use crate::session::Session;
use crate::{DistgitOptions, Result};

/// Render the changelog of the package at `path`, newest entry first.
pub fn generate_changelog(path: impl AsRef<Path>, options: &DistgitOptions) -> Result<String> {
    let session = Session::open(path.as_ref(), options)?;
    let run = session.run(&[Visitor::ReleaseNumber, Visitor::Changelog])?;
    Ok(run
        .result
        .changelog
        .map(|chain| chain.render())
        .unwrap_or_default())
}

/// Rewrite the spec file of the package at `path` so it builds without
/// autospec, into `target` or in place.
///
/// Returns false without writing anything when the spec file uses neither
/// `%autorelease` nor `%autochangelog` and keeps its own changelog.
pub fn process_distgit(
    path: impl AsRef<Path>,
    target: Option<&Path>,
    options: &DistgitOptions,
) -> Result<bool> {
    let package = PackagePath::resolve(path)?;
    let spec_path = package.spec_path();
    let data = std::fs::read(&spec_path).map_err(|e| SpecError::Read {
        path: spec_path.clone(),
        source: e,
    })?;
    let text = String::from_utf8_lossy(&data);

    let features = SpecFeatures::detect(&text);
    if !features.needs_processing() {
        tracing::debug!(spec = %spec_path.display(), "spec file needs no processing");
        return Ok(false);
    }

    let wants_changelog = features.has_autochangelog || features.changelog_lineno.is_none();
    let visitors: &[Visitor] = if wants_changelog {
        &[Visitor::ReleaseNumber, Visitor::Changelog]
    } else {
        &[Visitor::ReleaseNumber]
    };

    let session = Session::for_package(package, options)?;
    let run = session.run(visitors)?;
    let release_number = run.result.release.release_number.max(1);
    let changelog = run
        .result
        .changelog
        .map(|chain| chain.render())
        .unwrap_or_default();

    let processed = splice_spec(&text, release_number, &changelog);
    let target = target.unwrap_or(spec_path.as_path());
    write_atomically(target, processed.as_bytes())?;

    tracing::debug!(
        spec = %spec_path.display(),
        target = %target.display(),
        release = release_number,
        "processed spec file"
    );
    Ok(true)
}

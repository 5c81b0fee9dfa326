use std::path::Path;

use autospec_history::Visitor;
use autospec_spec::{AutoreleaseFlags, SpecParseError};

use crate::session::Session;
use crate::{DistgitOptions, Result};

/// The release of the current state of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Never below 1.
    pub number: u32,
    /// The release as `%autorelease` expands it, without dist tag.
    pub complete: String,
    pub epoch_version: Option<String>,
    /// Why the current spec file could not be parsed, outside strict mode.
    pub error: Option<SpecParseError>,
}

/// Compute the release number of the package at `path`, a package
/// directory or its spec file.
pub fn calculate_release(path: impl AsRef<Path>, options: &DistgitOptions) -> Result<Release> {
    let session = Session::open(path.as_ref(), options)?;
    let run = session.run(&[Visitor::ReleaseNumber])?;
    let info = run.result.release;

    let number = info.release_number.max(1);
    let complete = match info.release_complete {
        Some(complete) if info.release_number > 0 => complete,
        _ => AutoreleaseFlags::default().release_complete(number),
    };
    tracing::debug!(
        package = %session.package.name,
        number,
        complete = %complete,
        "calculated release"
    );

    Ok(Release {
        number,
        complete,
        epoch_version: info.epoch_version,
        error: run.error,
    })
}

//! Operations on a dist-git package checkout.
//!
//! These are the entry points the command line uses: compute the release
//! number, render the changelog, rewrite a spec file for building without
//! autospec installed, and convert a spec file to use autospec.

mod convert;
mod options;
mod process;
mod release;
mod session;

pub use convert::{convert, ConvertOutcome};
pub use options::{DistgitOptions, ParserKind};
pub use process::{generate_changelog, process_distgit};
pub use release::{calculate_release, Release};

use std::path::PathBuf;

use autospec_git::GitError;
use autospec_history::HistoryError;
use autospec_spec::SpecError;
use autospec_utils::UtilError;

/// Errors from dist-git operations.
#[derive(Debug, thiserror::Error)]
pub enum DistgitError {
    /// The current spec file cannot be parsed and strict mode is on.
    #[error("unable to parse spec file '{path}':\n{detail}")]
    SpecParse { path: PathBuf, detail: String },

    #[error("changelog file already exists: {0}")]
    ChangelogFileExists(PathBuf),

    #[error("nothing to convert in '{0}'")]
    NothingToConvert(PathBuf),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Util(#[from] UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DistgitError>;

//! Release numbers and changelogs derived from commit history.
//!
//! [`HistoryProcessor`] walks the commits of a package from a starting
//! commit towards the root, looks at the spec file and the commit message
//! of each commit, and computes per commit the release number and the
//! changelog as it stood at that point. The walk only descends into parents
//! that can still influence the result.

mod changelog;
mod magic;
mod overlay;
mod package;
mod processor;
mod release;
mod repository;
mod snapshot;
mod visitor;

pub use changelog::{ChangelogChain, ChangelogRecord, CHANGELOG_FILE};
pub use magic::MagicCommentResult;
pub use overlay::{UncommittedOverlay, UNCOMMITTED_ID};
pub use package::PackagePath;
pub use processor::{CommitResult, HistoryProcessor, ProcessorOptions, RunResult};
pub use release::ReleaseInfo;
pub use repository::{CommitId, CommitInfo, VcsRepository};
pub use snapshot::SpecSnapshot;
pub use visitor::Visitor;

use std::path::PathBuf;

/// Errors produced while setting up or walking history.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("not a spec file: {0}")]
    NotASpecFile(PathBuf),

    #[error("spec file is missing: {0}")]
    MissingSpec(PathBuf),

    #[error("invalid revision: {0}")]
    InvalidRevision(String),

    #[error("commit not found: {0}")]
    CommitNotFound(CommitId),

    #[error("commit graph has a cycle through {0}")]
    Cycle(CommitId),

    #[error("repository error: {0}")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HistoryError {
    /// Wrap an error from a repository backend.
    pub fn repository(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        HistoryError::Repository(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;

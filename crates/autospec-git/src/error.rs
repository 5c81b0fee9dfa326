use std::path::PathBuf;

use autospec_history::HistoryError;

/// Errors from git repository access.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("not a git repository (or any of the parent directories): {0}")]
    NotFound(PathBuf),

    #[error("bare repository has no working tree: {0}")]
    BareRepository(PathBuf),

    #[error("'{path}' is outside the working tree '{workdir}'")]
    OutsideWorkTree { path: PathBuf, workdir: PathBuf },

    #[error("invalid object id: {0}")]
    InvalidId(String),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<GitError> for HistoryError {
    fn from(err: GitError) -> Self {
        HistoryError::repository(err)
    }
}

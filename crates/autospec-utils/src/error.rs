use std::path::PathBuf;

/// Errors from the shared utilities.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("invalid date: {0}")]
    DateParse(String),

    #[error("failed to run '{command}': {source}")]
    Subprocess {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' did not finish in time")]
    SubprocessTimeout { command: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a file could not be replaced through its lock file.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another writer is active, or an earlier run died and left the lock behind.
    #[error("'{path}' exists, is another autospec running?")]
    AlreadyLocked { path: PathBuf },

    #[error("cannot create '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot move '{path}' into place: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

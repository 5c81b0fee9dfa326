//! Read commit history of a dist-git package through libgit2.

mod error;
mod repo;

pub use error::GitError;
pub use repo::GitRepository;

pub type Result<T> = std::result::Result<T, GitError>;

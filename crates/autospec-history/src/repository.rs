use std::fmt;

use autospec_utils::Signature;

use crate::Result;

/// Opaque identifier of a commit, usually a hex object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(String);

impl CommitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for logs.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(7) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What the history walk needs to know about a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: CommitId,
    /// Parents in commit order, empty for a root commit.
    pub parents: Vec<CommitId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl CommitInfo {
    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// Read access to the history of one package.
///
/// File paths are relative to the package directory, so a package living
/// in a subdirectory of a repository reads `foo.spec` rather than
/// `packages/foo/foo.spec`.
pub trait VcsRepository {
    /// The commit checked out.
    fn head(&self) -> Result<CommitId>;

    /// Resolve a revision such as a branch, tag or commit id.
    fn resolve(&self, rev: &str) -> Result<CommitId>;

    fn commit(&self, id: &CommitId) -> Result<CommitInfo>;

    /// Contents of a file at the given commit, `None` if it does not exist there.
    fn read_file(&self, id: &CommitId, path: &str) -> Result<Option<Vec<u8>>>;
}

impl<R: VcsRepository + ?Sized> VcsRepository for Box<R> {
    fn head(&self) -> Result<CommitId> {
        (**self).head()
    }

    fn resolve(&self, rev: &str) -> Result<CommitId> {
        (**self).resolve(rev)
    }

    fn commit(&self, id: &CommitId) -> Result<CommitInfo> {
        (**self).commit(id)
    }

    fn read_file(&self, id: &CommitId, path: &str) -> Result<Option<Vec<u8>>> {
        (**self).read_file(id, path)
    }
}

impl<R: VcsRepository + ?Sized> VcsRepository for &R {
    fn head(&self) -> Result<CommitId> {
        (**self).head()
    }

    fn resolve(&self, rev: &str) -> Result<CommitId> {
        (**self).resolve(rev)
    }

    fn commit(&self, id: &CommitId) -> Result<CommitInfo> {
        (**self).commit(id)
    }

    fn read_file(&self, id: &CommitId, path: &str) -> Result<Option<Vec<u8>>> {
        (**self).read_file(id, path)
    }
}

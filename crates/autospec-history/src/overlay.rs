use std::io;
use std::path::PathBuf;

use autospec_utils::Signature;

use crate::repository::{CommitId, CommitInfo, VcsRepository};
use crate::Result;

/// Id of the synthetic commit holding uncommitted changes.
pub const UNCOMMITTED_ID: &str = "0000000000000000000000000000000000000000-worktree";

const UNCOMMITTED_MESSAGE: &str = "Uncommitted changes";

/// A repository with a synthetic commit on top of HEAD whose files come
/// from the working tree.
///
/// Lets release and changelog reflect local edits before they are
/// committed. Everything below HEAD is read from the wrapped repository.
pub struct UncommittedOverlay<R> {
    inner: R,
    package_dir: PathBuf,
    signature: Signature,
    id: CommitId,
}

impl<R: VcsRepository> UncommittedOverlay<R> {
    /// `package_dir` is the working tree directory of the package, and
    /// `signature` the identity and time to attribute the changes to.
    pub fn new(inner: R, package_dir: impl Into<PathBuf>, signature: Signature) -> Self {
        Self {
            inner,
            package_dir: package_dir.into(),
            signature,
            id: CommitId::new(UNCOMMITTED_ID),
        }
    }

    fn is_overlay(&self, id: &CommitId) -> bool {
        *id == self.id
    }
}

impl<R: VcsRepository> VcsRepository for UncommittedOverlay<R> {
    fn head(&self) -> Result<CommitId> {
        Ok(self.id.clone())
    }

    fn resolve(&self, rev: &str) -> Result<CommitId> {
        if rev == "HEAD" || rev == self.id.as_str() {
            return Ok(self.id.clone());
        }
        self.inner.resolve(rev)
    }

    fn commit(&self, id: &CommitId) -> Result<CommitInfo> {
        if !self.is_overlay(id) {
            return self.inner.commit(id);
        }
        let parents = match self.inner.head() {
            Ok(head) => vec![head],
            Err(err) => {
                tracing::debug!(error = %err, "no HEAD below uncommitted changes");
                Vec::new()
            }
        };
        Ok(CommitInfo {
            id: self.id.clone(),
            parents,
            author: self.signature.clone(),
            committer: self.signature.clone(),
            message: UNCOMMITTED_MESSAGE.to_string(),
        })
    }

    fn read_file(&self, id: &CommitId, path: &str) -> Result<Option<Vec<u8>>> {
        if !self.is_overlay(id) {
            return self.inner.read_file(id, path);
        }
        match std::fs::read(self.package_dir.join(path)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use git2::{ErrorCode, ObjectType, Oid, Repository, Status, StatusOptions};

use autospec_history::{CommitId, CommitInfo, HistoryError, VcsRepository};
use autospec_utils::{CommitDate, Signature};

use crate::{GitError, Result};

/// A package directory inside a git working tree.
///
/// File paths handed to [`VcsRepository::read_file`] are relative to the
/// package directory, which need not be the top of the working tree.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
    /// Package directory relative to `workdir`, empty at the top.
    prefix: PathBuf,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("workdir", &self.workdir)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl GitRepository {
    /// Open the repository containing `package_dir`, searching upwards.
    pub fn open(package_dir: impl AsRef<Path>) -> Result<Self> {
        let package_dir = package_dir.as_ref();
        let package_dir = std::fs::canonicalize(package_dir)
            .map_err(|_| GitError::NotFound(package_dir.to_path_buf()))?;

        let repo = Repository::discover(&package_dir).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::NotFound(package_dir.clone()),
            _ => GitError::Git(e),
        })?;
        let workdir = match repo.workdir() {
            Some(dir) => std::fs::canonicalize(dir)?,
            None => return Err(GitError::BareRepository(repo.path().to_path_buf())),
        };
        let prefix = package_dir
            .strip_prefix(&workdir)
            .map_err(|_| GitError::OutsideWorkTree {
                path: package_dir.clone(),
                workdir: workdir.clone(),
            })?
            .to_path_buf();

        tracing::debug!(workdir = %workdir.display(), prefix = %prefix.display(), "opened repository");
        Ok(Self {
            repo,
            workdir,
            prefix,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// The package directory in the working tree.
    pub fn package_dir(&self) -> PathBuf {
        self.workdir.join(&self.prefix)
    }

    /// Whether files in the package directory differ from HEAD, counting
    /// untracked but not ignored files.
    pub fn has_uncommitted_changes(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);
        if !self.prefix.as_os_str().is_empty() {
            opts.pathspec(self.tree_path(""));
        }
        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .any(|entry| !entry.status().is_empty() && !entry.status().contains(Status::IGNORED)))
    }

    /// The identity configured in git, dated now.
    pub fn default_signature(&self) -> Result<Signature> {
        let sig = self.repo.signature()?;
        Ok(convert_signature(&sig))
    }

    fn tree_path(&self, path: &str) -> String {
        let joined = self.prefix.join(path);
        joined
            .to_string_lossy()
            .trim_end_matches('/')
            .replace('\\', "/")
    }

    fn find_commit(&self, id: &CommitId) -> Result<git2::Commit<'_>> {
        let oid = Oid::from_str(id.as_str()).map_err(|_| GitError::InvalidId(id.to_string()))?;
        Ok(self.repo.find_commit(oid)?)
    }
}

fn convert_signature(sig: &git2::Signature<'_>) -> Signature {
    let when = sig.when();
    Signature::new(
        sig.name_bytes().to_str_lossy().into_owned(),
        sig.email_bytes().to_str_lossy().into_owned(),
        CommitDate::new(when.seconds(), when.offset_minutes()),
    )
}

impl VcsRepository for GitRepository {
    fn head(&self) -> autospec_history::Result<CommitId> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(HistoryError::InvalidRevision("HEAD".into()));
            }
            Err(e) => return Err(GitError::from(e).into()),
        };
        let commit = head.peel_to_commit().map_err(GitError::from)?;
        Ok(CommitId::new(commit.id().to_string()))
    }

    fn resolve(&self, rev: &str) -> autospec_history::Result<CommitId> {
        let commit = self
            .repo
            .revparse_single(rev)
            .and_then(|obj| obj.peel_to_commit())
            .map_err(|e| {
                tracing::debug!(rev, error = %e, "cannot resolve revision");
                HistoryError::InvalidRevision(rev.to_string())
            })?;
        Ok(CommitId::new(commit.id().to_string()))
    }

    fn commit(&self, id: &CommitId) -> autospec_history::Result<CommitInfo> {
        let commit = match self.find_commit(id) {
            Ok(commit) => commit,
            Err(GitError::Git(e)) if e.code() == ErrorCode::NotFound => {
                return Err(HistoryError::CommitNotFound(id.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let info = CommitInfo {
            id: id.clone(),
            parents: commit
                .parent_ids()
                .map(|oid| CommitId::new(oid.to_string()))
                .collect(),
            author: convert_signature(&commit.author()),
            committer: convert_signature(&commit.committer()),
            message: commit.message_bytes().to_str_lossy().into_owned(),
        };
        Ok(info)
    }

    fn read_file(&self, id: &CommitId, path: &str) -> autospec_history::Result<Option<Vec<u8>>> {
        let commit = self.find_commit(id)?;
        let tree = commit.tree().map_err(GitError::from)?;
        let entry = match tree.get_path(Path::new(&self.tree_path(path))) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from(e).into()),
        };
        if entry.kind() != Some(ObjectType::Blob) {
            return Ok(None);
        }
        let blob = self.repo.find_blob(entry.id()).map_err(GitError::from)?;
        Ok(Some(blob.content().to_vec()))
    }
}

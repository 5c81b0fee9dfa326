#![allow(dead_code)]

use std::collections::HashMap;

use autospec_history::{
    CommitId, CommitInfo, HistoryError, HistoryProcessor, Result, VcsRepository,
};
use autospec_spec::BuiltinSpecParser;
use autospec_utils::{CommitDate, Signature};

pub const SPEC: &str = "foo.spec";
pub const BASE_TIME: i64 = 1_700_000_000;

/// An in-memory commit graph with full file snapshots per commit.
#[derive(Default)]
pub struct MemoryRepo {
    commits: HashMap<CommitId, (CommitInfo, HashMap<String, Vec<u8>>)>,
    refs: HashMap<String, CommitId>,
    head: Option<CommitId>,
    clock: i64,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit on top of `parents`, starting from the files of the first
    /// parent and applying `changes` (`None` deletes a file).
    pub fn commit(
        &mut self,
        parents: &[&CommitId],
        message: &str,
        changes: &[(&str, Option<&str>)],
    ) -> CommitId {
        self.clock += 3600;
        let time = BASE_TIME + self.clock;
        self.commit_at(parents, message, changes, time)
    }

    pub fn commit_at(
        &mut self,
        parents: &[&CommitId],
        message: &str,
        changes: &[(&str, Option<&str>)],
        time: i64,
    ) -> CommitId {
        let mut files = parents
            .first()
            .and_then(|p| self.commits.get(*p))
            .map(|(_, files)| files.clone())
            .unwrap_or_default();
        for (path, content) in changes {
            match content {
                Some(text) => {
                    files.insert(path.to_string(), text.as_bytes().to_vec());
                }
                None => {
                    files.remove(*path);
                }
            }
        }

        let id = CommitId::new(format!("{:040x}", self.commits.len() + 1));
        let sig = Signature::new("Packager", "packager@example.com", CommitDate::new(time, 0));
        let info = CommitInfo {
            id: id.clone(),
            parents: parents.iter().map(|p| (*p).clone()).collect(),
            author: sig.clone(),
            committer: sig,
            message: message.to_string(),
        };
        self.commits.insert(id.clone(), (info, files));
        self.head = Some(id.clone());
        id
    }

    /// Insert a commit verbatim, parents need not exist yet.
    pub fn insert_raw(&mut self, info: CommitInfo, files: &[(&str, &str)]) {
        let files = files
            .iter()
            .map(|(p, c)| (p.to_string(), c.as_bytes().to_vec()))
            .collect();
        self.commits.insert(info.id.clone(), (info, files));
    }

    pub fn set_head(&mut self, id: &CommitId) {
        self.head = Some(id.clone());
    }

    pub fn tag(&mut self, name: &str, id: &CommitId) {
        self.refs.insert(name.to_string(), id.clone());
    }
}

impl VcsRepository for MemoryRepo {
    fn head(&self) -> Result<CommitId> {
        self.head
            .clone()
            .ok_or_else(|| HistoryError::InvalidRevision("HEAD".into()))
    }

    fn resolve(&self, rev: &str) -> Result<CommitId> {
        if rev == "HEAD" {
            return self.head();
        }
        if let Some(id) = self.refs.get(rev) {
            return Ok(id.clone());
        }
        let id = CommitId::new(rev);
        if self.commits.contains_key(&id) {
            Ok(id)
        } else {
            Err(HistoryError::InvalidRevision(rev.to_string()))
        }
    }

    fn commit(&self, id: &CommitId) -> Result<CommitInfo> {
        self.commits
            .get(id)
            .map(|(info, _)| info.clone())
            .ok_or_else(|| HistoryError::CommitNotFound(id.clone()))
    }

    fn read_file(&self, id: &CommitId, path: &str) -> Result<Option<Vec<u8>>> {
        let (_, files) = self
            .commits
            .get(id)
            .ok_or_else(|| HistoryError::CommitNotFound(id.clone()))?;
        Ok(files.get(path).cloned())
    }
}

/// A spec using both `%autorelease` and `%autochangelog`.
pub fn spec(version: &str) -> String {
    format!(
        "Name: foo\nVersion: {}\nRelease: %autorelease\nSummary: Foo\n\n%description\nFoo.\n\n%changelog\n%autochangelog\n",
        version
    )
}

/// A spec the builtin parser rejects.
pub fn broken_spec() -> String {
    "Name: foo\nVersion: %{upstream}\nRelease: %autorelease\n".to_string()
}

pub fn processor(repo: MemoryRepo) -> HistoryProcessor<MemoryRepo> {
    HistoryProcessor::new(repo, Box::new(BuiltinSpecParser), SPEC)
}

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use autospec_changelog::{ChangelogEntry, GeneratedEntry};

use crate::magic::MagicCommentResult;
use crate::release::ReleaseInfo;
use crate::repository::{CommitId, CommitInfo};
use crate::snapshot::SpecSnapshot;

/// File next to the spec holding changelog entries from before automation.
pub const CHANGELOG_FILE: &str = "changelog";

/// One changelog entry and the commit it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogRecord {
    pub commit: CommitId,
    /// Committer time, used to order entries from merged branches.
    pub timestamp: i64,
    pub entry: ChangelogEntry,
}

struct Link {
    record: Rc<ChangelogRecord>,
    prev: Option<Rc<Link>>,
    len: usize,
}

impl Drop for Link {
    // Unlink iteratively, long histories would overflow the stack otherwise.
    fn drop(&mut self) {
        let mut next = self.prev.take();
        while let Some(link) = next {
            match Rc::try_unwrap(link) {
                Ok(mut link) => next = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// The changelog as it stands at one commit, oldest entry first.
///
/// Commits on a linear stretch of history share the entries of their
/// parent and add at most one of their own.
#[derive(Clone, Default)]
pub struct ChangelogChain {
    head: Option<Rc<Link>>,
}

impl ChangelogChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |l| l.len)
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// A chain with one more entry on top.
    pub fn push(&self, record: ChangelogRecord) -> Self {
        self.push_rc(Rc::new(record))
    }

    fn push_rc(&self, record: Rc<ChangelogRecord>) -> Self {
        Self {
            head: Some(Rc::new(Link {
                record,
                prev: self.head.clone(),
                len: self.len() + 1,
            })),
        }
    }

    /// Records, oldest first.
    pub fn records(&self) -> Vec<Rc<ChangelogRecord>> {
        let mut out = Vec::with_capacity(self.len());
        let mut cur = self.head.as_deref();
        while let Some(link) = cur {
            out.push(Rc::clone(&link.record));
            cur = link.prev.as_deref();
        }
        out.reverse();
        out
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> Vec<ChangelogEntry> {
        self.records().iter().map(|r| r.entry.clone()).collect()
    }

    /// Rendered `%changelog` body, newest entry first.
    pub fn render(&self) -> String {
        autospec_changelog::render(&self.entries())
    }

    /// Combine the changelogs of merged branches.
    ///
    /// Entries reachable through several parents appear once. The branches
    /// are interleaved by commit time, taking the earliest head next and the
    /// first parent on ties, so each branch keeps its own order even when
    /// its clock was skewed.
    pub fn merge<'a>(parents: impl IntoIterator<Item = &'a ChangelogChain>) -> Self {
        let parents: Vec<&ChangelogChain> = parents.into_iter().collect();
        match parents.as_slice() {
            [] => return Self::default(),
            [only] => return (*only).clone(),
            [first, rest @ ..] if rest.iter().all(|p| p.same_as(first)) => return (*first).clone(),
            _ => {}
        }

        let branches: Vec<Vec<Rc<ChangelogRecord>>> = parents.iter().map(|p| p.records()).collect();
        let mut cursors = vec![0usize; branches.len()];
        let mut seen: HashSet<CommitId> = HashSet::new();
        let mut merged = Self::default();

        loop {
            for (branch, cursor) in branches.iter().zip(cursors.iter_mut()) {
                while branch.get(*cursor).is_some_and(|r| seen.contains(&r.commit)) {
                    *cursor += 1;
                }
            }
            let next = branches
                .iter()
                .zip(&cursors)
                .enumerate()
                .filter_map(|(i, (branch, &cursor))| branch.get(cursor).map(|r| (r.timestamp, i)))
                .min();
            let Some((_, i)) = next else {
                break;
            };

            let record = Rc::clone(&branches[i][cursors[i]]);
            cursors[i] += 1;
            seen.insert(record.commit.clone());
            merged = merged.push_rc(record);
        }
        merged
    }

    fn same_as(&self, other: &ChangelogChain) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for ChangelogChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.records().iter().map(|r| &r.commit)).finish()
    }
}

/// Whether the changelog of a commit stops at the commit itself.
///
/// That is the case without a spec file, and when the commit changes the
/// changelog file with respect to every parent (or is a root commit that
/// has one).
pub(crate) fn cuts_history(
    snapshot: &SpecSnapshot,
    own_file: Option<&[u8]>,
    parent_files: &[Option<&[u8]>],
) -> bool {
    if snapshot.is_absent() {
        return true;
    }
    if parent_files.is_empty() {
        return own_file.is_some();
    }
    parent_files.iter().all(|p| *p != own_file)
}

/// Whether the changelog of a commit with history includes `parent`'s.
pub(crate) fn needs_parent(parent: &SpecSnapshot) -> bool {
    !parent.is_absent()
}

/// Everything the changelog of one commit is built from.
pub(crate) struct ChangelogInput<'a> {
    pub commit: &'a CommitInfo,
    pub snapshot: &'a SpecSnapshot,
    pub magic: &'a MagicCommentResult,
    pub release: &'a ReleaseInfo,
    pub own_file: Option<&'a [u8]>,
    pub cuts_history: bool,
}

pub(crate) fn visit<'a>(
    input: &ChangelogInput<'_>,
    parents: impl IntoIterator<Item = &'a ChangelogChain>,
) -> ChangelogChain {
    let commit = input.commit;

    if input.snapshot.is_absent() {
        return ChangelogChain::default();
    }

    if input.cuts_history {
        let text = input
            .own_file
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .filter(|text| !text.trim().is_empty());
        return match text {
            Some(text) => ChangelogChain::default().push(ChangelogRecord {
                commit: commit.id.clone(),
                timestamp: commit.committer.date.timestamp,
                entry: ChangelogEntry::Verbatim(text),
            }),
            None => ChangelogChain::default(),
        };
    }

    let chain = ChangelogChain::merge(parents);
    if input.magic.skip_changelog {
        tracing::debug!(commit = commit.id.short(), "skipping changelog entry");
        return chain;
    }

    let error = match input.snapshot {
        SpecSnapshot::Unparseable { detail } => {
            let mut details = vec!["spec file can't be parsed".to_string()];
            if let Some(first) = detail.lines().map(str::trim).find(|l| !l.is_empty()) {
                details.push(first.to_string());
            }
            Some(details)
        }
        _ => None,
    };

    chain.push(ChangelogRecord {
        commit: commit.id.clone(),
        timestamp: commit.committer.date.timestamp,
        entry: ChangelogEntry::Generated(GeneratedEntry {
            timestamp: commit.committer.date,
            authorblurb: commit.author.blurb(),
            epoch_version: input.release.epoch_version.clone(),
            release_complete: input.release.release_complete.clone(),
            commitlog: commit.message.clone(),
            error,
        }),
    })
}

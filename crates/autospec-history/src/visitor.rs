use std::rc::Rc;

use crate::changelog::{self, ChangelogInput};
use crate::magic::MagicCommentResult;
use crate::processor::CommitResult;
use crate::release;
use crate::repository::CommitInfo;
use crate::snapshot::SpecSnapshot;

/// What a history run computes.
///
/// Changelog entries carry release numbers, so asking for the changelog
/// always computes releases too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visitor {
    ReleaseNumber,
    Changelog,
}

/// Everything read from the repository about one commit.
#[derive(Debug)]
pub(crate) struct CommitFacts {
    pub info: CommitInfo,
    pub snapshot: Rc<SpecSnapshot>,
    pub magic: MagicCommentResult,
    /// The changelog file, only read when the changelog is wanted.
    pub changelog_file: Option<Vec<u8>>,
}

/// A parent as seen by one visitor: its result is only there when the
/// visitor asked for the parent.
pub(crate) struct ParentView<'a> {
    pub facts: &'a CommitFacts,
    pub result: Option<&'a CommitResult>,
}

impl Visitor {
    /// The visitors to actually run, in order. Releases always come first.
    pub(crate) fn plan(visitors: &[Visitor]) -> Vec<Visitor> {
        let mut plan = vec![Visitor::ReleaseNumber];
        if visitors.contains(&Visitor::Changelog) {
            plan.push(Visitor::Changelog);
        }
        plan
    }

    /// For each parent, whether this visitor needs the parent's result.
    ///
    /// Decided before any parent is visited, so the walk can skip history
    /// no visitor depends on.
    pub(crate) fn needs_parents(self, commit: &CommitFacts, parents: &[&CommitFacts]) -> Vec<bool> {
        match self {
            Visitor::ReleaseNumber => parents
                .iter()
                .map(|p| release::needs_parent(&commit.snapshot, &p.snapshot))
                .collect(),
            Visitor::Changelog => {
                let cut = cuts_changelog(commit, parents.iter().copied());
                parents
                    .iter()
                    .map(|p| !cut && changelog::needs_parent(&p.snapshot))
                    .collect()
            }
        }
    }

    /// Fill in this visitor's part of `result`.
    pub(crate) fn visit(self, commit: &CommitFacts, parents: &[ParentView<'_>], result: &mut CommitResult) {
        let needed = || parents.iter().filter_map(|p| p.result);
        match self {
            Visitor::ReleaseNumber => {
                result.release = release::visit(
                    &commit.snapshot,
                    &commit.magic,
                    needed().map(|r| &r.release),
                );
            }
            Visitor::Changelog => {
                let input = ChangelogInput {
                    commit: &commit.info,
                    snapshot: &commit.snapshot,
                    magic: &commit.magic,
                    release: &result.release,
                    own_file: commit.changelog_file.as_deref(),
                    cuts_history: cuts_changelog(commit, parents.iter().map(|p| p.facts)),
                };
                let chain = changelog::visit(&input, needed().filter_map(|r| r.changelog.as_ref()));
                result.changelog = Some(chain);
            }
        }
    }
}

fn cuts_changelog<'a>(commit: &CommitFacts, parents: impl Iterator<Item = &'a CommitFacts>) -> bool {
    let parent_files: Vec<Option<&[u8]>> = parents.map(|p| p.changelog_file.as_deref()).collect();
    changelog::cuts_history(&commit.snapshot, commit.changelog_file.as_deref(), &parent_files)
}

use std::collections::HashMap;

use autospec_changelog::ChangelogEntry;
use autospec_spec::{SpecParseError, SpecParser};

use crate::changelog::{ChangelogChain, CHANGELOG_FILE};
use crate::magic::MagicCommentResult;
use crate::release::ReleaseInfo;
use crate::repository::{CommitId, VcsRepository};
use crate::snapshot::SnapshotLoader;
use crate::visitor::{CommitFacts, ParentView, Visitor};
use crate::{HistoryError, Result};

/// Tunables for a [`HistoryProcessor`].
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Name of the file holding pre-automation changelog entries.
    pub changelog_file: String,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            changelog_file: CHANGELOG_FILE.to_string(),
        }
    }
}

/// What the visitors computed for one commit.
#[derive(Debug, Clone)]
pub struct CommitResult {
    pub commit: CommitId,
    pub release: ReleaseInfo,
    /// Only computed when [`Visitor::Changelog`] was requested.
    pub changelog: Option<ChangelogChain>,
}

impl CommitResult {
    fn new(commit: CommitId) -> Self {
        Self {
            commit,
            release: ReleaseInfo::default(),
            changelog: None,
        }
    }

    /// Changelog entries, oldest first; empty if the changelog was not computed.
    pub fn changelog_entries(&self) -> Vec<ChangelogEntry> {
        self.changelog
            .as_ref()
            .map(ChangelogChain::entries)
            .unwrap_or_default()
    }
}

/// Outcome of [`HistoryProcessor::run`].
#[derive(Debug)]
pub struct RunResult {
    /// The commit the walk started from.
    pub start: CommitId,
    /// Result for the start commit.
    pub result: CommitResult,
    /// Why the spec file at the start commit could not be parsed, if it couldn't.
    pub error: Option<SpecParseError>,
    /// Results of every visited commit, when requested.
    pub all: HashMap<CommitId, CommitResult>,
}

/// Walks the history of one package and runs visitors on its commits.
pub struct HistoryProcessor<R> {
    repo: R,
    parser: Box<dyn SpecParser>,
    spec_file: String,
    options: ProcessorOptions,
}

impl<R: VcsRepository> HistoryProcessor<R> {
    /// `spec_file` is the spec file name relative to the package directory.
    pub fn new(repo: R, parser: Box<dyn SpecParser>, spec_file: impl Into<String>) -> Self {
        Self {
            repo,
            parser,
            spec_file: spec_file.into(),
            options: ProcessorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProcessorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn spec_file(&self) -> &str {
        &self.spec_file
    }

    /// Walk the history from `start` (HEAD when `None`) and compute what the
    /// given visitors need.
    ///
    /// Parents are always finished before their children. Spec files that
    /// cannot be parsed are recorded, not fatal.
    pub fn run(&self, start: Option<&str>, visitors: &[Visitor], all_results: bool) -> Result<RunResult> {
        let start_id = match start {
            Some(rev) => self.repo.resolve(rev)?,
            None => self.repo.head()?,
        };
        let plan = Visitor::plan(visitors);
        let changelog_file = plan
            .contains(&Visitor::Changelog)
            .then_some(self.options.changelog_file.as_str());

        let mut walk = Walk {
            repo: &self.repo,
            loader: SnapshotLoader::new(&*self.parser, self.spec_file.as_str())?,
            spec_file: &self.spec_file,
            changelog_file,
            nodes: Vec::new(),
            index: HashMap::new(),
        };

        let start_idx = walk.load(&start_id)?;
        walk.traverse(start_idx, &plan)?;

        tracing::debug!(
            start = start_id.short(),
            loaded = walk.nodes.len(),
            visited = walk.nodes.iter().filter(|n| n.result.is_some()).count(),
            "history walk finished"
        );

        let error = walk.nodes[start_idx].facts.snapshot.parse_error();
        let mut all = HashMap::new();
        if all_results {
            for node in &walk.nodes {
                if let Some(result) = &node.result {
                    all.insert(result.commit.clone(), result.clone());
                }
            }
        }
        let result = walk.nodes[start_idx]
            .result
            .take()
            .ok_or_else(|| HistoryError::CommitNotFound(start_id.clone()))?;

        Ok(RunResult {
            start: start_id,
            result,
            error,
            all,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not expanded yet.
    White,
    /// Expanded, waiting for its parents.
    Grey,
    /// Finished.
    Black,
}

struct Node {
    facts: CommitFacts,
    color: Color,
    parents: Vec<usize>,
    /// Per planned visitor, per parent.
    needs: Vec<Vec<bool>>,
    result: Option<CommitResult>,
}

struct Walk<'r, R> {
    repo: &'r R,
    loader: SnapshotLoader<'r>,
    spec_file: &'r str,
    changelog_file: Option<&'r str>,
    nodes: Vec<Node>,
    index: HashMap<CommitId, usize>,
}

impl<'r, R: VcsRepository> Walk<'r, R> {
    /// Read a commit into the arena, once.
    fn load(&mut self, id: &CommitId) -> Result<usize> {
        if let Some(&idx) = self.index.get(id) {
            return Ok(idx);
        }

        let info = self.repo.commit(id)?;
        let spec = self.repo.read_file(id, self.spec_file)?;
        let snapshot = self.loader.load(spec)?;
        let magic = MagicCommentResult::parse(&info.message);
        let changelog_file = match self.changelog_file {
            Some(path) => self.repo.read_file(id, path)?,
            None => None,
        };

        let idx = self.nodes.len();
        self.nodes.push(Node {
            facts: CommitFacts {
                info,
                snapshot,
                magic,
                changelog_file,
            },
            color: Color::White,
            parents: Vec::new(),
            needs: Vec::new(),
            result: None,
        });
        self.index.insert(id.clone(), idx);
        Ok(idx)
    }

    /// Depth-first post-order walk with an explicit stack.
    fn traverse(&mut self, start: usize, plan: &[Visitor]) -> Result<()> {
        let mut stack = vec![(start, false)];

        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                self.finish(idx, plan);
                continue;
            }
            match self.nodes[idx].color {
                Color::Black => continue,
                Color::Grey => return Err(HistoryError::Cycle(self.nodes[idx].facts.info.id.clone())),
                Color::White => {}
            }
            self.nodes[idx].color = Color::Grey;

            let parent_ids = self.nodes[idx].facts.info.parents.clone();
            let parents = parent_ids
                .iter()
                .map(|id| self.load(id))
                .collect::<Result<Vec<usize>>>()?;

            let needs: Vec<Vec<bool>> = {
                let facts = &self.nodes[idx].facts;
                let parent_facts: Vec<&CommitFacts> =
                    parents.iter().map(|&p| &self.nodes[p].facts).collect();
                plan.iter()
                    .map(|v| v.needs_parents(facts, &parent_facts))
                    .collect()
            };

            stack.push((idx, true));
            for (i, &parent) in parents.iter().enumerate().rev() {
                if !needs.iter().any(|n| n[i]) {
                    continue;
                }
                match self.nodes[parent].color {
                    Color::White => stack.push((parent, false)),
                    Color::Grey => {
                        return Err(HistoryError::Cycle(self.nodes[parent].facts.info.id.clone()))
                    }
                    Color::Black => {}
                }
            }

            let node = &mut self.nodes[idx];
            node.parents = parents;
            node.needs = needs;
        }

        Ok(())
    }

    fn finish(&mut self, idx: usize, plan: &[Visitor]) {
        let node = &self.nodes[idx];
        let mut result = CommitResult::new(node.facts.info.id.clone());

        for (v, visitor) in plan.iter().enumerate() {
            let views: Vec<ParentView<'_>> = node
                .parents
                .iter()
                .enumerate()
                .map(|(i, &p)| ParentView {
                    facts: &self.nodes[p].facts,
                    result: if node.needs[v][i] {
                        self.nodes[p].result.as_ref()
                    } else {
                        None
                    },
                })
                .collect();
            visitor.visit(&node.facts, &views, &mut result);
        }

        tracing::debug!(
            commit = node.facts.info.id.short(),
            epoch_version = result.release.epoch_version.as_deref().unwrap_or("-"),
            release = result.release.release_number,
            "visited commit"
        );

        let node = &mut self.nodes[idx];
        node.result = Some(result);
        node.color = Color::Black;
    }
}

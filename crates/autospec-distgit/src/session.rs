use std::path::Path;

use autospec_git::GitRepository;
use autospec_history::{
    HistoryProcessor, PackagePath, ProcessorOptions, RunResult, UncommittedOverlay, VcsRepository,
    Visitor,
};
use autospec_utils::{CommitDate, Signature};

use crate::{DistgitError, DistgitOptions, Result};

/// A package opened for one operation.
pub(crate) struct Session {
    pub package: PackagePath,
    processor: HistoryProcessor<Box<dyn VcsRepository>>,
    strict: bool,
}

impl Session {
    pub fn open(path: &Path, options: &DistgitOptions) -> Result<Self> {
        let package = PackagePath::resolve(path)?;
        Self::for_package(package, options)
    }

    pub fn for_package(package: PackagePath, options: &DistgitOptions) -> Result<Self> {
        let git = GitRepository::open(&package.dir)?;

        let repo: Box<dyn VcsRepository> =
            if options.include_uncommitted && git.has_uncommitted_changes()? {
                tracing::debug!(dir = %package.dir.display(), "including uncommitted changes");
                let signature = git.default_signature().unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "no identity configured");
                    Signature::new("Unknown", "unknown@unknown", CommitDate::now())
                });
                Box::new(UncommittedOverlay::new(git, package.dir.clone(), signature))
            } else {
                Box::new(git)
            };

        let processor = HistoryProcessor::new(repo, options.parser.parser(), package.spec_file_name())
            .with_options(ProcessorOptions {
                changelog_file: options.changelog_file.clone(),
            });

        Ok(Self {
            package,
            processor,
            strict: options.strict,
        })
    }

    /// Walk from the current state of the package.
    pub fn run(&self, visitors: &[Visitor]) -> Result<RunResult> {
        let run = self.processor.run(None, visitors, false)?;
        if let Some(err) = &run.error {
            if self.strict {
                return Err(DistgitError::SpecParse {
                    path: self.package.spec_path(),
                    detail: err.detail.clone(),
                });
            }
            tracing::warn!(
                spec = %self.package.spec_path().display(),
                "spec file can't be parsed: {}",
                err.first_line()
            );
        }
        Ok(run)
    }
}

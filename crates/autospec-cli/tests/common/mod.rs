//! Shared harness for autospec command line tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{IndexAddOption, Repository, Signature, Time};
use tempfile::TempDir;

/// Captured output from running the binary.
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run `autospec` in `dir` with the builtin spec parser.
pub fn autospec(dir: &Path, args: &[&str]) -> CommandResult {
    let output = Command::new(env!("CARGO_BIN_EXE_autospec"))
        .args(["--spec-parser", "builtin"])
        .args(args)
        .current_dir(dir)
        .env_remove("AUTOSPEC_LOG")
        .env("AUTOSPEC_PAGER", "cat")
        .env("TZ", "UTC")
        .env("LC_ALL", "C")
        .output()
        .expect("failed to run autospec");
    CommandResult {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(128),
    }
}

/// A git checkout of package `foo`.
pub struct Package {
    _tmp: TempDir,
    pub dir: PathBuf,
    repo: Repository,
    commits: std::cell::Cell<i64>,
}

impl Package {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path().join("foo");
        fs::create_dir(&dir).expect("package dir");
        let repo = Repository::init(&dir).expect("init repo");
        Self {
            _tmp: tmp,
            dir,
            repo,
            commits: std::cell::Cell::new(0),
        }
    }

    pub fn write(&self, rel: &str, contents: &str) {
        fs::write(self.dir.join(rel), contents).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.dir.join(rel)).expect("read file")
    }

    pub fn commit(&self, message: &str) {
        let n = self.commits.get() + 1;
        self.commits.set(n);

        let mut index = self.repo.index().expect("index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("add all");
        index.write().expect("write index");
        let tree = self
            .repo
            .find_tree(index.write_tree().expect("write tree"))
            .expect("find tree");
        // 2024-01-01 12:00 UTC plus one day per commit.
        let sig = Signature::new(
            "Test Packager",
            "packager@example.com",
            &Time::new(1_704_110_400 + n * 86_400, 0),
        )
        .expect("signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit");
    }
}

pub fn spec(version: &str) -> String {
    format!(
        "Name: foo\nVersion: {}\nRelease: %autorelease\nSummary: Foo\n\n%description\nFoo.\n\n%changelog\n%autochangelog\n",
        version
    )
}

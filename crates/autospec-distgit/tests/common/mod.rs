#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use autospec_distgit::{DistgitOptions, ParserKind};
use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use tempfile::TempDir;

pub const T0: i64 = 1_700_000_000;

/// A dist-git checkout of package `foo`.
pub struct Checkout {
    _tmp: TempDir,
    dir: PathBuf,
    repo: Repository,
    clock: std::cell::Cell<i64>,
}

impl Checkout {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let dir = tmp.path().join("foo");
        fs::create_dir(&dir).expect("package dir");
        let repo = Repository::init(&dir).expect("init repo");
        {
            let mut config = repo.config().expect("config");
            config.set_str("user.name", "Local User").expect("user.name");
            config.set_str("user.email", "local@example.com").expect("user.email");
        }
        Self {
            _tmp: tmp,
            dir,
            repo,
            clock: std::cell::Cell::new(T0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn spec_path(&self) -> PathBuf {
        self.dir.join("foo.spec")
    }

    pub fn write(&self, rel: &str, contents: &str) {
        fs::write(self.dir.join(rel), contents).expect("write file");
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.dir.join(rel)).expect("read file")
    }

    /// Commit everything in the working tree, one day after the last commit.
    pub fn commit(&self, message: &str) -> Oid {
        let time = self.clock.get() + 86_400;
        self.clock.set(time);

        let mut index = self.repo.index().expect("index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("add all");
        index.update_all(["*"].iter(), None).expect("update all");
        index.write().expect("write index");
        let tree = self
            .repo
            .find_tree(index.write_tree().expect("write tree"))
            .expect("find tree");

        let sig = Signature::new("Test Packager", "packager@example.com", &Time::new(time, 0))
            .expect("signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }
}

pub fn options() -> DistgitOptions {
    DistgitOptions {
        parser: ParserKind::Builtin,
        ..DistgitOptions::default()
    }
}

pub fn auto_spec(version: &str) -> String {
    format!(
        "Name:           foo\n\
         Version:        {}\n\
         Release:        %autorelease\n\
         Summary:        Foo\n\
         License:        MIT\n\
         \n\
         %description\n\
         Foo.\n\
         \n\
         %changelog\n\
         %autochangelog\n",
        version
    )
}

pub fn manual_spec() -> String {
    "Name:           foo\n\
     Version:        1.0\n\
     Release:        3%{?dist}\n\
     Summary:        Foo\n\
     License:        MIT\n\
     \n\
     %description\n\
     Foo.\n\
     \n\
     %changelog\n\
     * Tue Jan 02 2024 Old Packager <old@example.com> - 1.0-3\n\
     - Rebuilt\n\
     \n\
     * Mon Jan 01 2024 Old Packager <old@example.com> - 1.0-1\n\
     - Initial package\n"
        .to_string()
}

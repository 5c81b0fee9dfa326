#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Oid, Repository, Signature, Time};
use tempfile::TempDir;

/// A scratch repository with the package in a `rpms/foo` subdirectory.
pub struct Fixture {
    dir: TempDir,
    pub repo: Repository,
}

pub const PACKAGE: &str = "rpms/foo";

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let repo = Repository::init(dir.path()).expect("init repo");
        {
            let mut config = repo.config().expect("config");
            config.set_str("user.name", "Config User").expect("user.name");
            config.set_str("user.email", "config@example.com").expect("user.email");
        }
        fs::create_dir_all(dir.path().join(PACKAGE)).expect("package dir");
        Self { dir, repo }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn package_dir(&self) -> PathBuf {
        self.dir.path().join(PACKAGE)
    }

    /// Write a file relative to the package directory.
    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.package_dir().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, contents).expect("write file");
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.package_dir().join(rel)).expect("remove file");
    }

    /// Commit the whole working tree on top of HEAD.
    pub fn commit(&self, message: &str, time: i64) -> Oid {
        let parents: Vec<Oid> = self
            .repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .into_iter()
            .collect();
        self.commit_with_parents(message, time, &parents)
    }

    /// Commit the whole working tree with explicit parents and move the
    /// `main` branch there.
    pub fn commit_with_parents(&self, message: &str, time: i64, parents: &[Oid]) -> Oid {
        let mut index = self.repo.index().expect("index");
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .expect("add all");
        index.update_all(["*"].iter(), None).expect("update all");
        index.write().expect("write index");
        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");

        let sig = Signature::new("Test Packager", "packager@example.com", &Time::new(time, 120))
            .expect("signature");
        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("parent"))
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("commit");
        self.repo
            .reference("refs/heads/main", oid, true, "test commit")
            .expect("update branch");
        self.repo.set_head("refs/heads/main").expect("set head");
        oid
    }

    pub fn tag(&self, name: &str, oid: Oid) {
        let obj = self.repo.find_object(oid, None).expect("object");
        self.repo.tag_lightweight(name, &obj, false).expect("tag");
    }
}

pub fn spec(version: &str) -> String {
    format!(
        "Name: foo\nVersion: {}\nRelease: %autorelease\nSummary: Foo\n\n%description\nFoo.\n\n%changelog\n%autochangelog\n",
        version
    )
}

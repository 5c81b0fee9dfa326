mod common;

use autospec_changelog::ChangelogEntry;
use autospec_history::{CommitId, CommitInfo, HistoryError, Visitor};
use autospec_utils::{CommitDate, Signature};

use common::{broken_spec, processor, spec, MemoryRepo, SPEC};

const ALL: &[Visitor] = &[Visitor::ReleaseNumber, Visitor::Changelog];

fn generated_subjects(entries: &[ChangelogEntry]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|e| match e {
            ChangelogEntry::Generated(g) => Some(g.commitlog.lines().next().unwrap_or("").to_string()),
            ChangelogEntry::Verbatim(_) => None,
        })
        .collect()
}

#[test]
fn unchanged_version_counts_up() {
    let mut repo = MemoryRepo::new();
    let v = spec("1.0");
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&v))]);
    let c2 = repo.commit(&[&c1], "Fix summary", &[("README", Some("x"))]);
    let c3 = repo.commit(&[&c2], "Rebuild", &[]);

    let run = processor(repo).run(None, &[Visitor::ReleaseNumber], true).unwrap();

    assert_eq!(run.start, c3);
    assert_eq!(run.result.release.release_number, 3);
    assert_eq!(run.result.release.release_complete.as_deref(), Some("3"));
    assert_eq!(run.all[&c1].release.release_number, 1);
    assert_eq!(run.all[&c2].release.release_number, 2);
    assert!(run.error.is_none());
    assert!(run.result.changelog.is_none());
}

#[test]
fn version_change_resets() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c2 = repo.commit(&[&c1], "Rebuild", &[]);
    let c3 = repo.commit(&[&c2], "Update to 2.0", &[(SPEC, Some(&spec("2.0")))]);
    let c4 = repo.commit(&[&c3], "Fix build", &[]);

    let run = processor(repo).run(None, &[Visitor::ReleaseNumber], true).unwrap();

    assert_eq!(run.all[&c2].release.release_number, 2);
    assert_eq!(run.all[&c3].release.release_number, 1);
    assert_eq!(run.all[&c4].release.release_number, 2);
    assert_eq!(run.result.release.epoch_version.as_deref(), Some("2.0"));
}

#[test]
fn release_walk_stops_at_version_change() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c2 = repo.commit(&[&c1], "Update to 2.0", &[(SPEC, Some(&spec("2.0")))]);
    let c3 = repo.commit(&[&c2], "Rebuild", &[]);

    let proc = processor(repo);
    let run = proc.run(None, &[Visitor::ReleaseNumber], true).unwrap();
    assert!(run.all.contains_key(&c3));
    assert!(run.all.contains_key(&c2));
    assert!(!run.all.contains_key(&c1));

    let run = proc.run(None, ALL, true).unwrap();
    assert!(run.all.contains_key(&c1));
}

#[test]
fn bump_release_is_a_floor() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c2 = repo.commit(&[&c1], "Two", &[]);
    let c3 = repo.commit(&[&c2], "Sync with other branch\n\n[bump release: 15]\n", &[]);
    let c4 = repo.commit(&[&c3], "Next", &[]);
    let c5 = repo.commit(&[&c4], "Too late\n\n[bump release: 3]", &[]);

    let run = processor(repo).run(None, &[Visitor::ReleaseNumber], true).unwrap();

    assert_eq!(run.all[&c2].release.release_number, 2);
    assert_eq!(run.all[&c3].release.release_number, 15);
    assert_eq!(run.all[&c4].release.release_number, 16);
    assert_eq!(run.all[&c5].release.release_number, 17);
}

#[test]
fn skip_changelog_still_counts() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c2 = repo.commit(&[&c1], "Fix whitespace\n\n[skip changelog]\n", &[]);
    repo.commit(&[&c2], "Fix crash", &[]);

    let run = processor(repo).run(None, ALL, false).unwrap();

    assert_eq!(run.result.release.release_number, 3);
    let entries = run.result.changelog_entries();
    assert_eq!(generated_subjects(&entries), ["Initial import", "Fix crash"]);

    let text = run.result.changelog.unwrap().render();
    let headers: Vec<&str> = text.lines().filter(|l| l.starts_with('*')).collect();
    assert!(headers[0].ends_with("<packager@example.com> - 1.0-3"));
    assert!(headers[1].ends_with("<packager@example.com> - 1.0-1"));
    assert!(!text.contains("whitespace"));
}

#[test]
fn unparseable_oldest_commit() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Broken import", &[(SPEC, Some(&broken_spec()))]);
    let c2 = repo.commit(&[&c1], "Fix spec", &[(SPEC, Some(&spec("1.0")))]);
    let c3 = repo.commit(&[&c2], "Rebuild", &[]);

    let run = processor(repo).run(None, ALL, true).unwrap();

    assert!(run.error.is_none());
    assert!(run.all[&c1].release.epoch_version.is_none());
    assert_eq!(run.all[&c2].release.release_number, 1);
    assert_eq!(run.result.release.release_number, 2);
    assert_eq!(run.result.commit, c3);

    let entries = run.result.changelog_entries();
    assert_eq!(entries.len(), 3);
    match &entries[0] {
        ChangelogEntry::Generated(g) => {
            let details = g.error.as_ref().unwrap();
            assert_eq!(details[0], "spec file can't be parsed");
            assert!(details[1].contains("unresolved macro"));
        }
        other => panic!("unexpected entry {:?}", other),
    }
    assert_eq!(generated_subjects(&entries[1..]), ["Fix spec", "Rebuild"]);
}

#[test]
fn unparseable_head_is_reported() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c2 = repo.commit(&[&c1], "Two", &[]);
    repo.commit(&[&c2], "Break it", &[(SPEC, Some(&broken_spec()))]);

    let run = processor(repo).run(None, ALL, false).unwrap();

    let error = run.error.expect("parse error surfaced");
    assert!(error.detail.contains("unresolved macro"));
    assert_eq!(run.result.release.epoch_version.as_deref(), Some("1.0"));
    assert_eq!(run.result.release.release_number, 3);
    let text = run.result.changelog.unwrap().render();
    assert!(text.contains("- RPMAUTOSPEC: spec file can't be parsed\n"));
}

#[test]
fn merge_takes_maximum_regardless_of_parent_order() {
    let mut repo = MemoryRepo::new();
    let base = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let l1 = repo.commit(&[&base], "Left one", &[("left", Some("1"))]);
    let l2 = repo.commit(&[&l1], "Left two", &[]);
    let r1 = repo.commit(&[&base], "Right one", &[("right", Some("1"))]);

    let m1 = repo.commit(&[&l2, &r1], "Merge right", &[]);
    let m2 = repo.commit(&[&r1, &l2], "Merge left", &[]);

    let proc = processor(repo);
    let a = proc.run(Some(m1.as_str()), ALL, false).unwrap();
    let b = proc.run(Some(m2.as_str()), ALL, false).unwrap();

    assert_eq!(a.result.release.release_number, 4);
    assert_eq!(b.result.release.release_number, 4);

    let subjects_a = generated_subjects(&a.result.changelog_entries());
    let subjects_b = generated_subjects(&b.result.changelog_entries());
    assert_eq!(
        subjects_a,
        ["Initial import", "Left one", "Left two", "Right one", "Merge right"]
    );
    assert_eq!(&subjects_b[..4], &subjects_a[..4]);
}

#[test]
fn merge_keeps_branch_order_with_skewed_clock() {
    let mut repo = MemoryRepo::new();
    let t0 = common::BASE_TIME;
    let base = repo.commit_at(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))], t0);
    let a1 = repo.commit_at(&[&base], "A one", &[("a", Some("1"))], t0 + 100);
    // Committed with a clock running behind.
    let a2 = repo.commit_at(&[&a1], "A two", &[("a", Some("2"))], t0 + 50);
    let b1 = repo.commit_at(&[&base], "B one", &[("b", Some("1"))], t0 + 75);
    let m1 = repo.commit_at(&[&a2, &b1], "Merge b", &[], t0 + 200);
    let m2 = repo.commit_at(&[&b1, &a2], "Merge a", &[], t0 + 200);

    let proc = processor(repo);
    let linear = proc.run(Some(a2.as_str()), ALL, false).unwrap();
    let a = proc.run(Some(m1.as_str()), ALL, false).unwrap();
    let b = proc.run(Some(m2.as_str()), ALL, false).unwrap();

    assert_eq!(
        generated_subjects(&linear.result.changelog_entries()),
        ["Initial import", "A one", "A two"]
    );
    let subjects_a = generated_subjects(&a.result.changelog_entries());
    assert_eq!(subjects_a, ["Initial import", "B one", "A one", "A two", "Merge b"]);
    let subjects_b = generated_subjects(&b.result.changelog_entries());
    assert_eq!(&subjects_b[..4], &subjects_a[..4]);
}

/// Left bumps to 2.0 once, right stays at 1.0 for five more commits.
fn mixed_version_branches(repo: &mut MemoryRepo) -> (CommitId, CommitId) {
    let base = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let left = repo.commit(&[&base], "Update to 2.0", &[(SPEC, Some(&spec("2.0")))]);
    let mut right = base;
    for i in 1..=5 {
        right = repo.commit(&[&right], &format!("Rebuild {i}"), &[("right", Some(&i.to_string()))]);
    }
    (left, right)
}

#[test]
fn merge_into_new_version_counts_from_that_branch() {
    let mut repo = MemoryRepo::new();
    let (left, right) = mixed_version_branches(&mut repo);
    let v2 = spec("2.0");
    let m1 = repo.commit(&[&left, &right], "Merge 1.0 fixes", &[(SPEC, Some(&v2))]);
    let m2 = repo.commit(&[&right, &left], "Merge 2.0", &[(SPEC, Some(&v2))]);

    let proc = processor(repo);
    for merge in [&m1, &m2] {
        let run = proc.run(Some(merge.as_str()), &[Visitor::ReleaseNumber], true).unwrap();
        assert_eq!(run.all[&left].release.release_number, 1);
        // The 1.0 branch has nothing to contribute.
        assert!(!run.all.contains_key(&right));
        assert_eq!(run.result.release.epoch_version.as_deref(), Some("2.0"));
        assert_eq!(run.result.release.release_number, 2);
    }
}

#[test]
fn merge_into_old_version_continues_that_branch() {
    let mut repo = MemoryRepo::new();
    let (left, right) = mixed_version_branches(&mut repo);
    let v1 = spec("1.0");
    let m1 = repo.commit(&[&left, &right], "Revert to 1.0", &[(SPEC, Some(&v1))]);
    let m2 = repo.commit(&[&right, &left], "Merge 2.0 work", &[(SPEC, Some(&v1))]);

    let proc = processor(repo);
    for merge in [&m1, &m2] {
        let run = proc.run(Some(merge.as_str()), &[Visitor::ReleaseNumber], true).unwrap();
        assert_eq!(run.all[&right].release.release_number, 6);
        assert_eq!(run.result.release.epoch_version.as_deref(), Some("1.0"));
        assert_eq!(run.result.release.release_number, 7);
    }
}

#[test]
fn verbatim_changelog_file_ends_history() {
    let mut repo = MemoryRepo::new();
    let old = "* Mon Jan 01 2024 Old Packager <old@example.com> - 0.9-3\n- Old entry\n";
    let c1 = repo.commit(&[], "Ancient history", &[(SPEC, Some(&spec("0.9")))]);
    let c2 = repo.commit(
        &[&c1],
        "Convert to autospec",
        &[(SPEC, Some(&spec("1.0"))), ("changelog", Some(old))],
    );
    repo.commit(&[&c2], "Update patches", &[]);

    let run = processor(repo).run(None, ALL, true).unwrap();

    let entries = run.result.changelog_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], ChangelogEntry::Verbatim(old.to_string()));
    assert_eq!(generated_subjects(&entries), ["Update patches"]);

    let text = run.result.changelog.unwrap().render();
    assert!(text.ends_with("- Old entry\n"));
    assert!(text.starts_with("* "));
    assert!(!run.all.contains_key(&c1));
}

#[test]
fn commits_without_spec_are_zero() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Add README", &[("README", Some("hello"))]);
    let c2 = repo.commit(&[&c1], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c3 = repo.commit(&[&c2], "Retire package", &[(SPEC, None)]);

    let proc = processor(repo);
    let run = proc.run(None, ALL, true).unwrap();
    assert_eq!(run.result.release.release_number, 0);
    assert!(run.result.release.epoch_version.is_none());
    assert!(run.result.changelog_entries().is_empty());
    assert!(!run.all.contains_key(&c2));

    let run = proc.run(Some(c2.as_str()), ALL, true).unwrap();
    assert_eq!(run.result.release.release_number, 1);
    assert_eq!(generated_subjects(&run.result.changelog_entries()), ["Initial import"]);
    assert!(!run.all.contains_key(&c1));
    assert!(!run.all.contains_key(&c3));
}

#[test]
fn start_from_named_revision() {
    let mut repo = MemoryRepo::new();
    let c1 = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    let c2 = repo.commit(&[&c1], "Two", &[]);
    repo.commit(&[&c2], "Three", &[]);
    repo.tag("foo-1.0-2", &c2);

    let proc = processor(repo);
    let run = proc.run(Some("foo-1.0-2"), &[Visitor::ReleaseNumber], false).unwrap();
    assert_eq!(run.start, c2);
    assert_eq!(run.result.release.release_number, 2);

    assert!(matches!(
        proc.run(Some("no-such-ref"), &[Visitor::ReleaseNumber], false),
        Err(HistoryError::InvalidRevision(_))
    ));
}

#[test]
fn cycle_is_an_error() {
    let sig = Signature::new("A", "a@example.com", CommitDate::new(0, 0));
    let info = |id: &str, parent: &str| CommitInfo {
        id: CommitId::new(id),
        parents: vec![CommitId::new(parent)],
        author: sig.clone(),
        committer: sig.clone(),
        message: "loop".into(),
    };
    let text = spec("1.0");
    let mut repo = MemoryRepo::new();
    repo.insert_raw(info("a", "b"), &[(SPEC, &text)]);
    repo.insert_raw(info("b", "a"), &[(SPEC, &text)]);
    repo.set_head(&CommitId::new("a"));

    let err = processor(repo).run(None, &[Visitor::ReleaseNumber], false).unwrap_err();
    assert!(matches!(err, HistoryError::Cycle(_)));
}

#[test]
fn missing_parent_is_an_error() {
    let sig = Signature::new("A", "a@example.com", CommitDate::new(0, 0));
    let mut repo = MemoryRepo::new();
    repo.insert_raw(
        CommitInfo {
            id: CommitId::new("orphan"),
            parents: vec![CommitId::new("gone")],
            author: sig.clone(),
            committer: sig,
            message: "dangling".into(),
        },
        &[(SPEC, &spec("1.0"))],
    );
    repo.set_head(&CommitId::new("orphan"));

    let err = processor(repo).run(None, &[Visitor::ReleaseNumber], false).unwrap_err();
    assert!(matches!(err, HistoryError::CommitNotFound(_)));
}

#[test]
fn long_linear_history() {
    let mut repo = MemoryRepo::new();
    let mut prev = repo.commit(&[], "Initial import", &[(SPEC, Some(&spec("1.0")))]);
    for i in 0..3000 {
        prev = repo.commit(&[&prev], &format!("Change {}", i), &[]);
    }

    let run = processor(repo).run(None, ALL, false).unwrap();
    assert_eq!(run.result.release.release_number, 3001);
    assert_eq!(run.result.changelog.unwrap().len(), 3001);
}

//! End-to-end tests for group actions over real duplicate scans.

use std::fs;
use std::path::Path;

use dupescan::actions::{DuplicateAction, ExecutorOptions, GroupActionExecutor};
use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use tempfile::TempDir;

fn touch(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scan(root: &Path) -> DuplicateFinder {
    DuplicateFinder::new(root, FinderConfig::default()).unwrap()
}

#[test]
fn test_delete_leaves_one_copy_per_group() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.txt"), b"alpha");
    touch(&dir.path().join("b.txt"), b"alpha");
    touch(&dir.path().join("c.txt"), b"alpha");
    touch(&dir.path().join("x.txt"), b"beta");
    touch(&dir.path().join("y.txt"), b"beta");

    let finder = scan(dir.path());
    let report = finder.find_exact();
    assert_eq!(report.groups.len(), 2);

    let executor =
        GroupActionExecutor::new(ExecutorOptions::default()).with_boundary(finder.boundary());
    let outcome = executor
        .apply(&report.groups, DuplicateAction::Delete, None)
        .unwrap();

    assert_eq!(outcome.processed, 3);
    assert!(outcome.all_succeeded());
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("c.txt").exists());
    assert!(dir.path().join("x.txt").exists());
    assert!(!dir.path().join("y.txt").exists());

    // A rescan finds nothing left to deduplicate
    let rescan = scan(dir.path()).find_exact();
    assert!(rescan.groups.is_empty());
}

#[test]
fn test_move_relocates_redundant_copies() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("keep.txt"), b"dup");
    touch(&dir.path().join("sub/extra.txt"), b"dup");

    let finder = scan(dir.path());
    let report = finder.find_exact();

    let target = dir.path().join("quarantine");
    let executor =
        GroupActionExecutor::new(ExecutorOptions::default()).with_boundary(finder.boundary());
    let outcome = executor
        .apply(&report.groups, DuplicateAction::Move, Some(&target))
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert!(dir.path().join("keep.txt").exists());
    assert!(!dir.path().join("sub/extra.txt").exists());
    assert_eq!(
        fs::read(target.join("extra.txt")).unwrap(),
        b"dup".to_vec()
    );
}

#[test]
fn test_move_same_name_from_different_directories() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("one/data.csv"), b"dup");
    touch(&dir.path().join("two/data.csv"), b"dup");
    touch(&dir.path().join("three/data.csv"), b"dup");

    let finder = scan(dir.path());
    let report = finder.find_exact();
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 3);

    let target = dir.path().join("dupes");
    let executor =
        GroupActionExecutor::new(ExecutorOptions::default()).with_boundary(finder.boundary());
    let outcome = executor
        .apply(&report.groups, DuplicateAction::Move, Some(&target))
        .unwrap();

    assert_eq!(outcome.processed, 2);
    // Both redundant copies land in the target, renamed on collision
    assert!(target.join("data.csv").exists());
    assert!(target.join("data_1.csv").exists());
}

#[test]
fn test_list_is_a_dry_run() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.txt"), b"dup");
    touch(&dir.path().join("b.txt"), b"dup");

    let finder = scan(dir.path());
    let report = finder.find_exact();

    let executor =
        GroupActionExecutor::new(ExecutorOptions::default()).with_boundary(finder.boundary());
    let outcome = executor
        .apply(&report.groups, DuplicateAction::List, None)
        .unwrap();

    assert_eq!(outcome.processed, 0);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b.txt").exists());
}

#[test]
fn test_move_target_inside_scanned_tree_is_allowed() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.txt"), b"dup");
    touch(&dir.path().join("b.txt"), b"dup");

    let finder = scan(dir.path());
    let report = finder.find_exact();

    // Nested target that does not exist yet
    let target = dir.path().join("nested/dupes");
    let executor =
        GroupActionExecutor::new(ExecutorOptions::default()).with_boundary(finder.boundary());
    let outcome = executor
        .apply(&report.groups, DuplicateAction::Move, Some(&target))
        .unwrap();

    assert_eq!(outcome.processed, 1);
    assert!(target.join("b.txt").exists());
}

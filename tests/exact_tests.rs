//! End-to-end tests for exact duplicate detection.

use std::fs;
use std::path::Path;

use dupescan::duplicates::{DuplicateFinder, FinderConfig};
use dupescan::scanner::CandidateFile;
use tempfile::TempDir;

fn touch(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn names(files: &[CandidateFile]) -> Vec<String> {
    files.iter().map(CandidateFile::file_name).collect()
}

#[test]
fn test_exact_duplicates_across_subdirectories() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.txt"), b"shared content");
    touch(&dir.path().join("sub/deep/b.txt"), b"shared content");
    touch(&dir.path().join("unique.txt"), b"something else");

    let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
    let report = finder.find_exact();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(names(&report.groups[0].files), vec!["a.txt", "b.txt"]);
    assert!(!report.has_failures());
}

#[test]
fn test_exact_content_not_names_decides_equality() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("same-name-a/report.pdf"), b"version one");
    touch(&dir.path().join("same-name-b/report.pdf"), b"version two");

    let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
    let report = finder.find_exact();

    assert!(report.groups.is_empty());
}

#[test]
fn test_exact_empty_files_group_together() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("empty1.dat"), b"");
    touch(&dir.path().join("empty2.dat"), b"");
    touch(&dir.path().join("full.dat"), b"x");

    let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
    let report = finder.find_exact();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].len(), 2);
    assert_eq!(report.groups[0].wasted_space(), 0);
}

#[test]
fn test_exact_multiple_groups_in_scan_order() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.bin"), b"alpha");
    touch(&dir.path().join("b.bin"), b"beta");
    touch(&dir.path().join("c.bin"), b"alpha");
    touch(&dir.path().join("d.bin"), b"beta");

    let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
    let report = finder.find_exact();

    assert_eq!(report.groups.len(), 2);
    // Group order follows the first member's scan position
    assert_eq!(report.groups[0].survivor().file_name(), "a.bin");
    assert_eq!(report.groups[1].survivor().file_name(), "b.bin");
}

#[test]
fn test_exact_pattern_scopes_candidates() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("a.log"), b"dup");
    touch(&dir.path().join("b.log"), b"dup");
    touch(&dir.path().join("c.txt"), b"dup");

    let config = FinderConfig {
        patterns: vec!["*.log".to_string()],
        ..Default::default()
    };
    let finder = DuplicateFinder::new(dir.path(), config).unwrap();
    let report = finder.find_exact();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(names(&report.groups[0].files), vec!["a.log", "b.log"]);
}

#[test]
fn test_exact_wasted_space_accounting() {
    let dir = TempDir::new().unwrap();
    let content = b"0123456789"; // 10 bytes
    touch(&dir.path().join("a.dat"), content);
    touch(&dir.path().join("b.dat"), content);
    touch(&dir.path().join("c.dat"), content);

    let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
    let report = finder.find_exact();

    assert_eq!(report.duplicate_file_count(), 3);
    // Two redundant copies of 10 bytes each
    assert_eq!(report.wasted_space(), 20);
}

#[test]
fn test_exact_convenience_wrapper() {
    let dir = TempDir::new().unwrap();
    touch(&dir.path().join("x.txt"), b"dup");
    touch(&dir.path().join("y.txt"), b"dup");

    let report = dupescan::find_exact_duplicates(dir.path()).unwrap();
    assert_eq!(report.groups.len(), 1);
}

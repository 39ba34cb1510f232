//! The duplicate finder: scan, digest/fingerprint, group.
//!
//! # Overview
//!
//! [`DuplicateFinder`] drives the full pipeline for one root directory:
//! candidate enumeration (scan order), per-file digest or fingerprint
//! computation, and equivalence grouping. All configuration problems are
//! fatal at construction; once a finder exists, every find operation
//! returns a complete [`FindReport`] with per-file failures embedded,
//! never a partial silent result.
//!
//! # Concurrency
//!
//! Find operations are bounded synchronous calls. By default everything is
//! sequential. With [`FinderConfig::parallel`] set, per-file hashing and
//! fingerprinting run on the rayon pool; each result carries its scan index
//! and is re-associated to scan order before grouping, so group membership
//! and survivor selection never depend on completion order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::boundary::{BoundaryError, BoundaryGuard};
use crate::error::{ConfigError, FileFailure};
use crate::scanner::{
    is_image_extension, normalizer::is_source_extension, CandidateFile, CandidateWalker,
    ContentHasher, Fingerprint, PerceptualFingerprinter, SourceNormalizer, WalkerOptions,
};

use super::grouper::{
    cluster_by_fingerprint, group_by_digest, DuplicateGroup, EquivalenceKind,
};

/// Default Hamming threshold for perceptual clustering.
pub const DEFAULT_THRESHOLD: u32 = 5;

/// Configuration for a [`DuplicateFinder`].
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Glob patterns for candidate file names; empty means the per-path
    /// default (all files for exact, image extensions for perceptual,
    /// source extensions for source).
    pub patterns: Vec<String>,
    /// Sub-trees excluded from the scan, matched on resolved paths.
    pub ignore_dirs: Vec<PathBuf>,
    /// Hamming threshold for perceptual clustering (0..=64).
    pub threshold: u32,
    /// Compute per-file digests/fingerprints on the rayon pool.
    pub parallel: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            ignore_dirs: Vec::new(),
            threshold: DEFAULT_THRESHOLD,
            parallel: false,
        }
    }
}

/// Complete result of one find operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FindReport {
    /// Which equivalence notion was used.
    pub kind: EquivalenceKind,
    /// Groups with >= 2 members, ordered by first member's scan position.
    pub groups: Vec<DuplicateGroup>,
    /// Number of candidate files examined.
    pub scanned: usize,
    /// Files excluded by recoverable per-file errors.
    pub failures: Vec<FileFailure>,
}

impl FindReport {
    /// Whether any per-file failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Total number of files across all groups, survivors included.
    #[must_use]
    pub fn duplicate_file_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Number of non-survivor files across all groups; what delete/move
    /// would touch.
    #[must_use]
    pub fn redundant_file_count(&self) -> usize {
        self.groups.iter().map(|g| g.redundant().len()).sum()
    }

    /// Space reclaimable by keeping one survivor per group.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups.iter().map(DuplicateGroup::wasted_space).sum()
    }
}

/// Finds duplicate groups under a validated root directory.
#[derive(Debug)]
pub struct DuplicateFinder {
    boundary: BoundaryGuard,
    walker: CandidateWalker,
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder for `root`.
    ///
    /// # Errors
    ///
    /// All configuration problems are fatal here, before any scanning:
    /// nonexistent or non-directory root, invalid glob pattern, threshold
    /// beyond the fingerprint width.
    pub fn new(root: &Path, config: FinderConfig) -> Result<Self, ConfigError> {
        if config.threshold > Fingerprint::WIDTH {
            return Err(ConfigError::InvalidThreshold {
                threshold: config.threshold,
                max: Fingerprint::WIDTH,
            });
        }

        let boundary = BoundaryGuard::new(root).map_err(|e| match e {
            BoundaryError::RootNotFound(p) => ConfigError::RootNotFound(p),
            BoundaryError::RootNotADirectory(p) => ConfigError::RootNotADirectory(p),
            _ => ConfigError::RootNotFound(root.to_path_buf()),
        })?;

        let walker = CandidateWalker::new(
            boundary.root(),
            WalkerOptions {
                patterns: config.patterns.clone(),
                ignore_dirs: config.ignore_dirs.clone(),
            },
        )?;

        Ok(Self {
            boundary,
            walker,
            config,
        })
    }

    /// The canonical root being scanned.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.boundary.root()
    }

    /// The boundary guard for this finder's root.
    #[must_use]
    pub fn boundary(&self) -> &BoundaryGuard {
        &self.boundary
    }

    /// Find exact byte-equal duplicates via streaming BLAKE3 digests.
    #[must_use]
    pub fn find_exact(&self) -> FindReport {
        let candidates = self.walker.walk();
        let scanned = candidates.len();
        let hasher = ContentHasher::new();

        let (entries, failures) = self.compute(candidates, |file| {
            hasher
                .digest_file(&file.path)
                .map_err(|e| FileFailure::unreadable(file.path.clone(), e))
        });

        let groups = group_by_digest(entries, EquivalenceKind::Exact);
        log::info!(
            "exact scan: {} candidate(s), {} group(s), {} failure(s)",
            scanned,
            groups.len(),
            failures.len()
        );
        FindReport {
            kind: EquivalenceKind::Exact,
            groups,
            scanned,
            failures,
        }
    }

    /// Find visually similar images via fingerprint clustering.
    ///
    /// When no patterns are configured, candidates are restricted to known
    /// image extensions. Files that fail to decode are skipped with a
    /// warning and recorded as failures.
    #[must_use]
    pub fn find_perceptual(&self) -> FindReport {
        let mut candidates = self.walker.walk();
        if self.config.patterns.is_empty() {
            candidates.retain(|c| is_image_extension(&c.extension));
        }
        let scanned = candidates.len();
        let fingerprinter = PerceptualFingerprinter::new();

        let (entries, failures) = self.compute(candidates, |file| {
            fingerprinter
                .fingerprint(&file.path)
                .map_err(|e| FileFailure::unsupported(file.path.clone(), e))
        });

        let groups = cluster_by_fingerprint(entries, self.config.threshold);
        log::info!(
            "perceptual scan (threshold {}): {} candidate(s), {} cluster(s), {} failure(s)",
            self.config.threshold,
            scanned,
            groups.len(),
            failures.len()
        );
        FindReport {
            kind: EquivalenceKind::Perceptual,
            groups,
            scanned,
            failures,
        }
    }

    /// Find source files equal after whitespace/comment normalization.
    ///
    /// When no patterns are configured, candidates are restricted to
    /// recognized source extensions. Non-text files are skipped with a
    /// warning and recorded as failures.
    #[must_use]
    pub fn find_source(&self) -> FindReport {
        let mut candidates = self.walker.walk();
        if self.config.patterns.is_empty() {
            candidates.retain(|c| is_source_extension(&c.extension));
        }
        let scanned = candidates.len();
        let normalizer = SourceNormalizer::new();

        let (entries, failures) = self.compute(candidates, |file| {
            normalizer.digest_file(&file.path).map_err(|e| match &e {
                crate::scanner::normalizer::NormalizeError::Unreadable { .. } => {
                    FileFailure::unreadable(file.path.clone(), e)
                }
                crate::scanner::normalizer::NormalizeError::NotText(_) => {
                    FileFailure::unsupported(file.path.clone(), e)
                }
            })
        });

        let groups = group_by_digest(entries, EquivalenceKind::Source);
        log::info!(
            "source scan: {} candidate(s), {} group(s), {} failure(s)",
            scanned,
            groups.len(),
            failures.len()
        );
        FindReport {
            kind: EquivalenceKind::Source,
            groups,
            scanned,
            failures,
        }
    }

    /// Run a per-file computation over candidates, preserving scan order.
    ///
    /// Failures are logged at warn level and collected; successful entries
    /// come back in scan order regardless of the execution mode.
    fn compute<T, F>(
        &self,
        candidates: Vec<CandidateFile>,
        per_file: F,
    ) -> (Vec<(CandidateFile, T)>, Vec<FileFailure>)
    where
        T: Send,
        F: Fn(&CandidateFile) -> Result<T, FileFailure> + Sync,
    {
        let mut results: Vec<(usize, CandidateFile, Result<T, FileFailure>)> =
            if self.config.parallel {
                let mut computed: Vec<_> = candidates
                    .into_par_iter()
                    .enumerate()
                    .map(|(index, file)| {
                        let result = per_file(&file);
                        (index, file, result)
                    })
                    .collect();
                // Re-associate to scan order; grouping must never observe
                // completion order.
                computed.sort_by_key(|(index, _, _)| *index);
                computed
            } else {
                candidates
                    .into_iter()
                    .enumerate()
                    .map(|(index, file)| {
                        let result = per_file(&file);
                        (index, file, result)
                    })
                    .collect()
            };

        let mut entries = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (_, file, result) in results.drain(..) {
            match result {
                Ok(value) => entries.push((file, value)),
                Err(failure) => {
                    log::warn!("skipping {}: {}", failure.path.display(), failure.message);
                    failures.push(failure);
                }
            }
        }
        (entries, failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let err = DuplicateFinder::new(Path::new("/no/such/root"), FinderConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::RootNotFound(_)));
    }

    #[test]
    fn test_new_rejects_wide_threshold() {
        let dir = tempdir().unwrap();
        let config = FinderConfig {
            threshold: 65,
            ..Default::default()
        };
        let err = DuplicateFinder::new(dir.path(), config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold { .. }));
    }

    #[test]
    fn test_find_exact_spec_scenario() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.txt"), "foo");
        touch(&dir.path().join("b.txt"), "foo");
        touch(&dir.path().join("c.txt"), "bar");

        let config = FinderConfig {
            patterns: vec!["*.txt".to_string()],
            ..Default::default()
        };
        let finder = DuplicateFinder::new(dir.path(), config).unwrap();
        let report = finder.find_exact();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.groups.len(), 1);
        let names: Vec<_> = report.groups[0]
            .files
            .iter()
            .map(CandidateFile::file_name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_report_counts_total_and_redundant() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.txt"), "dup");
        touch(&dir.path().join("b.txt"), "dup");
        touch(&dir.path().join("unique.txt"), "solo");

        let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
        let report = finder.find_exact();

        // Total includes the survivor, redundant does not
        assert_eq!(report.duplicate_file_count(), 2);
        assert_eq!(report.redundant_file_count(), 1);
    }

    #[test]
    fn test_find_exact_idempotent() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("x1.bin"), "same");
        touch(&dir.path().join("x2.bin"), "same");
        touch(&dir.path().join("y1.bin"), "other");
        touch(&dir.path().join("y2.bin"), "other");

        let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
        let first = finder.find_exact();
        let second = finder.find_exact();

        assert_eq!(first.groups.len(), second.groups.len());
        for (a, b) in first.groups.iter().zip(second.groups.iter()) {
            assert_eq!(a.key, b.key);
            assert_eq!(a.paths(), b.paths());
        }
    }

    #[test]
    fn test_find_exact_parallel_matches_sequential() {
        let dir = tempdir().unwrap();
        for i in 0..20 {
            touch(&dir.path().join(format!("f{i:02}.dat")), &(i % 4).to_string());
        }

        let sequential = DuplicateFinder::new(dir.path(), FinderConfig::default())
            .unwrap()
            .find_exact();
        let parallel = DuplicateFinder::new(
            dir.path(),
            FinderConfig {
                parallel: true,
                ..Default::default()
            },
        )
        .unwrap()
        .find_exact();

        assert_eq!(sequential.groups.len(), parallel.groups.len());
        for (a, b) in sequential.groups.iter().zip(parallel.groups.iter()) {
            assert_eq!(a.key, b.key);
            assert_eq!(a.paths(), b.paths());
        }
    }

    #[test]
    fn test_find_source_ignores_formatting() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("one.py"), "print('hello')");
        touch(&dir.path().join("two.py"), "print( 'hello' )  # noqa");
        touch(&dir.path().join("three.py"), "print('world')");
        touch(&dir.path().join("notes.txt"), "print('hello')");

        let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
        let report = finder.find_source();

        // notes.txt is not a source extension and is not scanned
        assert_eq!(report.scanned, 3);
        assert_eq!(report.groups.len(), 1);
        let names: Vec<_> = report.groups[0]
            .files
            .iter()
            .map(CandidateFile::file_name)
            .collect();
        assert_eq!(names, vec!["one.py", "two.py"]);
    }

    #[test]
    fn test_find_source_records_binary_failure() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.py"), "x = 1");
        fs::write(dir.path().join("bad.py"), [0xff, 0x00, 0x99]).unwrap();

        let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
        let report = finder.find_source();

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("bad.py"));
    }

    #[test]
    fn test_find_perceptual_records_decode_failure() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("fake.png"), "not an image at all");

        let finder = DuplicateFinder::new(dir.path(), FinderConfig::default()).unwrap();
        let report = finder.find_perceptual();

        assert_eq!(report.scanned, 1);
        assert!(report.groups.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_ignore_dirs_respected() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("a.txt"), "dup");
        touch(&dir.path().join("b.txt"), "dup");
        touch(&dir.path().join("ignored/c.txt"), "dup");

        let config = FinderConfig {
            ignore_dirs: vec![PathBuf::from("ignored")],
            ..Default::default()
        };
        let finder = DuplicateFinder::new(dir.path(), config).unwrap();
        let report = finder.find_exact();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].len(), 2);
    }
}

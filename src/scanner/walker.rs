//! Candidate discovery through deterministic directory traversal.
//!
//! # Overview
//!
//! [`CandidateWalker`] enumerates files under a root in sorted (lexicographic
//! by file name) order. The resulting sequence defines the *scan order* that
//! the rest of the engine relies on: group membership lists preserve it and
//! the first member of every group is the survivor for delete/move actions.
//!
//! Filtering:
//! - Extension/glob patterns (`*.txt`) are matched against file names with a
//!   compiled [`GlobSet`]; no patterns means every file is a candidate.
//! - Ignored sub-trees are pruned by comparing resolved directory paths, an
//!   ancestor-of test rather than string prefixes, so `logs` never swallows
//!   `logs2`.
//!
//! Traversal errors (unreadable directories, vanished entries) are logged at
//! warn level and skipped; they never abort the walk.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::ConfigError;

use super::CandidateFile;

/// Options controlling candidate discovery.
#[derive(Debug, Clone, Default)]
pub struct WalkerOptions {
    /// Glob patterns matched against file names (e.g. `*.txt`).
    /// Empty means all files are candidates.
    pub patterns: Vec<String>,
    /// Directories whose sub-trees are excluded from the scan.
    /// Relative paths are interpreted against the root.
    pub ignore_dirs: Vec<PathBuf>,
}

/// Deterministic directory walker producing candidates in scan order.
#[derive(Debug)]
pub struct CandidateWalker {
    root: PathBuf,
    matcher: Option<GlobSet>,
    ignore_dirs: Vec<PathBuf>,
}

impl CandidateWalker {
    /// Create a walker for an already-canonicalized root.
    ///
    /// Ignore directories are resolved up front; ones that do not exist
    /// cannot contain candidates and are dropped with a debug log.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if a glob pattern fails to
    /// compile.
    pub fn new(root: &Path, options: WalkerOptions) -> Result<Self, ConfigError> {
        let matcher = build_matcher(&options.patterns)?;

        let mut ignore_dirs = Vec::with_capacity(options.ignore_dirs.len());
        for dir in &options.ignore_dirs {
            let absolute = if dir.is_absolute() {
                dir.clone()
            } else {
                root.join(dir)
            };
            match absolute.canonicalize() {
                Ok(resolved) => ignore_dirs.push(resolved),
                Err(e) => {
                    log::debug!(
                        "ignore directory {} not resolvable, skipping: {}",
                        absolute.display(),
                        e
                    );
                }
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            matcher,
            ignore_dirs,
        })
    }

    /// Enumerate candidate files in scan order.
    ///
    /// Symlinks are not followed. Unreadable entries are logged and skipped.
    #[must_use]
    pub fn walk(&self) -> Vec<CandidateFile> {
        let mut candidates = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored_dir(entry.path(), entry.file_type().is_dir()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            if !self.matches(entry.path()) {
                continue;
            }

            match entry.metadata() {
                Ok(meta) => {
                    candidates.push(CandidateFile::new(entry.path().to_path_buf(), meta.len()));
                }
                Err(e) => {
                    log::warn!("skipping {}: {}", entry.path().display(), e);
                }
            }
        }

        log::debug!(
            "walk of {} produced {} candidate(s)",
            self.root.display(),
            candidates.len()
        );
        candidates
    }

    /// Check a file name against the configured glob patterns.
    fn matches(&self, path: &Path) -> bool {
        match &self.matcher {
            Some(set) => path
                .file_name()
                .is_some_and(|name| set.is_match(Path::new(name))),
            None => true,
        }
    }

    /// Ancestor test against resolved ignore directories.
    ///
    /// The walker does not follow symlinks, so entry paths under the
    /// canonical root are already resolved.
    fn is_ignored_dir(&self, path: &Path, is_dir: bool) -> bool {
        if !is_dir {
            return false;
        }
        self.ignore_dirs.iter().any(|dir| path.starts_with(dir))
    }
}

/// Compile glob patterns into a matcher; `None` when no patterns are given.
fn build_matcher(patterns: &[String]) -> Result<Option<GlobSet>, ConfigError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
    Ok(Some(set))
}

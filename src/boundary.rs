//! Root-boundary enforcement for all file-system operations.
//!
//! # Overview
//!
//! Every path the engine touches must resolve to a descendant of a declared
//! root directory. [`BoundaryGuard`] canonicalizes the root once and then
//! validates candidate paths against it, so symlink or `..` tricks cannot
//! redirect a delete or move outside the intended tree.
//!
//! Violations are rejected with [`BoundaryError::Violation`], never silently
//! clamped back inside the root.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::boundary::BoundaryGuard;
//! use std::path::Path;
//!
//! let guard = BoundaryGuard::new(Path::new("/data/photos"))?;
//! let inside = guard.resolve(Path::new("/data/photos/2024/img.png"))?;
//! assert!(guard.contains(&inside));
//!
//! // Escapes the root: rejected
//! assert!(guard.resolve(Path::new("/data/photos/../secrets")).is_err());
//! # Ok::<(), dupescan::boundary::BoundaryError>(())
//! ```

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors raised while validating paths against a root boundary.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The declared root does not exist.
    #[error("root does not exist: {0}")]
    RootNotFound(PathBuf),

    /// The declared root is not a directory.
    #[error("root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// A resolved path escapes the declared root.
    #[error("path escapes root boundary: {path} is outside {root}")]
    Violation {
        /// The offending path, after resolution.
        path: PathBuf,
        /// The canonical root it escaped.
        root: PathBuf,
    },

    /// An I/O error occurred while resolving a path.
    #[error("I/O error resolving {path}: {source}")]
    Io {
        /// Path that could not be resolved.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Validates that paths stay inside a declared root directory.
///
/// The root is canonicalized once at construction. [`BoundaryGuard::resolve`]
/// canonicalizes candidate paths (following symlinks for the existing part)
/// and accepts them only if they are equal to or descend from the root.
#[derive(Debug, Clone)]
pub struct BoundaryGuard {
    root: PathBuf,
}

impl BoundaryGuard {
    /// Create a guard for the given root directory.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::RootNotFound`] if the root does not exist and
    /// [`BoundaryError::RootNotADirectory`] if it is not a directory.
    pub fn new(root: &Path) -> Result<Self, BoundaryError> {
        if !root.exists() {
            return Err(BoundaryError::RootNotFound(root.to_path_buf()));
        }
        let canonical = root.canonicalize().map_err(|source| BoundaryError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !canonical.is_dir() {
            return Err(BoundaryError::RootNotADirectory(canonical));
        }
        Ok(Self { root: canonical })
    }

    /// The canonical root this guard enforces.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path and verify it lies inside the root.
    ///
    /// The path does not have to exist: the deepest existing ancestor is
    /// canonicalized (following symlinks) and the remaining components are
    /// re-appended after lexical `.`/`..` normalization. This lets a move
    /// target that will be created later still be validated.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Violation`] if the resolved path is not equal
    /// to or a descendant of the root.
    pub fn resolve(&self, path: &Path) -> Result<PathBuf, BoundaryError> {
        let resolved = resolve_lenient(path).map_err(|source| BoundaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if self.contains(&resolved) {
            Ok(resolved)
        } else {
            log::warn!(
                "rejected path outside root: {} (root: {})",
                resolved.display(),
                self.root.display()
            );
            Err(BoundaryError::Violation {
                path: resolved,
                root: self.root.clone(),
            })
        }
    }

    /// Ancestor test on an already-resolved path.
    #[must_use]
    pub fn contains(&self, resolved: &Path) -> bool {
        resolved.starts_with(&self.root)
    }
}

/// Canonicalize a path that may not fully exist yet.
///
/// The nearest existing ancestor is canonicalized; non-existing trailing
/// components are normalized lexically and re-appended.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    let normalized = lexical_normalize(&absolute);

    if let Ok(canonical) = normalized.canonicalize() {
        return Ok(canonical);
    }

    // Walk up to the nearest existing ancestor, then re-append the tail.
    let mut existing = normalized.clone();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    loop {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                let parent = parent.to_path_buf();
                if let Ok(canonical) = parent.canonicalize() {
                    let mut out = canonical;
                    for name in tail.iter().rev() {
                        out.push(name);
                    }
                    return Ok(out);
                }
                existing = parent;
            }
            _ => return Ok(normalized),
        }
    }
}

/// Resolve `.` and `..` components without touching the file system.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push(Component::ParentDir);
                }
            }
            other => out.push(other),
        }
    }
    out
}

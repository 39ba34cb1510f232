//! Scanner module: candidate enumeration and per-file content digests.
//!
//! This module provides functionality for:
//! - Deterministic, sorted directory traversal with glob filtering
//! - Streaming BLAKE3 content hashing (exact equality)
//! - Perceptual image fingerprinting (visual similarity)
//! - Whitespace/comment normalization of source files (source equality)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: directory traversal and candidate discovery
//! - [`hasher`]: streaming BLAKE3 file hashing
//! - [`perceptual`]: 64-bit image fingerprints with Hamming distance
//! - [`normalizer`]: comment/whitespace normalization and hashing
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{CandidateWalker, WalkerOptions};
//! use std::path::Path;
//!
//! let walker = CandidateWalker::new(Path::new("."), WalkerOptions::default())?;
//! for candidate in walker.walk() {
//!     println!("{}: {} bytes", candidate.path.display(), candidate.size);
//! }
//! # Ok::<(), dupescan::error::ConfigError>(())
//! ```

pub mod hasher;
pub mod normalizer;
pub mod perceptual;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use hasher::ContentHasher;
pub use normalizer::SourceNormalizer;
pub use perceptual::{Fingerprint, PerceptualFingerprinter};
pub use walker::{CandidateWalker, WalkerOptions};

/// A file discovered by the scanner.
///
/// Candidates are produced in scan order (sorted directory-walk order) and
/// are immutable once produced. The scan position of a candidate decides
/// which group member becomes the survivor when actions are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFile {
    /// Resolved absolute path to the file.
    pub path: PathBuf,
    /// Lowercased extension without the leading dot, empty if none.
    pub extension: String,
    /// File size in bytes.
    pub size: u64,
}

impl CandidateFile {
    /// Create a candidate from a resolved path and its size.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        Self {
            path,
            extension,
            size,
        }
    }

    /// The file name component, lossily converted.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// File extensions the perceptual path treats as images by default.
pub const IMAGE_EXTENSIONS: &[&str] = &["bmp", "gif", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

/// Check whether an extension (without dot, lowercase) is a known image type.
#[must_use]
pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension)
}

/// Check whether a path carries a known image extension.
#[must_use]
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| is_image_extension(&e.to_lowercase()))
}

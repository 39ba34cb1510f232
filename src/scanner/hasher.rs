//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`ContentHasher`] computes BLAKE3 digests of file contents by streaming
//! fixed-size blocks (64 KiB by default), so peak memory stays constant no
//! matter how large the file is. Two files with identical bytes always
//! produce identical digests; that digest is the equivalence key for the
//! exact-duplicate path.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Block size used when streaming file contents.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Errors that can occur during file hashing.
#[derive(Debug, Error)]
pub enum HashError {
    /// The specified file was not found.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl HashError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Streaming BLAKE3 content hasher.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    block_size: usize,
}

impl ContentHasher {
    /// Create a hasher using the default 64 KiB block size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            block_size: BLOCK_SIZE,
        }
    }

    /// Create a hasher with a custom block size (must be non-zero).
    #[must_use]
    pub fn with_block_size(block_size: usize) -> Self {
        debug_assert!(block_size > 0, "block size must be non-zero");
        Self { block_size }
    }

    /// Compute the hex digest of a file's contents.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn digest_file(&self, path: &Path) -> Result<String, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.block_size];

        loop {
            let read = file
                .read(&mut buffer)
                .map_err(|e| HashError::from_io(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(hasher.finalize().to_hex().to_string())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

//! Perceptual image fingerprinting for similarity detection.
//!
//! # Overview
//!
//! [`PerceptualFingerprinter`] decodes an image and derives a fixed 64-bit
//! gradient (dHash) fingerprint that stays stable under resizing and
//! re-encoding. Two images are considered visually equivalent when the
//! Hamming distance between their fingerprints is at or below a caller
//! supplied threshold; [`Fingerprint::distance`] computes that distance.

use std::path::{Path, PathBuf};

use image_hasher::{HashAlg, HasherConfig};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during fingerprinting.
#[derive(Debug, Error)]
pub enum PerceptualError {
    /// Failed to open or decode the image.
    #[error("failed to load image {0}: {1}")]
    Load(PathBuf, #[source] image::ImageError),

    /// The computed hash did not have the expected 64-bit width.
    #[error("unexpected fingerprint width for {0}")]
    Width(PathBuf),
}

/// A fixed-width (64-bit) visual similarity fingerprint.
///
/// Treated as an opaque bit vector: the only meaningful operation between
/// two fingerprints is their Hamming distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint width in bits.
    pub const WIDTH: u32 = 64;

    /// Construct a fingerprint from raw bits.
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// The raw bit vector.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance to another fingerprint (0..=64).
    #[must_use]
    pub fn distance(&self, other: &Fingerprint) -> u32 {
        (self.0 ^ other.0).count_ones()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Computes 64-bit gradient fingerprints for images.
pub struct PerceptualFingerprinter {
    hasher: image_hasher::Hasher,
}

impl PerceptualFingerprinter {
    /// Create a fingerprinter using an 8x8 gradient (dHash) configuration.
    #[must_use]
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::Gradient)
            .hash_size(8, 8)
            .to_hasher();
        Self { hasher }
    }

    /// Decode an image and compute its fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptualError::Load`] when the file cannot be opened or
    /// decoded as an image.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, PerceptualError> {
        let img =
            image::open(path).map_err(|e| PerceptualError::Load(path.to_path_buf(), e))?;

        let hash = self.hasher.hash_image(&img);
        let bytes: [u8; 8] = hash
            .as_bytes()
            .try_into()
            .map_err(|_| PerceptualError::Width(path.to_path_buf()))?;
        Ok(Fingerprint::from_bits(u64::from_le_bytes(bytes)))
    }
}

impl Default for PerceptualFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

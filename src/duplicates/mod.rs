//! Duplicate detection: equivalence grouping and the finder pipeline.

pub mod finder;
pub mod grouper;

pub use finder::{DuplicateFinder, FindReport, FinderConfig, DEFAULT_THRESHOLD};
pub use grouper::{
    cluster_by_fingerprint, group_by_digest, DuplicateGroup, EquivalenceKey, EquivalenceKind,
};

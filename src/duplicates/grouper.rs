//! Equivalence groups and the strategies that build them.
//!
//! # Overview
//!
//! A [`DuplicateGroup`] is an ordered set of two or more files judged
//! equivalent under one of three notions, tagged with its
//! [`EquivalenceKind`]. Groups preserve scan order: the first member is the
//! survivor when actions are applied. Singleton groups are discarded before
//! results are returned, so `files.len() >= 2` always holds.
//!
//! Two grouping strategies exist:
//! - [`group_by_digest`]: exact and source equality, keyed by a digest
//!   string; membership is key equality.
//! - [`cluster_by_fingerprint`]: perceptual similarity. Fingerprint
//!   equality is not required; two files are equivalent when the Hamming
//!   distance between their fingerprints is at or below the threshold.
//!
//! # Clustering policy
//!
//! Threshold similarity is not transitive, so clustering needs a documented
//! merging policy. This implementation builds the full pairwise threshold
//! graph and takes its connected components via union-find. Compared to the
//! greedy first-matching-representative alternative this is O(n^2) in the
//! number of fingerprints, but it is symmetric, independent of scan order,
//! and monotone in the threshold: raising the threshold only ever merges
//! clusters, and threshold 0 degenerates to exact fingerprint equality.
//! Fingerprints are 8 bytes each, so the pairwise pass stays cheap for
//! realistic image sets.

use std::collections::HashMap;

use serde::Serialize;

use crate::scanner::{CandidateFile, Fingerprint};

/// Which notion of equivalence produced a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EquivalenceKind {
    /// Exact byte equality (BLAKE3 digest).
    Exact,
    /// Perceptual visual similarity (fingerprint clustering).
    Perceptual,
    /// Whitespace/comment-normalized source equality (XXH3-128 digest).
    Source,
}

impl std::fmt::Display for EquivalenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Perceptual => write!(f, "perceptual"),
            Self::Source => write!(f, "source"),
        }
    }
}

/// Key identifying an equivalence group.
///
/// For digest-based groups the key is globally unique: equal key means
/// equal content. For perceptual clusters the key is only an identifier
/// (representative fingerprint plus a generation counter); membership was
/// decided by distance, not key equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EquivalenceKey {
    /// Hex digest of file content (exact) or normalized content (source).
    Digest(String),
    /// Perceptual cluster identity.
    Cluster {
        /// Fingerprint of the cluster's first member in scan order.
        representative: Fingerprint,
        /// Ordinal of the cluster in scan order.
        generation: usize,
    },
}

impl std::fmt::Display for EquivalenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Digest(d) => write!(f, "{d}"),
            Self::Cluster {
                representative,
                generation,
            } => write!(f, "cluster-{generation:04}:{representative}"),
        }
    }
}

/// An ordered set of >= 2 equivalent files.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Group key or cluster identity.
    pub key: EquivalenceKey,
    /// Which equivalence notion built this group.
    pub kind: EquivalenceKind,
    /// Members in scan order; the first is the survivor.
    pub files: Vec<CandidateFile>,
}

impl DuplicateGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Groups are never empty; kept for container-like completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The member retained in place by delete/move actions.
    #[must_use]
    pub fn survivor(&self) -> &CandidateFile {
        &self.files[0]
    }

    /// The members subject to delete/move actions.
    #[must_use]
    pub fn redundant(&self) -> &[CandidateFile] {
        &self.files[1..]
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Space reclaimable by keeping only the survivor.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.total_size().saturating_sub(self.files[0].size)
    }

    /// Just the member paths, in scan order.
    #[must_use]
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Group digest-keyed entries, dropping singletons.
///
/// `entries` must be in scan order; member order within each group and the
/// order of groups (by first member) both preserve it.
#[must_use]
pub fn group_by_digest(
    entries: Vec<(CandidateFile, String)>,
    kind: EquivalenceKind,
) -> Vec<DuplicateGroup> {
    let mut members: HashMap<String, Vec<CandidateFile>> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for (file, digest) in entries {
        let slot = members.entry(digest.clone()).or_default();
        if slot.is_empty() {
            first_seen.push(digest);
        }
        slot.push(file);
    }

    let mut groups = Vec::new();
    for digest in first_seen {
        let files = members.remove(&digest).unwrap_or_default();
        if files.len() < 2 {
            log::trace!("dropping singleton digest group {digest}");
            continue;
        }
        groups.push(DuplicateGroup {
            key: EquivalenceKey::Digest(digest),
            kind,
            files,
        });
    }
    groups
}

/// Cluster fingerprinted entries by threshold similarity, dropping
/// singletons.
///
/// Connected components of the pairwise threshold graph (see module docs);
/// `entries` must be in scan order.
#[must_use]
pub fn cluster_by_fingerprint(
    entries: Vec<(CandidateFile, Fingerprint)>,
    threshold: u32,
) -> Vec<DuplicateGroup> {
    let mut dsu = DisjointSet::new(entries.len());
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if entries[i].1.distance(&entries[j].1) <= threshold {
                dsu.union(i, j);
            }
        }
    }

    // Collect components; iterating indices in ascending order keeps each
    // member list in scan order, with the first member at indices[0].
    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..entries.len() {
        components.entry(dsu.find(i)).or_default().push(i);
    }

    let mut ordered: Vec<Vec<usize>> = components
        .into_values()
        .filter(|indices| indices.len() >= 2)
        .collect();
    ordered.sort_by_key(|indices| indices[0]);

    let mut files_by_index: Vec<Option<(CandidateFile, Fingerprint)>> =
        entries.into_iter().map(Some).collect();

    ordered
        .into_iter()
        .enumerate()
        .map(|(generation, indices)| {
            let representative = files_by_index[indices[0]]
                .as_ref()
                .map(|(_, fp)| *fp)
                .unwrap_or(Fingerprint::from_bits(0));
            let files = indices
                .into_iter()
                .filter_map(|i| files_by_index[i].take().map(|(f, _)| f))
                .collect();
            DuplicateGroup {
                key: EquivalenceKey::Cluster {
                    representative,
                    generation,
                },
                kind: EquivalenceKind::Perceptual,
                files,
            }
        })
        .collect()
}

/// Union-find with path compression and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

//! # Grouper Module
//!
//! Groups cached photos by exact fingerprint equality.
//!
//! Grouping is a pure function of the cache: no filesystem access, no
//! tolerance. Groups appear in the order their fingerprint is first seen
//! while walking the cache in path order, and paths within a group keep
//! that order too, so the same cache always yields the same groups.

use crate::core::cache::HashCache;
use crate::core::hasher::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// All known photos sharing one fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The shared fingerprint
    pub fingerprint: Fingerprint,
    /// Photos in the group (always two or more)
    pub photos: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Number of photos beyond the first
    pub fn duplicate_count(&self) -> usize {
        self.photos.len().saturating_sub(1)
    }
}

/// Group cache entries by fingerprint, keeping groups of two or more
pub fn group(cache: &HashCache) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&Fingerprint, usize> = HashMap::new();
    let mut buckets: Vec<(&Fingerprint, Vec<PathBuf>)> = Vec::new();

    for (path, fingerprint) in cache.iter() {
        let slot = *index.entry(fingerprint).or_insert_with(|| {
            buckets.push((fingerprint, Vec::new()));
            buckets.len() - 1
        });
        buckets[slot].1.push(path.clone());
    }

    buckets
        .into_iter()
        .filter(|(_, photos)| photos.len() >= 2)
        .map(|(fingerprint, photos)| DuplicateGroup {
            fingerprint: fingerprint.clone(),
            photos,
        })
        .collect()
}

//! # Cache Module
//!
//! Persists fingerprints to avoid recomputation.
//!
//! ## Behaviour
//! - Keyed by image path; one fingerprint per path
//! - Append-and-update: entries are never pruned, even when the file
//!   behind them is gone
//! - Failed fingerprints are never stored, so they are retried next run
//! - Persisted once per batch, atomically, as path-sorted JSON
//!
//! ## Backends
//! - `JsonCacheStore` - Persistent storage in a JSON file
//! - `InMemoryStore` - For testing

mod json;
mod memory;
mod traits;

pub use json::JsonCacheStore;
pub use memory::InMemoryStore;
pub use traits::CacheStore;

use crate::core::hasher::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Path-keyed fingerprint cache
///
/// Ordered by path so that persisted output and grouping are stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashCache {
    entries: BTreeMap<PathBuf, Fingerprint>,
}

/// Outcome of merging a batch into the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Entries inserted or overwritten
    pub stored: usize,
    /// Entries dropped because no fingerprint was computed
    pub dropped: usize,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Number of distinct fingerprints among the entries
    pub distinct_fingerprints: usize,
}

impl HashCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the fingerprint for a path
    pub fn get(&self, path: &Path) -> Option<&Fingerprint> {
        self.entries.get(path)
    }

    /// Whether a path has a cached fingerprint
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Insert or overwrite a single entry, returning the previous value
    pub fn insert(&mut self, path: PathBuf, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.entries.insert(path, fingerprint)
    }

    /// Iterate entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &Fingerprint)> {
        self.entries.iter()
    }

    /// Paths with no cached fingerprint, deduplicated, in input order
    pub fn missing(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen: HashSet<&Path> = HashSet::new();
        let mut missing = Vec::new();

        for path in paths {
            if !self.contains(path) && seen.insert(path.as_path()) {
                missing.push(path.clone());
            }
        }

        missing
    }

    /// Merge computed results into the cache.
    ///
    /// `Some` fingerprints are inserted or overwrite the existing entry;
    /// `None` results are dropped and leave any existing entry untouched.
    /// For results on distinct paths the final cache does not depend on
    /// the order of `updates`.
    pub fn merge<I>(&mut self, updates: I) -> MergeStats
    where
        I: IntoIterator<Item = (PathBuf, Option<Fingerprint>)>,
    {
        let mut stats = MergeStats::default();

        for (path, fingerprint) in updates {
            match fingerprint {
                Some(fingerprint) => {
                    self.entries.insert(path, fingerprint);
                    stats.stored += 1;
                }
                None => stats.dropped += 1,
            }
        }

        stats
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let distinct: HashSet<&Fingerprint> = self.entries.values().collect();
        CacheStats {
            total_entries: self.entries.len(),
            distinct_fingerprints: distinct.len(),
        }
    }
}

impl FromIterator<(PathBuf, Fingerprint)> for HashCache {
    fn from_iter<T: IntoIterator<Item = (PathBuf, Fingerprint)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

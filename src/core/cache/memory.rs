//! In-memory cache backend for testing.

use super::{CacheStore, HashCache};
use crate::error::CacheError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory cache backend
///
/// Counts persists so tests can check that a batch is saved once.
pub struct InMemoryStore {
    saved: RwLock<Option<HashCache>>,
    persist_count: AtomicUsize,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            saved: RwLock::new(None),
            persist_count: AtomicUsize::new(0),
        }
    }

    /// Create a store that already holds `cache`
    pub fn with_cache(cache: HashCache) -> Self {
        Self {
            saved: RwLock::new(Some(cache)),
            persist_count: AtomicUsize::new(0),
        }
    }

    /// Number of times `persist` has been called
    pub fn persist_count(&self) -> usize {
        self.persist_count.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for InMemoryStore {
    fn load(&self) -> Result<HashCache, CacheError> {
        let saved = self.saved.read().map_err(|_| CacheError::Corrupted {
            path: PathBuf::from("memory"),
            reason: "lock poisoned".to_string(),
        })?;

        Ok(saved.clone().unwrap_or_default())
    }

    fn persist(&self, cache: &HashCache) -> Result<(), CacheError> {
        let mut saved = self.saved.write().map_err(|_| CacheError::PersistFailed {
            path: PathBuf::from("memory"),
            reason: "lock poisoned".to_string(),
        })?;

        *saved = Some(cache.clone());
        self.persist_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::Fingerprint;

    #[test]
    fn empty_store_loads_empty_cache() {
        let store = InMemoryStore::new();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn persist_then_load_returns_same_cache() {
        let store = InMemoryStore::new();
        let mut cache = HashCache::new();
        cache.insert(PathBuf::from("/a.jpg"), Fingerprint::from("aa"));

        store.persist(&cache).unwrap();

        assert_eq!(store.load().unwrap(), cache);
        assert_eq!(store.persist_count(), 1);
    }
}

//! JSON file cache backend.

use super::{CacheStore, HashCache};
use crate::core::atomic::write_json_atomically;
use crate::error::CacheError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name used when no cache path is configured
pub const DEFAULT_CACHE_FILE: &str = "image_hashes.json";

/// Cache backend storing a `path -> fingerprint` JSON object
///
/// The file is pretty-printed with keys sorted by path, so it diffs
/// cleanly between runs.
pub struct JsonCacheStore {
    path: PathBuf,
}

impl JsonCacheStore {
    /// Use the cache file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<user cache dir>/photo-dedup/image_hashes.json`,
    /// or the working directory when there is no user cache dir
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .map(|dir| dir.join("photo-dedup").join(DEFAULT_CACHE_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE))
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonCacheStore {
    fn load(&self) -> Result<HashCache, CacheError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no cache file, starting empty");
                return Ok(HashCache::new());
            }
            Err(e) => {
                return Err(CacheError::ReadFailed {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let cache: HashCache =
            serde_json::from_str(&contents).map_err(|e| CacheError::Corrupted {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            path = %self.path.display(),
            entries = cache.len(),
            "loaded fingerprint cache"
        );
        Ok(cache)
    }

    fn persist(&self, cache: &HashCache) -> Result<(), CacheError> {
        write_json_atomically(&self.path, cache).map_err(|e| CacheError::PersistFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        info!(
            path = %self.path.display(),
            entries = cache.len(),
            "persisted fingerprint cache"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::Fingerprint;
    use tempfile::TempDir;

    fn sample_cache() -> HashCache {
        vec![
            (PathBuf::from("/photos/b.jpg"), Fingerprint::from("beef")),
            (PathBuf::from("/photos/a.jpg"), Fingerprint::from("cafe")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn missing_file_loads_empty_cache() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path().join("image_hashes.json"));

        let cache = store.load().unwrap();

        assert!(cache.is_empty());
    }

    #[test]
    fn persisted_cache_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path().join("image_hashes.json"));

        store.persist(&sample_cache()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, sample_cache());
    }

    #[test]
    fn persisted_file_is_sorted_and_indented() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image_hashes.json");
        let store = JsonCacheStore::new(&path);

        store.persist(&sample_cache()).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert_eq!(
            contents,
            "{\n  \"/photos/a.jpg\": \"cafe\",\n  \"/photos/b.jpg\": \"beef\"\n}\n"
        );
    }

    #[test]
    fn persist_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("cache.json");
        let store = JsonCacheStore::new(&path);

        store.persist(&sample_cache()).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn corrupt_file_is_reported_and_left_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image_hashes.json");
        fs::write(&path, "{ \"/a.jpg\": ").unwrap();
        let store = JsonCacheStore::new(&path);

        let error = store.load().unwrap_err();

        assert!(matches!(error, CacheError::Corrupted { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"/a.jpg\": ");
    }

    #[test]
    fn wrong_shape_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image_hashes.json");
        fs::write(&path, "[\"/a.jpg\", \"cafe\"]").unwrap();

        let error = JsonCacheStore::new(&path).load().unwrap_err();

        assert!(matches!(error, CacheError::Corrupted { .. }));
    }

    #[test]
    fn persist_failure_is_surfaced() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the parent directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let store = JsonCacheStore::new(blocker.join("cache.json"));

        let cache = sample_cache();
        let error = store.persist(&cache).unwrap_err();

        assert!(matches!(error, CacheError::PersistFailed { .. }));
        assert_eq!(cache.len(), 2);
    }
}

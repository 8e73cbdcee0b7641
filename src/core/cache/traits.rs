//! Cache store trait definition.

use super::HashCache;
use crate::error::CacheError;

/// Durable storage for a [`HashCache`]
pub trait CacheStore: Send + Sync {
    /// Load the persisted cache.
    ///
    /// Returns an empty cache when nothing has been persisted yet. A
    /// persisted artifact that cannot be parsed is an error and is left
    /// untouched.
    fn load(&self) -> Result<HashCache, CacheError>;

    /// Replace the persisted cache with `cache`.
    ///
    /// Called once per batch. On failure the caller still owns `cache`
    /// and may retry.
    fn persist(&self, cache: &HashCache) -> Result<(), CacheError>;

    /// Human-readable location for log messages
    fn describe(&self) -> String;
}

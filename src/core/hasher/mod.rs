//! # Hasher Module
//!
//! Computes perceptual fingerprints for images.
//!
//! ## Supported Algorithms
//! - **pHash (Perceptual Hash)** - DCT-based, the default
//! - **aHash (Average Hash)** - Fastest, good for exact duplicates
//! - **dHash (Difference Hash)** - Brightness gradients
//! - **Double gradient** - Row and column gradients
//!
//! ## How It Works
//! 1. Decode the file (zune-jpeg for JPEG, image crate otherwise)
//! 2. Reduce to a `hash_size` x `hash_size` grid
//! 3. Set one bit per cell relative to its neighbours or the mean
//! 4. Render the bits as lowercase hex
//!
//! ## Example
//! ```rust,ignore
//! use photo_dedup::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Perceptual)
//!     .hash_size(16)
//!     .build()?;
//!
//! let fingerprint = hasher.fingerprint_file(&path)?;
//! ```

pub mod fast_decode;
mod image_hash;
mod traits;

pub use image_hash::ImageHasher;
pub use traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};

use crate::error::DuplicateFinderError;
use std::path::Path;

/// Smallest grid edge the hashers accept
pub const MIN_HASH_SIZE: u32 = 2;

/// Default grid edge (256-bit fingerprints)
pub const DEFAULT_HASH_SIZE: u32 = 16;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    hash_size: u32,
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults
    pub fn new() -> Self {
        Self {
            hash_size: DEFAULT_HASH_SIZE,
            algorithm: HashAlgorithmKind::Perceptual,
        }
    }

    /// Set the hash size (edge length of the bit grid)
    ///
    /// Larger sizes discriminate better but produce longer fingerprints.
    /// - 8: 64 bits
    /// - 16: 256 bits
    /// - 32: 1024 bits
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, DuplicateFinderError> {
        if self.hash_size < MIN_HASH_SIZE {
            return Err(DuplicateFinderError::Config(format!(
                "hash size must be at least {}, got {}",
                MIN_HASH_SIZE, self.hash_size
            )));
        }

        Ok(Box::new(ImageHasher::new(self.algorithm, self.hash_size)))
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint one file with the default perceptual algorithm.
///
/// Deterministic: the same bytes and `hash_size` always give the same
/// fingerprint, in any process. A `hash_size` below [`MIN_HASH_SIZE`]
/// is a configuration error.
pub fn fingerprint(path: &Path, hash_size: u32) -> Result<Fingerprint, DuplicateFinderError> {
    let hasher = HasherConfig::new().hash_size(hash_size).build()?;
    Ok(hasher.fingerprint_file(path)?)
}

//! Trait definitions for perceptual fingerprinting.

use super::fast_decode::FastDecoder;
use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A perceptual fingerprint rendered as lowercase hex.
///
/// Two photos are duplicates when their fingerprints are equal as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Encode raw hash bytes as a fingerprint
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Get the hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash) - Fast, good for exact duplicates
    Average,
    /// Difference Hash (dHash) - Compares neighbouring pixels row-wise
    Difference,
    /// Double gradient - Row and column gradients at half resolution
    DoubleGradient,
    /// Perceptual Hash (pHash) - DCT-based, robust to re-encoding
    Perceptual,
}

impl HashAlgorithmKind {
    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => {
                "Average Hash (aHash) - Fast comparison based on average brightness"
            }
            HashAlgorithmKind::Difference => {
                "Difference Hash (dHash) - Compares brightness gradients between pixels"
            }
            HashAlgorithmKind::DoubleGradient => {
                "Double Gradient - Horizontal and vertical brightness gradients"
            }
            HashAlgorithmKind::Perceptual => {
                "Perceptual Hash (pHash) - DCT-based, robust to edits and transformations"
            }
        }
    }
}

impl fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithmKind::Average => write!(f, "aHash"),
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::DoubleGradient => write!(f, "gradient"),
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
        }
    }
}

/// Trait for fingerprint algorithm implementations
///
/// Implementations hold no mutable state and are shared by every worker.
pub trait HashAlgorithm: Send + Sync {
    /// Compute a fingerprint from an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Fingerprint;

    /// Decode a file and compute its fingerprint.
    ///
    /// Any read or decode failure is returned as a [`HashError`]; nothing
    /// here panics on bad input.
    fn fingerprint_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;

        if image.width() == 0 || image.height() == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        Ok(self.hash_image(&image))
    }

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;

    /// Edge length of the hash grid
    fn hash_size(&self) -> u32;
}

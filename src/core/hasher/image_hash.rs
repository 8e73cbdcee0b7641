//! Fingerprint algorithms backed by the image_hasher crate.
//!
//! One implementation covers every [`HashAlgorithmKind`]; the kind only
//! changes how the underlying hasher is configured:
//!
//! | Kind | image_hasher configuration |
//! |------|----------------------------|
//! | Perceptual | `Mean` over a DCT-preprocessed image |
//! | Average | `Mean` |
//! | Difference | `Gradient` |
//! | DoubleGradient | `DoubleGradient` |

use super::traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig as ImageHasherConfig};

/// Hash algorithm using a preconfigured `image_hasher::Hasher`
pub struct ImageHasher {
    kind: HashAlgorithmKind,
    hash_size: u32,
    hasher: image_hasher::Hasher,
}

impl ImageHasher {
    /// Create a hasher for `kind` over a `hash_size` x `hash_size` grid
    pub fn new(kind: HashAlgorithmKind, hash_size: u32) -> Self {
        let config = ImageHasherConfig::new().hash_size(hash_size, hash_size);

        let config = match kind {
            HashAlgorithmKind::Perceptual => config.hash_alg(HashAlg::Mean).preproc_dct(),
            HashAlgorithmKind::Average => config.hash_alg(HashAlg::Mean),
            HashAlgorithmKind::Difference => config.hash_alg(HashAlg::Gradient),
            HashAlgorithmKind::DoubleGradient => config.hash_alg(HashAlg::DoubleGradient),
        };

        Self {
            kind,
            hash_size,
            hasher: config.to_hasher(),
        }
    }
}

impl HashAlgorithm for ImageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Fingerprint {
        let hash = self.hasher.hash_image(image);
        Fingerprint::from_bytes(hash.as_bytes())
    }

    fn kind(&self) -> HashAlgorithmKind {
        self.kind
    }

    fn hash_size(&self) -> u32 {
        self.hash_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        });
        DynamicImage::ImageRgb8(img)
    }

    fn checker_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            if (x / 16 + y / 16) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_produce_identical_fingerprint() {
        let hasher = ImageHasher::new(HashAlgorithmKind::Perceptual, 8);
        let image = gradient_image(100, 100);

        assert_eq!(hasher.hash_image(&image), hasher.hash_image(&image));
    }

    #[test]
    fn separately_built_hashers_agree() {
        let image = gradient_image(64, 48);

        let first = ImageHasher::new(HashAlgorithmKind::Perceptual, 16).hash_image(&image);
        let second = ImageHasher::new(HashAlgorithmKind::Perceptual, 16).hash_image(&image);

        assert_eq!(first, second);
    }

    #[test]
    fn different_images_produce_different_fingerprints() {
        let hasher = ImageHasher::new(HashAlgorithmKind::Perceptual, 8);

        let a = hasher.hash_image(&gradient_image(128, 128));
        let b = hasher.hash_image(&checker_image(128, 128));

        assert_ne!(a, b);
    }

    #[test]
    fn larger_hash_size_gives_longer_fingerprint() {
        let image = gradient_image(100, 100);

        let small = ImageHasher::new(HashAlgorithmKind::Perceptual, 8).hash_image(&image);
        let large = ImageHasher::new(HashAlgorithmKind::Perceptual, 16).hash_image(&image);

        // 64 bits vs 256 bits, two hex digits per byte
        assert_eq!(small.as_str().len(), 16);
        assert_eq!(large.as_str().len(), 64);
    }

    #[test]
    fn kind_and_size_are_reported() {
        let hasher = ImageHasher::new(HashAlgorithmKind::Difference, 12);
        assert_eq!(hasher.kind(), HashAlgorithmKind::Difference);
        assert_eq!(hasher.hash_size(), 12);
    }
}

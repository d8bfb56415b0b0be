//! Region-vs-region similarity: hash distance plus a coarse color check.

use image::RgbImage;

use crate::consts::{COLOR_TOLERANCE, HASH_BITS};
use crate::hash::{Fingerprinter, HashAlgorithm};
use crate::DiffError;

/// Result of comparing two equally sized regions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Hamming distance between the two fingerprints.
    pub distance: u32,
    /// `distance / HASH_BITS * 100`, clamped to `[0, 100]`.
    pub percent: f64,
    /// Mean colors of both regions agree within [`COLOR_TOLERANCE`] per channel.
    pub color_similar: bool,
}

impl Similarity {
    /// Distance as a fraction of the fingerprint length, in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.percent / 100.0
    }
}

/// Compares regions with one fixed fingerprinting algorithm.
pub struct SimilarityComparator {
    algorithm: HashAlgorithm,
    fingerprinter: Fingerprinter,
}

impl SimilarityComparator {
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            fingerprinter: algorithm.fingerprinter(),
        }
    }

    /// Resolves an algorithm identifier such as `"phash"`.
    ///
    /// # Errors
    /// Returns [`DiffError::UnknownAlgorithm`] for unrecognized identifiers.
    pub fn from_id(id: &str) -> Result<Self, DiffError> {
        Ok(Self::new(id.parse()?))
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Compares two regions of identical dimensions.
    ///
    /// # Errors
    /// Returns [`DiffError::SizeMismatch`] if the dimensions differ.
    pub fn compare(&self, a: &RgbImage, b: &RgbImage) -> Result<Similarity, DiffError> {
        if a.dimensions() != b.dimensions() {
            return Err(DiffError::SizeMismatch {
                w1: a.width(),
                h1: a.height(),
                w2: b.width(),
                h2: b.height(),
            });
        }

        let distance = self
            .fingerprinter
            .fingerprint(a)
            .distance(&self.fingerprinter.fingerprint(b));
        let percent = (f64::from(distance) / f64::from(HASH_BITS) * 100.0).clamp(0.0, 100.0);

        Ok(Similarity {
            distance,
            percent,
            color_similar: is_similar_by_color(a, b),
        })
    }
}

/// Average color of a region, per channel.
fn mean_color(img: &RgbImage) -> [f64; 3] {
    let mut sum = [0u64; 3];
    for px in img.pixels() {
        for (acc, &c) in sum.iter_mut().zip(&px.0) {
            *acc += u64::from(c);
        }
    }
    let n = (u64::from(img.width()) * u64::from(img.height())).max(1) as f64;
    sum.map(|s| s as f64 / n)
}

fn is_similar_by_color(a: &RgbImage, b: &RgbImage) -> bool {
    let (ma, mb) = (mean_color(a), mean_color(b));
    ma.iter()
        .zip(&mb)
        .all(|(x, y)| (x - y).abs() < COLOR_TOLERANCE)
}

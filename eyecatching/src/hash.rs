//! Perceptual fingerprints.
//!
//! `ahash`, `phash` and `dhash` are delegated to `image_hasher`. The wavelet
//! hash is not offered there, so it is computed here: grayscale thumbnail at
//! the largest power of two that fits the region, Haar LL band reduced to the
//! hash grid, median threshold.

use std::fmt;
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use image_hasher::{HashAlg, Hasher, HasherConfig};

use crate::consts::{HASH_BITS, HASH_SIZE};
use crate::DiffError;

/// Fingerprinting algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// `ahash`: pixels above the thumbnail mean.
    Average,
    /// `phash`: DCT low frequencies above their mean.
    Perceptual,
    /// `dhash`: horizontal brightness gradient signs.
    Difference,
    /// `whash`: Haar wavelet LL coefficients above their median.
    Wavelet,
}

impl HashAlgorithm {
    pub const ALL: [Self; 4] = [
        Self::Average,
        Self::Perceptual,
        Self::Difference,
        Self::Wavelet,
    ];

    /// Short identifier used on the command line and in output names.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Average => "ahash",
            Self::Perceptual => "phash",
            Self::Difference => "dhash",
            Self::Wavelet => "whash",
        }
    }

    /// Builds the fingerprinting function for this algorithm.
    pub(crate) fn fingerprinter(self) -> Fingerprinter {
        let config = HasherConfig::new().hash_size(HASH_SIZE, HASH_SIZE);
        match self {
            Self::Average => Fingerprinter::Hasher(config.hash_alg(HashAlg::Mean).to_hasher()),
            Self::Perceptual => Fingerprinter::Hasher(
                config.hash_alg(HashAlg::Mean).preproc_dct().to_hasher(),
            ),
            Self::Difference => {
                Fingerprinter::Hasher(config.hash_alg(HashAlg::Gradient).to_hasher())
            }
            Self::Wavelet => Fingerprinter::Wavelet,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for HashAlgorithm {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|alg| alg.id() == id)
            .ok_or_else(|| DiffError::UnknownAlgorithm(s.to_string()))
    }
}

/// Fixed-length binary fingerprint of an image region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut bytes = vec![0u8; (HASH_BITS as usize).div_ceil(8)];
        for (i, bit) in bits.into_iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bits in the fingerprint.
    #[must_use]
    pub fn bit_len(&self) -> u32 {
        self.bytes.len() as u32 * 8
    }

    /// Hamming distance to another fingerprint of the same length.
    #[must_use]
    pub fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(&other.bytes)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// A resolved fingerprinting function, built once per session.
pub(crate) enum Fingerprinter {
    Hasher(Hasher),
    Wavelet,
}

impl Fingerprinter {
    pub(crate) fn fingerprint(&self, region: &RgbImage) -> Fingerprint {
        match self {
            Self::Hasher(hasher) => Fingerprint::from_bytes(hasher.hash_image(region).as_bytes()),
            Self::Wavelet => wavelet_hash(region),
        }
    }
}

/// Largest power of two not above `n` (n >= 1).
fn prev_power_of_two(n: u32) -> u32 {
    1 << (31 - n.leading_zeros())
}

fn wavelet_hash(region: &RgbImage) -> Fingerprint {
    let side = prev_power_of_two(region.width().min(region.height()).max(1)).max(HASH_SIZE);
    let gray: GrayImage = imageops::grayscale(region);
    let thumb = imageops::resize(&gray, side, side, FilterType::Lanczos3);

    let mut band: Vec<f32> = thumb.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();
    let mut n = side as usize;
    // The max-level LL term is the image mean; it drops out of the median
    // comparison, so only the reduction to HASH_SIZE is needed.
    while n > HASH_SIZE as usize {
        band = haar_ll(&band, n);
        n /= 2;
    }

    let median = median(&band);
    Fingerprint::from_bits(band.iter().map(|&v| v > median))
}

/// One level of the orthonormal 2D Haar transform, keeping only the LL band.
fn haar_ll(src: &[f32], n: usize) -> Vec<f32> {
    let half = n / 2;
    let mut out = vec![0.0f32; half * half];
    for y in 0..half {
        let row0 = &src[(2 * y) * n..(2 * y + 1) * n];
        let row1 = &src[(2 * y + 1) * n..(2 * y + 2) * n];
        for x in 0..half {
            out[y * half + x] =
                (row0[2 * x] + row0[2 * x + 1] + row1[2 * x] + row1[2 * x + 1]) * 0.5;
        }
    }
    out
}

fn median(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn stripes(width: u32, height: u32, period: u32, invert: bool) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            let dark = ((x / period) % 2 == 0) ^ invert;
            if dark {
                Rgb([20, 20, 20])
            } else {
                Rgb([230, 230, 230])
            }
        })
    }

    #[test]
    fn test_parse_ids() {
        for alg in HashAlgorithm::ALL {
            assert_eq!(alg.id().parse::<HashAlgorithm>().unwrap(), alg);
        }
        assert_eq!(" PHASH ".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Perceptual);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "foo".parse::<HashAlgorithm>().unwrap_err();
        assert!(matches!(err, DiffError::UnknownAlgorithm(ref s) if s == "foo"));
    }

    #[test]
    fn test_all_fingerprints_are_64_bits() {
        let img = stripes(40, 40, 5, false);
        for alg in HashAlgorithm::ALL {
            let fp = alg.fingerprinter().fingerprint(&img);
            assert_eq!(fp.bit_len(), HASH_BITS, "{alg}");
        }
    }

    #[test]
    fn test_identical_regions_zero_distance() {
        let img = stripes(33, 17, 4, false);
        for alg in HashAlgorithm::ALL {
            let f = alg.fingerprinter();
            assert_eq!(f.fingerprint(&img).distance(&f.fingerprint(&img)), 0, "{alg}");
        }
    }

    #[test]
    fn test_inverted_stripes_are_far_apart() {
        let a = stripes(64, 64, 8, false);
        let b = stripes(64, 64, 8, true);
        for alg in [HashAlgorithm::Average, HashAlgorithm::Wavelet] {
            let f = alg.fingerprinter();
            let d = f.fingerprint(&a).distance(&f.fingerprint(&b));
            assert!(d > 32, "{alg}: distance {d}");
        }
    }

    #[test]
    fn test_tiny_region_hashes() {
        let img = RgbImage::from_pixel(1, 3, Rgb([10, 200, 30]));
        for alg in HashAlgorithm::ALL {
            let fp = alg.fingerprinter().fingerprint(&img);
            assert_eq!(fp.bit_len(), HASH_BITS);
        }
    }

    #[test]
    fn test_fingerprint_distance() {
        let a = Fingerprint::from_bytes(&[0b1010_1010, 0xFF]);
        let b = Fingerprint::from_bytes(&[0b0101_0101, 0xFF]);
        assert_eq!(a.distance(&b), 8);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_haar_ll_averages_blocks() {
        let src = [1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 2.0, 2.0];
        let ll = haar_ll(&src, 4);
        assert_eq!(ll, vec![2.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn test_prev_power_of_two() {
        assert_eq!(prev_power_of_two(1), 1);
        assert_eq!(prev_power_of_two(20), 16);
        assert_eq!(prev_power_of_two(64), 64);
    }
}

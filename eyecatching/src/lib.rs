//! # Eyecatching
//!
//! Visual regression diffing for screenshots of the same web page rendered by
//! two different browsers.
//!
//! Both images are compared region by region with a perceptual hash. Regions
//! whose fingerprints diverge are blended with a highlight color directly in
//! the reference image, so the output is the reference screenshot with the
//! rendering discrepancies painted over it.
//!
//! Two strategies are available:
//! - **Linear**: a fixed grid of `block_size` tiles, each flagged on its own
//!   when the hash distance reaches the threshold.
//! - **Recursive**: adaptive subdivision. A region is halved along its longer
//!   side until it either passes the similarity test or reaches the minimum
//!   block size.
//!
//! ## Hash Algorithms
//!
//! | id      | fingerprint                                  |
//! |---------|----------------------------------------------|
//! | `ahash` | mean threshold over an 8x8 grayscale thumbnail |
//! | `phash` | mean threshold over 8x8 low DCT coefficients  |
//! | `dhash` | sign of horizontal neighbour gradients        |
//! | `whash` | median threshold over Haar wavelet LL band    |
//!
//! All fingerprints are 64 bits long, so percentages are `distance / 64 * 100`.
//!
//! ## Example
//!
//! ```rust
//! use eyecatching::{compare_linear, DiffParams, ImageHandle, RgbImage};
//!
//! let white = RgbImage::from_pixel(40, 40, eyecatching::Rgb([255, 255, 255]));
//! let reference = ImageHandle::from_rgb("chrome", white.clone());
//! let candidate = ImageHandle::from_rgb("firefox", white);
//!
//! let outcome = compare_linear(reference, candidate, &DiffParams::default())?;
//! assert_eq!(outcome.stats.examined, 4);
//! assert_eq!(outcome.stats.flagged, 0);
//! # Ok::<(), eyecatching::DiffError>(())
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod consts;
mod hash;
mod handle;
mod linear;
mod overlay;
mod recursive;
mod region;
mod session;
mod similarity;

pub use crate::hash::{Fingerprint, HashAlgorithm};
pub use crate::handle::{normalize_pair, output_file_name, ImageHandle};
pub use crate::overlay::blend;
pub use crate::recursive::TraversalOrder;
pub use crate::region::Region;
pub use crate::session::{BlockReport, DiffOutcome, DiffSession, DiffStats, Method};
pub use crate::similarity::{Similarity, SimilarityComparator};

// Re-export the pixel types that appear in the public API
pub use image::{Rgb, RgbImage};
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::RGB8;

/// Error type for diff operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DiffError {
    /// Reference and candidate dimensions don't match.
    #[error("image dimensions don't match: {w1}x{h1} vs {w2}x{h2}")]
    SizeMismatch {
        /// Reference width.
        w1: u32,
        /// Reference height.
        h1: u32,
        /// Candidate width.
        w2: u32,
        /// Candidate height.
        h2: u32,
    },
    /// Hash algorithm identifier is not one of `ahash`, `phash`, `dhash`, `whash`.
    #[error("unknown hash algorithm '{0}' (available: ahash, phash, dhash, whash)")]
    UnknownAlgorithm(String),
    /// Threshold is zero or exceeds the fingerprint length.
    #[error("invalid threshold {0}: must be between 1 and {max}", max = consts::HASH_BITS)]
    InvalidThreshold(u32),
    /// Block size is zero.
    #[error("invalid block size {0}: must be at least 1 pixel")]
    InvalidBlockSize(u32),
    /// Rectangle with no area.
    #[error("empty region ({x1}, {y1}, {x2}, {y2})")]
    EmptyRegion {
        /// Left edge.
        x1: u32,
        /// Top edge.
        y1: u32,
        /// Right edge (exclusive).
        x2: u32,
        /// Bottom edge (exclusive).
        y2: u32,
    },
    /// Decoding or encoding an image file failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Diff session parameters.
///
/// Use the builder pattern to construct:
/// ```rust
/// use eyecatching::{DiffParams, HashAlgorithm};
///
/// let params = DiffParams::new()
///     .with_algorithm(HashAlgorithm::Difference)
///     .with_threshold(12)
///     .with_block_size(32);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiffParams {
    algorithm: HashAlgorithm,
    threshold: u32,
    block_size: u32,
    highlight: RGB8,
    order: TraversalOrder,
}

impl Default for DiffParams {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Average,
            threshold: consts::DEFAULT_THRESHOLD,
            block_size: consts::DEFAULT_BLOCK_SIZE,
            highlight: consts::SALMON,
            order: TraversalOrder::FirstHalfFirst,
        }
    }
}

impl DiffParams {
    /// Creates a new `DiffParams` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fingerprinting algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the hash distance threshold.
    ///
    /// Linear mode flags tiles at or above it; recursive mode accepts
    /// regions at or below it.
    #[must_use]
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the tile edge (linear) or minimum region edge (recursive), in pixels.
    #[must_use]
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the overlay color.
    #[must_use]
    pub fn with_highlight(mut self, highlight: RGB8) -> Self {
        self.highlight = highlight;
        self
    }

    /// Sets which half of a split the recursive comparator visits first.
    #[must_use]
    pub fn with_order(mut self, order: TraversalOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    #[must_use]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    #[must_use]
    pub fn highlight(&self) -> RGB8 {
        self.highlight
    }

    #[must_use]
    pub fn order(&self) -> TraversalOrder {
        self.order
    }

    /// Rejects values that would make the comparison meaningless or
    /// prevent the recursion from terminating.
    pub fn validate(&self) -> Result<(), DiffError> {
        if self.threshold == 0 || self.threshold > consts::HASH_BITS {
            return Err(DiffError::InvalidThreshold(self.threshold));
        }
        if self.block_size == 0 {
            return Err(DiffError::InvalidBlockSize(self.block_size));
        }
        Ok(())
    }
}

/// Runs the linear tile-grid comparison.
///
/// The reference image is consumed and returned, annotated, inside the outcome.
///
/// # Errors
/// Returns an error if:
/// - The parameters fail [`DiffParams::validate`]
/// - Image dimensions don't match
pub fn compare_linear(
    reference: ImageHandle,
    candidate: ImageHandle,
    params: &DiffParams,
) -> Result<DiffOutcome, DiffError> {
    DiffSession::new(reference, candidate, params.clone())?.run(Method::Linear)
}

/// Runs the recursive adaptive-subdivision comparison.
///
/// # Errors
/// Same conditions as [`compare_linear`].
pub fn compare_recursive(
    reference: ImageHandle,
    candidate: ImageHandle,
    params: &DiffParams,
) -> Result<DiffOutcome, DiffError> {
    DiffSession::new(reference, candidate, params.clone())?.run(Method::Recursive)
}

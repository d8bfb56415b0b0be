//! A single comparison of one reference against one candidate.

use std::time::Instant;

use crate::consts::HASH_BITS;
use crate::handle::ImageHandle;
use crate::overlay::blend_in_place;
use crate::region::Region;
use crate::similarity::{Similarity, SimilarityComparator};
use crate::{linear, recursive, DiffError, DiffParams};

/// Comparison strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Fixed grid of `block_size` tiles.
    Linear,
    /// Adaptive halving down to `block_size`.
    Recursive,
}

impl Method {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Recursive => "recursive",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One region that received an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockReport {
    pub region: Region,
    pub distance: u32,
    pub percent: f64,
    pub opacity: f32,
}

/// Summary statistics of a finished session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffStats {
    /// Tiles (linear) or regions evaluated (recursive).
    pub examined: usize,
    /// Tiles at or over the threshold (linear) or accepted leaves with a
    /// non-zero distance (recursive). Always the number of tinted blocks.
    pub flagged: usize,
    /// Mean dissimilarity percentage over all tiles (linear) or all leaves (recursive).
    pub average_dissimilarity: f64,
    pub elapsed_seconds: f64,
}

/// Annotated output and statistics.
#[derive(Debug, Clone)]
pub struct DiffOutcome {
    pub method: Method,
    /// The reference image with overlays applied.
    pub output: ImageHandle,
    pub stats: DiffStats,
    pub blocks: Vec<BlockReport>,
}

/// Running counters. Integer sums, so accumulation order doesn't matter.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Tally {
    pub(crate) examined: usize,
    pub(crate) flagged: usize,
    pub(crate) distance_sum: u64,
    pub(crate) averaged: usize,
}

impl Tally {
    pub(crate) fn add_distance(&mut self, distance: u32) {
        self.distance_sum += u64::from(distance);
        self.averaged += 1;
    }

    /// Mean distance as a percentage of the fingerprint length.
    fn average(&self) -> f64 {
        if self.averaged == 0 {
            0.0
        } else {
            self.distance_sum as f64 / self.averaged as f64 / f64::from(HASH_BITS) * 100.0
        }
    }
}

/// Owns both images and the resolved comparator for one run.
///
/// Construction validates everything up front, so a session that exists
/// can always run to completion.
pub struct DiffSession {
    pub(crate) reference: ImageHandle,
    pub(crate) candidate: ImageHandle,
    pub(crate) params: DiffParams,
    pub(crate) comparator: SimilarityComparator,
    pub(crate) tally: Tally,
    pub(crate) blocks: Vec<BlockReport>,
}

impl DiffSession {
    /// # Errors
    /// Returns an error if:
    /// - The parameters fail [`DiffParams::validate`]
    /// - Image dimensions don't match
    pub fn new(
        reference: ImageHandle,
        candidate: ImageHandle,
        params: DiffParams,
    ) -> Result<Self, DiffError> {
        params.validate()?;

        let (w1, h1) = reference.dimensions();
        let (w2, h2) = candidate.dimensions();
        if w1 != w2 || h1 != h2 {
            return Err(DiffError::SizeMismatch { w1, h1, w2, h2 });
        }
        // Zero-sized images have no regions to compare
        Region::from_size(w1, h1)?;

        log::debug!(
            "session {} vs {}: {w1}x{h1}, algorithm={}, threshold={}, block_size={}",
            reference.name(),
            candidate.name(),
            params.algorithm(),
            params.threshold(),
            params.block_size()
        );

        Ok(Self {
            comparator: SimilarityComparator::new(params.algorithm()),
            reference,
            candidate,
            params,
            tally: Tally::default(),
            blocks: Vec::new(),
        })
    }

    pub fn params(&self) -> &DiffParams {
        &self.params
    }

    pub fn reference(&self) -> &ImageHandle {
        &self.reference
    }

    pub fn candidate(&self) -> &ImageHandle {
        &self.candidate
    }

    /// Runs the chosen strategy and hands back the annotated reference.
    pub fn run(mut self, method: Method) -> Result<DiffOutcome, DiffError> {
        let start = Instant::now();
        match method {
            Method::Linear => linear::run(&mut self)?,
            Method::Recursive => recursive::run(&mut self)?,
        }
        let elapsed_seconds = start.elapsed().as_secs_f64();

        let stats = DiffStats {
            examined: self.tally.examined,
            flagged: self.tally.flagged,
            average_dissimilarity: self.tally.average(),
            elapsed_seconds,
        };
        log::info!(
            "{method}: {} blocks compared, {} with dissimilarity, average {:.2}%, {:.4}s",
            stats.examined,
            stats.flagged,
            stats.average_dissimilarity,
            stats.elapsed_seconds
        );

        Ok(DiffOutcome {
            method,
            output: self.reference,
            stats,
            blocks: self.blocks,
        })
    }

    /// Crops `region` from both images and compares the two patches.
    pub(crate) fn measure(&self, region: Region) -> Result<Similarity, DiffError> {
        let a = self.reference.crop(region);
        let b = self.candidate.crop(region);
        self.comparator.compare(&a, &b)
    }

    /// Blends `region` of the reference toward the highlight color and
    /// records the block.
    pub(crate) fn overlay(&mut self, region: Region, similarity: &Similarity, opacity: f32) {
        if opacity > 0.0 {
            let mut patch = self.reference.crop(region);
            blend_in_place(&mut patch, opacity, self.params.highlight());
            self.reference.paste(&patch, region.x1(), region.y1());
        }
        self.blocks.push(BlockReport {
            region,
            distance: similarity.distance,
            percent: similarity.percent,
            opacity,
        });
    }
}

//! Recursive comparator: adaptive halving.
//!
//! Each region is evaluated once and ends in one of two states:
//!
//! - **Accept**: the hash distance is within the threshold while the mean
//!   colors disagree, or the region has reached the minimum block size. The
//!   reference patch is blended with opacity `distance / HASH_BITS` and
//!   pasted back, and the region becomes a leaf. Only leaves with a non-zero
//!   distance count as flagged; every leaf is listed in the block reports.
//! - **Subdivide**: otherwise the region is halved along its longer side and
//!   both halves are evaluated.
//!
//! Halves never overlap, so the leaves tile the image exactly and the visiting
//! order has no effect on the output pixels or the aggregate counters.
//!
//! The accept rule requires the color check to *fail*. Regions that look
//! alike in both hash and color therefore keep subdividing down to the block
//! size floor, where they are accepted with whatever distance they have.

use crate::consts::HASH_BITS;
use crate::region::Region;
use crate::session::DiffSession;
use crate::similarity::Similarity;
use crate::DiffError;

/// Which half of a split is visited first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraversalOrder {
    /// Left (or top) half first.
    #[default]
    FirstHalfFirst,
    /// Right (or bottom) half first.
    SecondHalfFirst,
}

pub(crate) fn run(session: &mut DiffSession) -> Result<(), DiffError> {
    let (width, height) = session.reference.dimensions();
    evaluate(session, Region::from_size(width, height)?)
}

fn evaluate(session: &mut DiffSession, region: Region) -> Result<(), DiffError> {
    let similarity = session.measure(region)?;
    session.tally.examined += 1;

    if similarity.distance <= session.params.threshold() && !similarity.color_similar {
        log::trace!("accept {region}: distance {}", similarity.distance);
        accept(session, region, &similarity);
        return Ok(());
    }

    let block = session.params.block_size();
    if region.width() <= block || region.height() <= block {
        log::trace!("accept {region} at floor: distance {}", similarity.distance);
        accept(session, region, &similarity);
        return Ok(());
    }

    let Some((first, second)) = region.split() else {
        accept(session, region, &similarity);
        return Ok(());
    };
    log::trace!(
        "subdivide {region}: distance {}, color similar {}",
        similarity.distance,
        similarity.color_similar
    );
    match session.params.order() {
        TraversalOrder::FirstHalfFirst => {
            evaluate(session, first)?;
            evaluate(session, second)
        }
        TraversalOrder::SecondHalfFirst => {
            evaluate(session, second)?;
            evaluate(session, first)
        }
    }
}

fn accept(session: &mut DiffSession, region: Region, similarity: &Similarity) {
    let opacity = (similarity.distance as f32 / HASH_BITS as f32).min(1.0);
    session.overlay(region, similarity, opacity);
    if similarity.distance > 0 {
        session.tally.flagged += 1;
    }
    session.tally.add_distance(similarity.distance);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compare_recursive, DiffParams, HashAlgorithm, ImageHandle};
    use image::{Rgb, RgbImage};

    fn white(width: u32, height: u32) -> ImageHandle {
        ImageHandle::from_rgb("w", RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
    }

    #[test]
    fn test_identical_images_reach_floor_without_blending() {
        let outcome = compare_recursive(white(100, 100), white(100, 100), &DiffParams::default())
            .unwrap();
        // 100 -> 50 -> 25 -> 12/13 along alternating axes: 32 leaves
        assert_eq!(outcome.blocks.len(), 32);
        assert_eq!(outcome.stats.flagged, 0);
        // 1 + 2 + 4 + 8 + 16 internal regions
        assert_eq!(outcome.stats.examined, 31 + 32);
        assert!(outcome.blocks.iter().all(|b| b.distance == 0 && b.opacity == 0.0));
        assert!(outcome.stats.average_dissimilarity.abs() < f64::EPSILON);
        assert_eq!(outcome.output.pixels(), white(100, 100).pixels());
    }

    #[test]
    fn test_color_difference_accepts_early() {
        // Solid fills: zero hash distance, different colors -> accepted at the root
        let red = ImageHandle::from_rgb("r", RgbImage::from_pixel(64, 64, Rgb([255, 0, 0])));
        let blue = ImageHandle::from_rgb("b", RgbImage::from_pixel(64, 64, Rgb([0, 0, 255])));
        let outcome = compare_recursive(red.clone(), blue, &DiffParams::default()).unwrap();
        assert_eq!(outcome.stats.examined, 1);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.stats.flagged, 0);
        assert_eq!(outcome.blocks[0].region, Region::from_size(64, 64).unwrap());
        assert_eq!(outcome.output.pixels(), red.pixels());
    }

    #[test]
    fn test_region_smaller_than_block_is_single_leaf() {
        let outcome = compare_recursive(
            white(15, 200),
            white(15, 200),
            &DiffParams::new().with_algorithm(HashAlgorithm::Wavelet),
        )
        .unwrap();
        assert_eq!(outcome.stats.examined, 1);
        assert_eq!(outcome.blocks.len(), 1);
    }

    #[test]
    fn test_block_size_one_terminates() {
        let checker = RgbImage::from_fn(6, 5, |x, y| {
            if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let inverted = RgbImage::from_fn(6, 5, |x, y| {
            if (x + y) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        });
        let outcome = compare_recursive(
            ImageHandle::from_rgb("a", checker),
            ImageHandle::from_rgb("b", inverted),
            &DiffParams::new().with_block_size(1),
        )
        .unwrap();
        let area: u64 = outcome.blocks.iter().map(|b| b.region.area()).sum();
        assert_eq!(area, 30);
    }

    #[test]
    fn test_default_order_is_first_half() {
        assert_eq!(TraversalOrder::default(), TraversalOrder::FirstHalfFirst);
        assert_eq!(DiffParams::default().order(), TraversalOrder::FirstHalfFirst);
    }
}

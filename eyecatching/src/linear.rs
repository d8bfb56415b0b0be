//! Linear comparator: fixed grid of `block_size` tiles.
//!
//! Tiles are visited column by column (x outer, y inner). When the image
//! size is not a multiple of the block size the last column and row hold
//! partial tiles; those are compared as they are, so a `W x H` image always
//! yields `ceil(W / B) * ceil(H / B)` tiles.

use crate::region::Region;
use crate::session::DiffSession;
use crate::DiffError;

/// Number of tiles a `width x height` image is cut into.
pub(crate) fn tile_count(width: u32, height: u32, block: u32) -> usize {
    width.div_ceil(block) as usize * height.div_ceil(block) as usize
}

pub(crate) fn run(session: &mut DiffSession) -> Result<(), DiffError> {
    let (width, height) = session.reference.dimensions();
    let edge = session.params.block_size();
    let threshold = session.params.threshold();

    for x in (0..width).step_by(edge as usize) {
        for y in (0..height).step_by(edge as usize) {
            let region = Region::new(
                x,
                y,
                x.saturating_add(edge).min(width),
                y.saturating_add(edge).min(height),
            )?;
            let similarity = session.measure(region)?;

            session.tally.examined += 1;
            session.tally.add_distance(similarity.distance);

            if similarity.distance >= threshold {
                let opacity = similarity.ratio() as f32;
                log::trace!(
                    "tile {region}: distance {} ({:.2}%), flagged",
                    similarity.distance,
                    similarity.percent
                );
                session.overlay(region, &similarity, opacity);
                session.tally.flagged += 1;
            }
        }
    }

    debug_assert_eq!(session.tally.examined, tile_count(width, height, edge));
    Ok(())
}

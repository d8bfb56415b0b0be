//! Common test utilities for eyecatching integration tests.

#![allow(dead_code)]

pub mod generators;

use eyecatching::{ImageHandle, Region, RgbImage};

/// Wraps generated pixels in a handle.
pub fn handle(name: &str, pixels: RgbImage) -> ImageHandle {
    ImageHandle::from_rgb(name, pixels)
}

/// Coordinates of every pixel that differs between two equally sized images.
pub fn changed_pixels(before: &RgbImage, after: &RgbImage) -> Vec<(u32, u32)> {
    assert_eq!(before.dimensions(), after.dimensions());
    before
        .enumerate_pixels()
        .filter(|&(x, y, px)| after.get_pixel(x, y) != px)
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Sorted corner tuples, for comparing region sets regardless of visit order.
pub fn sorted_corners(regions: impl IntoIterator<Item = Region>) -> Vec<(u32, u32, u32, u32)> {
    let mut corners: Vec<_> = regions.into_iter().map(|r| r.corners()).collect();
    corners.sort_unstable();
    corners
}

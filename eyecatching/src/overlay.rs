//! Highlight blending.

use image::{Rgb, RgbImage};
use rgb::RGB8;

/// Linearly interpolates every pixel of `patch` toward `color`.
///
/// `opacity` 0.0 returns the patch unchanged, 1.0 returns a solid fill.
/// Values outside `[0, 1]` are clamped.
#[must_use]
pub fn blend(patch: &RgbImage, opacity: f32, color: RGB8) -> RgbImage {
    let mut out = patch.clone();
    blend_in_place(&mut out, opacity, color);
    out
}

pub(crate) fn blend_in_place(patch: &mut RgbImage, opacity: f32, color: RGB8) {
    let a = opacity.clamp(0.0, 1.0);
    if a == 0.0 {
        return;
    }
    let fill = [color.r, color.g, color.b];
    for Rgb(px) in patch.pixels_mut() {
        for (c, &f) in px.iter_mut().zip(&fill) {
            *c = lerp(*c, f, a);
        }
    }
}

#[inline]
fn lerp(from: u8, to: u8, t: f32) -> u8 {
    (f32::from(from) + (f32::from(to) - f32::from(from)) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

//! Deterministic synthetic screenshots for eyecatching tests.
//!
//! Images come from an LCG PRNG or simple geometric fills so every platform
//! sees identical inputs.

use eyecatching::{Rgb, RgbImage};

pub const WHITE: [u8; 3] = [255, 255, 255];
pub const RED: [u8; 3] = [255, 0, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];

// ============================================================================
// LCG PRNG
// ============================================================================

/// LCG pseudo-random number generator (deterministic)
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u8(&mut self) -> u8 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.state >> 33) & 0xFF) as u8
    }
}

// ============================================================================
// Image Generation Functions
// ============================================================================

/// Solid color image
pub fn gen_solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Random noise image
pub fn gen_noise(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Lcg::new(seed);
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.next_u8(), rng.next_u8(), rng.next_u8()])
    })
}

/// Page-like image: white background with a few dark "text" bars.
pub fn gen_page(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let in_bar = (y % 24) < 8 && x % 97 < 70;
        if in_bar {
            Rgb([40, 40, 40])
        } else {
            Rgb(WHITE)
        }
    })
}

// ============================================================================
// Distortions
// ============================================================================

/// Fills the rectangle `[x1, x2) x [y1, y2)` with a solid color.
pub fn paint_rect(img: &mut RgbImage, (x1, y1, x2, y2): (u32, u32, u32, u32), rgb: [u8; 3]) {
    for y in y1..y2.min(img.height()) {
        for x in x1..x2.min(img.width()) {
            img.put_pixel(x, y, Rgb(rgb));
        }
    }
}

/// Paints a two-tone patch: `top` above the horizontal midline, `bottom` below.
pub fn paint_two_tone(
    img: &mut RgbImage,
    (x1, y1, x2, y2): (u32, u32, u32, u32),
    top: [u8; 3],
    bottom: [u8; 3],
) {
    let mid = y1 + (y2 - y1) / 2;
    paint_rect(img, (x1, y1, x2, mid), top);
    paint_rect(img, (x1, mid, x2, y2), bottom);
}

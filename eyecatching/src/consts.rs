//! Tunable constants shared by the comparators.

use rgb::RGB8;

/// Edge length of the square fingerprint grid.
pub const HASH_SIZE: u32 = 8;

/// Number of bits in every fingerprint.
pub const HASH_BITS: u32 = HASH_SIZE * HASH_SIZE;

/// Default tile edge / minimum region edge, px.
pub const DEFAULT_BLOCK_SIZE: u32 = 20;

/// Default hash distance threshold.
pub const DEFAULT_THRESHOLD: u32 = 8;

/// Default overlay color (CSS `salmon`).
pub const SALMON: RGB8 = RGB8 {
    r: 250,
    g: 128,
    b: 114,
};

/// Per-channel mean difference below which two regions count as the same color.
pub const COLOR_TOLERANCE: f64 = 10.0;

/// Canvas color used when padding images.
pub const PAD_COLOR: [u8; 3] = [255, 255, 255];

/// Output id used when the caller doesn't supply one.
pub const DEFAULT_OUTPUT_ID: &str = "_";

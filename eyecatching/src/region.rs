//! Axis-aligned rectangles and the halving rule used by the recursive comparator.

use crate::DiffError;

/// Rectangle `[x1, x2) x [y1, y2)` in pixel coordinates.
///
/// Always non-empty: `x2 > x1` and `y2 > y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
}

impl Region {
    /// Creates a region from its corners.
    ///
    /// # Errors
    /// Returns [`DiffError::EmptyRegion`] unless `x2 > x1` and `y2 > y1`.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Result<Self, DiffError> {
        if x2 <= x1 || y2 <= y1 {
            return Err(DiffError::EmptyRegion { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Region covering a whole `width x height` image.
    pub fn from_size(width: u32, height: u32) -> Result<Self, DiffError> {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn x1(&self) -> u32 {
        self.x1
    }

    #[inline]
    pub fn y1(&self) -> u32 {
        self.y1
    }

    #[inline]
    pub fn x2(&self) -> u32 {
        self.x2
    }

    #[inline]
    pub fn y2(&self) -> u32 {
        self.y2
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Corners as `(x1, y1, x2, y2)`.
    pub fn corners(&self) -> (u32, u32, u32, u32) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Splits the region in two along its longer side.
    ///
    /// Ties split the width. The first half gets `floor(len / 2)`, the
    /// second half the remainder. Returns `None` for a 1x1 region, which
    /// cannot be halved.
    pub fn split(&self) -> Option<(Self, Self)> {
        let (w, h) = (self.width(), self.height());
        if w >= h {
            if w < 2 {
                return None;
            }
            let mid = self.x1 + w / 2;
            Some((
                Self { x2: mid, ..*self },
                Self { x1: mid, ..*self },
            ))
        } else {
            let mid = self.y1 + h / 2;
            Some((
                Self { y2: mid, ..*self },
                Self { y1: mid, ..*self },
            ))
        }
    }

    /// Intersection with a `width x height` image, `None` if they don't overlap.
    pub fn clip(&self, width: u32, height: u32) -> Option<Self> {
        let x2 = self.x2.min(width);
        let y2 = self.y2.min(height);
        Self::new(self.x1, self.y1, x2, y2).ok()
    }

    /// True when the two regions share at least one pixel.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }

    /// True when `(x, y)` lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_region_rejected() {
        assert!(matches!(
            Region::new(5, 0, 5, 10),
            Err(DiffError::EmptyRegion { .. })
        ));
        assert!(Region::new(0, 10, 4, 3).is_err());
    }

    #[test]
    fn test_split_wide_region() {
        let r = Region::new(10, 0, 110, 40).unwrap();
        let (a, b) = r.split().unwrap();
        assert_eq!(a.corners(), (10, 0, 60, 40));
        assert_eq!(b.corners(), (60, 0, 110, 40));
    }

    #[test]
    fn test_split_tall_region_odd() {
        let r = Region::new(0, 0, 10, 25).unwrap();
        let (a, b) = r.split().unwrap();
        assert_eq!(a.height(), 12);
        assert_eq!(b.height(), 13);
        assert_eq!(a.width(), 10);
        assert_eq!(b.y1(), 12);
    }

    #[test]
    fn test_split_square_splits_width() {
        let r = Region::from_size(25, 25).unwrap();
        let (a, b) = r.split().unwrap();
        assert_eq!(a.corners(), (0, 0, 12, 25));
        assert_eq!(b.corners(), (12, 0, 25, 25));
    }

    #[test]
    fn test_split_unit_region() {
        assert!(Region::from_size(1, 1).unwrap().split().is_none());
        // 1 wide but 2 tall still halves the height
        let (a, b) = Region::from_size(1, 2).unwrap().split().unwrap();
        assert_eq!(a.area() + b.area(), 2);
    }

    #[test]
    fn test_clip() {
        let r = Region::new(80, 80, 100, 100).unwrap();
        assert_eq!(r.clip(90, 95).unwrap().corners(), (80, 80, 90, 95));
        assert!(r.clip(80, 100).is_none());
    }

    #[test]
    fn test_overlaps() {
        let a = Region::new(0, 0, 10, 10).unwrap();
        let b = Region::new(10, 0, 20, 10).unwrap();
        let c = Region::new(9, 9, 11, 11).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    proptest! {
        #[test]
        fn split_halves_partition_parent(
            x1 in 0u32..500, y1 in 0u32..500, w in 1u32..400, h in 1u32..400
        ) {
            let r = Region::new(x1, y1, x1 + w, y1 + h).unwrap();
            if let Some((a, b)) = r.split() {
                prop_assert_eq!(a.area() + b.area(), r.area());
                prop_assert!(a.area() < r.area());
                prop_assert!(b.area() < r.area());
                prop_assert!(!a.overlaps(&b));
                // the shorter side is inherited unchanged
                if w >= h {
                    prop_assert_eq!(a.height(), h);
                    prop_assert_eq!(a.width(), w / 2);
                } else {
                    prop_assert_eq!(a.width(), w);
                    prop_assert_eq!(a.height(), h / 2);
                }
            } else {
                prop_assert_eq!(r.area(), 1);
            }
        }
    }
}

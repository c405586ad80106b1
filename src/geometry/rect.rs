//! Integer rectangle algebra shared by screen and document space
//!
//! A rectangle with a negative coordinate or extent doubles as the
//! "invalid / no overlap" sentinel, so none of these operations fail.

/// Axis-aligned rectangle in some integer coordinate space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Empty rectangle at the origin, used to mean "nothing selected"
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Overlap of `self` and `other`.
    ///
    /// When the rectangles do not overlap the extents come out negative and
    /// the result is invalid.
    #[must_use]
    pub fn intersect(&self, other: &Rectangle) -> Rectangle {
        let x1 = self.x.max(other.x);
        let x2 = self.right().min(other.right());
        let y1 = self.y.max(other.y);
        let y2 = self.bottom().min(other.bottom());

        Rectangle::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Region `self \ other` as up to four disjoint strips.
    ///
    /// Strips come out in the order top, bottom, left, right. The left and
    /// right strips span only the rows of the overlap, so no strip leaves
    /// `self`.
    #[must_use]
    pub fn subtract(&self, other: &Rectangle) -> Vec<Rectangle> {
        let overlap = self.intersect(other);
        if overlap.width < 0 || overlap.height < 0 {
            return vec![*self];
        }

        let mut strips = Vec::with_capacity(4);

        if self.y < overlap.y {
            strips.push(Rectangle::new(self.x, self.y, self.width, overlap.y - self.y));
        }

        if self.bottom() > overlap.bottom() {
            strips.push(Rectangle::new(
                self.x,
                overlap.bottom(),
                self.width,
                self.bottom() - overlap.bottom(),
            ));
        }

        if self.x < overlap.x {
            strips.push(Rectangle::new(
                self.x,
                overlap.y,
                overlap.x - self.x,
                overlap.height,
            ));
        }

        if self.right() > overlap.right() {
            strips.push(Rectangle::new(
                overlap.right(),
                overlap.y,
                self.right() - overlap.right(),
                overlap.height,
            ));
        }

        strips
    }

    /// Flip negative extents so the rectangle spans the same two corners
    #[must_use]
    pub fn normalize(&self) -> Rectangle {
        let mut r = *self;

        if r.width < 0 {
            r.width = -r.width;
            r.x -= r.width;
        }

        if r.height < 0 {
            r.height = -r.height;
            r.y -= r.height;
        }

        r
    }

    /// Grow every edge outwards by `p`
    #[must_use]
    pub fn pad(&self, p: i32) -> Rectangle {
        Rectangle::new(self.x - p, self.y - p, self.width + 2 * p, self.height + 2 * p)
    }

    #[must_use]
    pub fn translate(&self, dx: i32, dy: i32) -> Rectangle {
        Rectangle::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// True if any coordinate or extent is negative
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.x < 0 || self.y < 0 || self.width < 0 || self.height < 0
    }

    /// True if the rectangle covers no pixels
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[must_use]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.width) * i64::from(self.height)
        }
    }

    /// Point test, inclusive of the far edges
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x <= self.right() && y <= self.bottom()
    }
}

/// Size of a viewport or a bitmap in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[must_use]
    pub const fn to_rect(self) -> Rectangle {
        Rectangle::new(0, 0, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_area(rects: &[Rectangle]) -> i64 {
        rects.iter().map(Rectangle::area).sum()
    }

    #[test]
    fn intersect_overlapping() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Rectangle::new(5, 5, 5, 5));
    }

    #[test]
    fn intersect_disjoint_is_invalid() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(20, 0, 10, 10);
        let i = a.intersect(&b);
        assert!(i.is_invalid());
        assert!(i.width < 0);
    }

    #[test]
    fn subtract_hole_yields_four_strips() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(2, 2, 4, 4);
        let strips = a.subtract(&b);

        assert_eq!(
            strips,
            vec![
                Rectangle::new(0, 0, 10, 2),
                Rectangle::new(0, 6, 10, 4),
                Rectangle::new(0, 2, 2, 4),
                Rectangle::new(6, 2, 4, 4),
            ]
        );
        assert_eq!(total_area(&strips), 84);
    }

    #[test]
    fn subtract_disjoint_returns_original() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(50, 50, 4, 4);
        assert_eq!(a.subtract(&b), vec![a]);
    }

    #[test]
    fn subtract_covering_returns_nothing() {
        let a = Rectangle::new(3, 3, 4, 4);
        let b = Rectangle::new(0, 0, 10, 10);
        assert!(a.subtract(&b).is_empty());
    }

    #[test]
    fn subtract_taller_cutter_stays_inside() {
        // A cutter taller than `a` must not make the side strips leak out of `a`.
        let a = Rectangle::new(0, 10, 10, 10);
        let b = Rectangle::new(4, 0, 2, 40);
        let strips = a.subtract(&b);

        assert_eq!(
            strips,
            vec![Rectangle::new(0, 10, 4, 10), Rectangle::new(6, 10, 4, 10)]
        );
    }

    #[test]
    fn subtract_works_at_negative_coordinates() {
        let a = Rectangle::new(-10, -10, 10, 10);
        let b = Rectangle::new(-5, -10, 10, 10);
        assert_eq!(a.subtract(&b), vec![Rectangle::new(-10, -10, 5, 10)]);
    }

    #[test]
    fn normalize_flips_both_axes() {
        let r = Rectangle::new(10, 20, -4, -6);
        assert_eq!(r.normalize(), Rectangle::new(6, 14, 4, 6));
    }

    #[test]
    fn normalize_is_idempotent() {
        for r in [
            Rectangle::new(10, 20, -4, -6),
            Rectangle::new(1, 2, 3, 4),
            Rectangle::new(0, 0, -1, 5),
        ] {
            let once = r.normalize();
            assert_eq!(once.normalize(), once);
            assert!(once.width >= 0 && once.height >= 0);
        }
    }

    #[test]
    fn pad_grows_all_edges() {
        let r = Rectangle::new(10, 10, 4, 4);
        assert_eq!(r.pad(5), Rectangle::new(5, 5, 14, 14));
    }

    #[test]
    fn invalid_when_anything_negative() {
        assert!(!Rectangle::new(0, 0, 0, 0).is_invalid());
        assert!(Rectangle::new(-1, 0, 1, 1).is_invalid());
        assert!(Rectangle::new(0, -1, 1, 1).is_invalid());
        assert!(Rectangle::new(0, 0, -1, 1).is_invalid());
        assert!(Rectangle::new(0, 0, 1, -1).is_invalid());
    }

    #[test]
    fn contains_includes_far_edge() {
        let r = Rectangle::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(15, 15));
        assert!(!r.contains(16, 15));
        assert!(!r.contains(9, 12));
    }
}

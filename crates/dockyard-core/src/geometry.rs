#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are in host pixels (`f64`), origin at top-left. Size
//! boxes use `f64::INFINITY` for "no upper bound"; the serde form of such
//! values goes through [`crate::sentinel`] so they survive JSON.

use serde::{Deserialize, Serialize};

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    #[inline]
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        let (dx, dy) = self.delta_from(other);
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned rectangle for layout bounds and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Size of the rectangle as a size box.
    #[inline]
    pub const fn size(&self) -> SizeBox {
        SizeBox::new(self.width, self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Create a new rectangle inside the current one with the given margin.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x + margin.left,
            y: self.y + margin.top,
            width: (self.width - margin.horizontal_sum()).max(0.0),
            height: (self.height - margin.vertical_sum()).max(0.0),
        }
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Move the rectangle so it lies inside `bounds` where possible.
    ///
    /// A rectangle larger than `bounds` keeps its size and is pinned to the
    /// top-left corner of `bounds`.
    pub fn clamp_within(&self, bounds: &Rect) -> Rect {
        let max_x = (bounds.right() - self.width).max(bounds.x);
        let max_y = (bounds.bottom() - self.height).max(bounds.y);
        Rect::new(
            self.x.clamp(bounds.x, max_x),
            self.y.clamp(bounds.y, max_y),
            self.width,
            self.height,
        )
    }

    /// Translate by a delta.
    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: f64) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A `{width, height}` pair used for desired, minimum and maximum sizing.
///
/// `f64::INFINITY` on either axis means the axis is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SizeBox {
    #[serde(with = "crate::sentinel")]
    pub width: f64,
    #[serde(with = "crate::sentinel")]
    pub height: f64,
}

impl SizeBox {
    /// Zero on both axes.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unbounded on both axes.
    pub const UNBOUNDED: Self = Self::new(f64::INFINITY, f64::INFINITY);

    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both axes are finite.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: SizeBox) -> SizeBox {
        SizeBox::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: SizeBox) -> SizeBox {
        SizeBox::new(self.width.min(other.width), self.height.min(other.height))
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect, SizeBox, Sides};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert!(rect.contains(Point::new(2.0, 3.0)));
        assert!(rect.contains(Point::new(5.9, 7.9)));
        assert!(!rect.contains(Point::new(6.0, 3.0)));
        assert!(!rect.contains(Point::new(2.0, 8.0)));
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(2.0, 2.0, 4.0, 4.0);
        assert_eq!(a.intersection_opt(&b), Some(Rect::new(2.0, 2.0, 2.0, 2.0)));
    }

    #[test]
    fn rect_intersection_no_overlap_is_none() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0);
        let b = Rect::new(3.0, 3.0, 2.0, 2.0);
        assert_eq!(a.intersection_opt(&b), None);
    }

    #[test]
    fn rect_inner_clamps_to_zero() {
        let rect = Rect::new(0.0, 0.0, 10.0, 4.0);
        let inner = rect.inner(Sides::all(3.0));
        assert_eq!(inner, Rect::new(3.0, 3.0, 4.0, 0.0));
        assert!(inner.is_empty());
    }

    #[test]
    fn clamp_within_pins_oversized_rect() {
        let bounds = Rect::from_size(100.0, 100.0);
        let moved = Rect::new(90.0, -10.0, 50.0, 20.0).clamp_within(&bounds);
        assert_eq!(moved, Rect::new(50.0, 0.0, 50.0, 20.0));

        let huge = Rect::new(30.0, 30.0, 200.0, 200.0).clamp_within(&bounds);
        assert_eq!(huge.x, 0.0);
        assert_eq!(huge.y, 0.0);
    }

    #[test]
    fn size_box_min_max_are_componentwise() {
        let a = SizeBox::new(10.0, f64::INFINITY);
        let b = SizeBox::new(20.0, 5.0);
        assert_eq!(a.max(b), SizeBox::new(20.0, f64::INFINITY));
        assert_eq!(a.min(b), SizeBox::new(10.0, 5.0));
        assert!(!a.is_bounded());
        assert!(b.is_bounded());
    }

    mod property {
        use crate::geometry::Rect;
        use proptest::prelude::*;

        fn rect() -> impl Strategy<Value = Rect> {
            (-500.0..500.0f64, -500.0..500.0f64, 0.0..400.0f64, 0.0..400.0f64)
                .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn clamped_rects_fit_when_small_enough(r in rect(), bounds in rect()) {
                let clamped = r.clamp_within(&bounds);
                prop_assert_eq!(clamped.size(), r.size());
                if r.width <= bounds.width && r.height <= bounds.height {
                    prop_assert!(clamped.x >= bounds.x && clamped.right() <= bounds.right() + 1e-9);
                    prop_assert!(clamped.y >= bounds.y && clamped.bottom() <= bounds.bottom() + 1e-9);
                }
            }

            #[test]
            fn intersection_lies_inside_both(a in rect(), b in rect()) {
                if let Some(i) = a.intersection_opt(&b) {
                    let u = a.union(&b);
                    prop_assert!(i.x >= a.x && i.x >= b.x);
                    prop_assert!(i.right() <= a.right() + 1e-9 && i.right() <= b.right() + 1e-9);
                    prop_assert!(u.x <= i.x && u.bottom() + 1e-9 >= i.bottom());
                }
            }
        }
    }
}

#![forbid(unsafe_code)]

//! Geometric primitives in screen space.
//!
//! All coordinates are logical pixels with the origin at the top-left of the
//! primary screen. Values are `f64` because host toolkits report fractional
//! pointer positions on scaled displays.

use serde::{Deserialize, Serialize};

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset of `self` from `origin`.
    #[inline]
    #[must_use]
    pub fn delta_from(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }

    /// Translate by a delta.
    #[inline]
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        let (dx, dy) = self.delta_from(other);
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions up to a floor.
    ///
    /// Non-finite dimensions collapse to the floor.
    #[must_use]
    pub fn at_least(self, floor: Size) -> Self {
        let clamp = |value: f64, min: f64| {
            if value.is_finite() { value.max(min) } else { min }
        };
        Self {
            width: clamp(self.width, floor.width),
            height: clamp(self.height, floor.height),
        }
    }
}

/// Split orientation shared by dock groups and half-split computations.
///
/// `Horizontal` lays children out left to right; `Vertical` top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// An axis-aligned rectangle used for window bounds, dock zones, and hit testing.
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
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if the rectangle has zero or negative area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Move the rectangle so its top-left corner sits at `origin`.
    #[inline]
    #[must_use]
    pub fn with_origin(self, origin: Point) -> Self {
        Self::from_parts(origin, self.size())
    }

    /// Position of `point` relative to this rectangle's top-left corner.
    #[inline]
    #[must_use]
    pub fn relative(&self, point: Point) -> Point {
        Point::new(point.x - self.x, point.y - self.y)
    }

    /// Split into consecutive slices along `axis`, proportional to `fractions`.
    ///
    /// The last slice absorbs floating-point remainder so the slices always
    /// tile the rectangle exactly.
    #[must_use]
    pub fn split_fractions(&self, axis: Axis, fractions: &[f64]) -> Vec<Rect> {
        let total = match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        };
        let mut out = Vec::with_capacity(fractions.len());
        let mut cursor = 0.0;
        for (index, fraction) in fractions.iter().enumerate() {
            let extent = if index + 1 == fractions.len() {
                total - cursor
            } else {
                total * fraction
            };
            let slice = match axis {
                Axis::Horizontal => Rect::new(self.x + cursor, self.y, extent, self.height),
                Axis::Vertical => Rect::new(self.x, self.y + cursor, self.width, extent),
            };
            out.push(slice);
            cursor += extent;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_center() {
        let r = Rect::new(100.0, 100.0, 400.0, 300.0);
        assert_eq!(r.right(), 500.0);
        assert_eq!(r.bottom(), 400.0);
        assert_eq!(r.center(), Point::new(300.0, 250.0));
    }

    #[test]
    fn overlap_requires_shared_area() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        // Touching edges only.
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 20.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(2.0, 2.0, 0.0, 5.0)));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(!r.contains(Point::new(10.0, 5.0)));
    }

    #[test]
    fn split_fractions_tiles_exactly() {
        let r = Rect::new(520.0, 100.0, 400.0, 300.0);
        let halves = r.split_fractions(Axis::Horizontal, &[0.5, 0.5]);
        assert_eq!(halves[0], Rect::new(520.0, 100.0, 200.0, 300.0));
        assert_eq!(halves[1], Rect::new(720.0, 100.0, 200.0, 300.0));

        let thirds = r.split_fractions(Axis::Vertical, &[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
        assert_eq!(thirds.len(), 3);
        assert_eq!(thirds[2].bottom(), r.bottom());
    }

    #[test]
    fn size_floor_clamps_underflow() {
        let floor = Size::new(120.0, 80.0);
        assert_eq!(Size::new(-5.0, 300.0).at_least(floor), Size::new(120.0, 300.0));
        assert_eq!(Size::new(f64::NAN, 10.0).at_least(floor), floor);
    }

    #[test]
    fn point_delta_and_distance() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.delta_from(Point::default()), (3.0, 4.0));
        assert_eq!(a.distance(Point::default()), 5.0);
        assert_eq!(a.offset(-3.0, 1.0), Point::new(0.0, 5.0));
    }
}

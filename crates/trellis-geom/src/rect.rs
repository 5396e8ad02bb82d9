use serde::{Deserialize, Serialize};

use super::{Axis, Expanse, Point};

/// A rectangle positioned relative to the content origin of its container.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build a rectangle from start offsets and extents along a primary axis
    /// and its cross axis.
    pub fn from_main_cross(
        axis: Axis,
        main_start: u32,
        main_extent: u32,
        cross_start: u32,
        cross_extent: u32,
    ) -> Self {
        Expanse::from_main_cross(axis, main_extent, cross_extent)
            .at(Point::from_main_cross(axis, main_start, cross_start))
    }

    /// The size of the rectangle.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Offset of the leading edge along an axis.
    pub fn start(&self, axis: Axis) -> u32 {
        self.tl.on(axis)
    }

    /// Extent along an axis.
    pub fn extent(&self, axis: Axis) -> u32 {
        self.expanse().on(axis)
    }

    /// Offset of the trailing edge along an axis.
    pub fn end(&self, axis: Axis) -> u32 {
        self.start(axis).saturating_add(self.extent(axis))
    }

    /// Translate the rectangle by an offset.
    pub fn shift(&self, dx: u32, dy: u32) -> Self {
        Self {
            tl: self.tl.offset(dx, dy),
            ..*self
        }
    }

    /// Does this rectangle contain the point?
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.tl.x && p.x < self.end(Axis::Horizontal) && p.y >= self.tl.y
            && p.y < self.end(Axis::Vertical)
    }

    /// Does this rectangle completely enclose `other`?
    pub fn contains_rect(&self, other: &Self) -> bool {
        other.tl.x >= self.tl.x
            && other.tl.y >= self.tl.y
            && other.end(Axis::Horizontal) <= self.end(Axis::Horizontal)
            && other.end(Axis::Vertical) <= self.end(Axis::Vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_cross_construction() {
        let r = Rect::from_main_cross(Axis::Vertical, 10, 80, 2, 30);
        assert_eq!(r, Rect::new(2, 10, 30, 80));
        assert_eq!(r.start(Axis::Vertical), 10);
        assert_eq!(r.end(Axis::Vertical), 90);
        assert_eq!(r.extent(Axis::Horizontal), 30);
    }

    #[test]
    fn containment() {
        let outer = Rect::new(0, 0, 10, 10);
        assert!(outer.contains_point(Point { x: 9, y: 9 }));
        assert!(!outer.contains_point(Point { x: 10, y: 0 }));
        assert!(outer.contains_rect(&Rect::new(2, 2, 8, 8)));
        assert!(!outer.contains_rect(&Rect::new(2, 2, 9, 8)));
    }
}

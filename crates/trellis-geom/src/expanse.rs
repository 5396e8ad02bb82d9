use serde::{Deserialize, Serialize};

use super::{Axis, Point, Rect};

/// An `Expanse` is a rectangle that has a width and height but no location.
/// Measured sizes and computed container sizes are both expanses.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Expanse {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Expanse {
    /// A zero-sized expanse.
    pub const ZERO: Self = Self { w: 0, h: 0 };

    /// Construct an expanse.
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Build an expanse from extents along a primary axis and its cross axis.
    pub fn from_main_cross(axis: Axis, main: u32, cross: u32) -> Self {
        match axis {
            Axis::Horizontal => Self { w: main, h: cross },
            Axis::Vertical => Self { w: cross, h: main },
        }
    }

    /// The extent along an axis.
    pub fn on(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.w,
            Axis::Vertical => self.h,
        }
    }

    /// Replace the extent along one axis.
    pub fn with(self, axis: Axis, value: u32) -> Self {
        match axis {
            Axis::Horizontal => Self { w: value, ..self },
            Axis::Vertical => Self { h: value, ..self },
        }
    }

    /// True if both extents are zero.
    pub fn is_zero(&self) -> bool {
        self.w == 0 && self.h == 0
    }

    /// Return a `Rect` with the same dimensions as the `Expanse`, at `tl`.
    pub fn at(&self, tl: Point) -> Rect {
        Rect {
            tl,
            w: self.w,
            h: self.h,
        }
    }

    /// True if this expanse can completely enclose the target in both dimensions.
    pub fn contains(&self, other: &Self) -> bool {
        self.w >= other.w && self.h >= other.h
    }
}

impl From<Rect> for Expanse {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(u32, u32)> for Expanse {
    fn from(v: (u32, u32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_accessors() {
        let e = Expanse::new(4, 9);
        assert_eq!(e.on(Axis::Horizontal), 4);
        assert_eq!(e.on(Axis::Vertical), 9);
        assert_eq!(e.with(Axis::Vertical, 1), Expanse::new(4, 1));
        assert_eq!(Expanse::from_main_cross(Axis::Horizontal, 4, 9), e);
        assert_eq!(Expanse::from_main_cross(Axis::Vertical, 9, 4), e);
    }
}

use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::Axis;

/// A pixel position relative to the content origin of a container.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: u32,
    /// Vertical offset.
    pub y: u32,
}

impl Point {
    /// The origin.
    pub fn zero() -> Self {
        (0, 0).into()
    }

    /// Build a point from offsets along a primary axis and its cross axis.
    pub fn from_main_cross(axis: Axis, main: u32, cross: u32) -> Self {
        match axis {
            Axis::Horizontal => Self { x: main, y: cross },
            Axis::Vertical => Self { x: cross, y: main },
        }
    }

    /// The coordinate along an axis.
    pub fn on(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.x,
            Axis::Vertical => self.y,
        }
    }

    /// Shift the point by an offset, saturating at the numeric bounds.
    pub fn offset(&self, dx: u32, dy: u32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

impl From<(u32, u32)> for Point {
    #[inline]
    fn from(v: (u32, u32)) -> Self {
        Self { x: v.0, y: v.1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(Point::zero() + (1u32, 1u32).into(), (1u32, 1u32).into());
        assert_eq!(Point::zero() + (1u32, 0u32).into(), (1u32, 0u32).into());
        assert_eq!(Point { x: u32::MAX, y: 1 } + (1u32, 1u32).into(), Point { x: u32::MAX, y: 2 });
    }

    #[test]
    fn main_cross_swaps_for_vertical() {
        let p = Point::from_main_cross(Axis::Vertical, 10, 3);
        assert_eq!(p, Point { x: 3, y: 10 });
        assert_eq!(p.on(Axis::Vertical), 10);
        assert_eq!(p.on(Axis::Horizontal), 3);
    }
}

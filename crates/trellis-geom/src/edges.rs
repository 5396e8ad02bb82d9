use serde::{Deserialize, Serialize};

use super::Axis;

/// Pixel widths for the four sides of a box. Used for margins, borders and
/// paddings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Edges {
    /// Top edge.
    pub top: u32,
    /// Right edge.
    pub right: u32,
    /// Bottom edge.
    pub bottom: u32,
    /// Left edge.
    pub left: u32,
}

impl Edges {
    /// No edges.
    pub const ZERO: Self = Self {
        top: 0,
        right: 0,
        bottom: 0,
        left: 0,
    };

    /// Construct edges in CSS order: top, right, bottom, left.
    pub fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same width on every side.
    pub fn uniform(v: u32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Keep only the sides that are enabled, zeroing the others.
    pub fn masked(&self, top: bool, right: bool, bottom: bool, left: bool) -> Self {
        Self {
            top: if top { self.top } else { 0 },
            right: if right { self.right } else { 0 },
            bottom: if bottom { self.bottom } else { 0 },
            left: if left { self.left } else { 0 },
        }
    }

    /// Combined left and right widths.
    pub fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Combined top and bottom widths.
    pub fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }

    /// The leading edge along an axis: left for horizontal, top for vertical.
    pub fn leading(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.left,
            Axis::Vertical => self.top,
        }
    }

    /// The trailing edge along an axis: right for horizontal, bottom for
    /// vertical.
    pub fn trailing(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.right,
            Axis::Vertical => self.bottom,
        }
    }

    /// Sum of both edges along an axis.
    pub fn along(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Horizontal => self.horizontal(),
            Axis::Vertical => self.vertical(),
        }
    }

    /// Side-wise sum of two edge sets.
    pub fn plus(&self, other: &Self) -> Self {
        Self {
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
            left: self.left.saturating_add(other.left),
        }
    }
}

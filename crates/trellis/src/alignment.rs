//! Child alignment inside a slot.
//!
//! The server encodes alignment as a bitmask; [`Alignment`] is the decoded
//! form. A slot is aligned independently on both axes.

use serde::{Deserialize, Serialize};

use crate::geom::Axis;

/// Bit for left alignment.
pub const ALIGN_LEFT: u32 = 1;
/// Bit for right alignment.
pub const ALIGN_RIGHT: u32 = 2;
/// Bit for top alignment.
pub const ALIGN_TOP: u32 = 4;
/// Bit for bottom alignment.
pub const ALIGN_BOTTOM: u32 = 8;
/// Bit for horizontal centering.
pub const ALIGN_HORIZONTAL_CENTER: u32 = 16;
/// Bit for vertical centering.
pub const ALIGN_VERTICAL_CENTER: u32 = 32;

/// Alignment along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    /// Leading edge: left or top.
    #[default]
    Start,
    /// Centered.
    Center,
    /// Trailing edge: right or bottom.
    End,
}

impl Align {
    /// Offset of a child of extent `child` inside `available` pixels. A child
    /// larger than the space sits at the leading edge.
    pub fn offset(self, child: u32, available: u32) -> u32 {
        match self {
            Self::Start => 0,
            Self::Center => available.saturating_sub(child) / 2,
            Self::End => available.saturating_sub(child),
        }
    }
}

/// Horizontal placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizontal {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Vertical placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    /// Flush top.
    #[default]
    Top,
    /// Centered.
    Middle,
    /// Flush bottom.
    Bottom,
}

/// One of the nine alignment combinations. The default is top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Alignment {
    /// Horizontal component.
    pub horizontal: Horizontal,
    /// Vertical component.
    pub vertical: Vertical,
}

impl Alignment {
    /// Top left.
    pub const TOP_LEFT: Self = Self::new(Horizontal::Left, Vertical::Top);
    /// Top center.
    pub const TOP_CENTER: Self = Self::new(Horizontal::Center, Vertical::Top);
    /// Top right.
    pub const TOP_RIGHT: Self = Self::new(Horizontal::Right, Vertical::Top);
    /// Middle left.
    pub const MIDDLE_LEFT: Self = Self::new(Horizontal::Left, Vertical::Middle);
    /// Middle center.
    pub const MIDDLE_CENTER: Self = Self::new(Horizontal::Center, Vertical::Middle);
    /// Middle right.
    pub const MIDDLE_RIGHT: Self = Self::new(Horizontal::Right, Vertical::Middle);
    /// Bottom left.
    pub const BOTTOM_LEFT: Self = Self::new(Horizontal::Left, Vertical::Bottom);
    /// Bottom center.
    pub const BOTTOM_CENTER: Self = Self::new(Horizontal::Center, Vertical::Bottom);
    /// Bottom right.
    pub const BOTTOM_RIGHT: Self = Self::new(Horizontal::Right, Vertical::Bottom);

    /// Combine horizontal and vertical placement.
    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Decode a server bitmask. Missing bits default to top and left; when
    /// conflicting bits are set, centering wins, then right/bottom.
    pub fn from_bits(bits: u32) -> Self {
        let horizontal = if bits & ALIGN_HORIZONTAL_CENTER != 0 {
            Horizontal::Center
        } else if bits & ALIGN_RIGHT != 0 {
            Horizontal::Right
        } else {
            Horizontal::Left
        };
        let vertical = if bits & ALIGN_VERTICAL_CENTER != 0 {
            Vertical::Middle
        } else if bits & ALIGN_BOTTOM != 0 {
            Vertical::Bottom
        } else {
            Vertical::Top
        };
        Self::new(horizontal, vertical)
    }

    /// Encode as a server bitmask.
    pub fn bits(&self) -> u32 {
        let h = match self.horizontal {
            Horizontal::Left => ALIGN_LEFT,
            Horizontal::Center => ALIGN_HORIZONTAL_CENTER,
            Horizontal::Right => ALIGN_RIGHT,
        };
        let v = match self.vertical {
            Vertical::Top => ALIGN_TOP,
            Vertical::Middle => ALIGN_VERTICAL_CENTER,
            Vertical::Bottom => ALIGN_BOTTOM,
        };
        h | v
    }

    /// The placement along one axis.
    pub fn along(&self, axis: Axis) -> Align {
        match axis {
            Axis::Horizontal => match self.horizontal {
                Horizontal::Left => Align::Start,
                Horizontal::Center => Align::Center,
                Horizontal::Right => Align::End,
            },
            Axis::Vertical => match self.vertical {
                Vertical::Top => Align::Start,
                Vertical::Middle => Align::Center,
                Vertical::Bottom => Align::End,
            },
        }
    }

    /// True for the top-left default, which needs no positioning rule.
    pub fn is_top_left(&self) -> bool {
        *self == Self::TOP_LEFT
    }
}

impl From<u32> for Alignment {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl From<Alignment> for u32 {
    fn from(a: Alignment) -> Self {
        a.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_roundtrip_all_nine() {
        for h in [Horizontal::Left, Horizontal::Center, Horizontal::Right] {
            for v in [Vertical::Top, Vertical::Middle, Vertical::Bottom] {
                let a = Alignment::new(h, v);
                assert_eq!(Alignment::from_bits(a.bits()), a);
            }
        }
    }

    #[test]
    fn missing_bits_default_to_top_left() {
        assert_eq!(Alignment::from_bits(0), Alignment::TOP_LEFT);
        assert_eq!(Alignment::from_bits(ALIGN_RIGHT), Alignment::TOP_RIGHT);
        assert_eq!(
            Alignment::from_bits(ALIGN_BOTTOM | ALIGN_HORIZONTAL_CENTER),
            Alignment::BOTTOM_CENTER
        );
    }

    #[test]
    fn offsets() {
        assert_eq!(Align::Start.offset(10, 50), 0);
        assert_eq!(Align::Center.offset(10, 50), 20);
        assert_eq!(Align::Center.offset(10, 51), 20);
        assert_eq!(Align::End.offset(10, 50), 40);
        assert_eq!(Align::End.offset(60, 50), 0);
    }

    #[test]
    fn along_axis() {
        let a = Alignment::MIDDLE_RIGHT;
        assert_eq!(a.along(Axis::Horizontal), Align::End);
        assert_eq!(a.along(Axis::Vertical), Align::Center);
    }
}

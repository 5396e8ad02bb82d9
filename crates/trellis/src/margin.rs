use serde::{Deserialize, Serialize};

use crate::geom::Edges;

/// Bit for the top margin.
pub const MARGIN_TOP: u8 = 1;
/// Bit for the right margin.
pub const MARGIN_RIGHT: u8 = 2;
/// Bit for the bottom margin.
pub const MARGIN_BOTTOM: u8 = 4;
/// Bit for the left margin.
pub const MARGIN_LEFT: u8 = 8;

/// Which sides of a container have a margin. Each side toggles independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct MarginInfo {
    /// Raw bitmask.
    bits: u8,
}

impl MarginInfo {
    /// No margins.
    pub const NONE: Self = Self { bits: 0 };
    /// Margins on every side.
    pub const ALL: Self = Self {
        bits: MARGIN_TOP | MARGIN_RIGHT | MARGIN_BOTTOM | MARGIN_LEFT,
    };

    /// Build from a bitmask. Unknown bits are dropped.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            bits: bits & Self::ALL.bits,
        }
    }

    /// Build from per-side flags.
    pub fn new(top: bool, right: bool, bottom: bool, left: bool) -> Self {
        let mut bits = 0;
        for (on, bit) in [
            (top, MARGIN_TOP),
            (right, MARGIN_RIGHT),
            (bottom, MARGIN_BOTTOM),
            (left, MARGIN_LEFT),
        ] {
            if on {
                bits |= bit;
            }
        }
        Self { bits }
    }

    /// Raw bitmask.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Top margin enabled.
    pub fn top(&self) -> bool {
        self.bits & MARGIN_TOP != 0
    }

    /// Right margin enabled.
    pub fn right(&self) -> bool {
        self.bits & MARGIN_RIGHT != 0
    }

    /// Bottom margin enabled.
    pub fn bottom(&self) -> bool {
        self.bits & MARGIN_BOTTOM != 0
    }

    /// Left margin enabled.
    pub fn left(&self) -> bool {
        self.bits & MARGIN_LEFT != 0
    }

    /// Pixel margins for the enabled sides, taken from the themed sizes.
    pub fn resolve(&self, sizes: Edges) -> Edges {
        sizes.masked(self.top(), self.right(), self.bottom(), self.left())
    }
}

impl From<u8> for MarginInfo {
    fn from(bits: u8) -> Self {
        Self::from_bits(bits)
    }
}

impl From<MarginInfo> for u8 {
    fn from(m: MarginInfo) -> Self {
        m.bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_masks_sides() {
        let m = MarginInfo::from_bits(MARGIN_TOP | MARGIN_BOTTOM);
        assert_eq!(m.resolve(Edges::uniform(10)), Edges::new(10, 0, 10, 0));
        assert_eq!(MarginInfo::from_bits(0xff), MarginInfo::ALL);
        assert_eq!(MarginInfo::new(false, true, false, true).bits(), 10);
    }
}

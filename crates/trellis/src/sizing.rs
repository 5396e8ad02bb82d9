//! Declared sizes and CSS-like length units.
//!
//! Children declare their width and height as strings: `"120px"`, `"50%"`,
//! `"2em"` or the empty string, which means "undefined" (shrink to content).
//! A dimension ending in `%` is *relative*: the layout resolves it against the
//! space it allocates to the slot.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// CSS pixels per inch.
const PX_PER_IN: f64 = 96.0;

/// A length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    /// CSS pixels.
    #[default]
    Px,
    /// Percentage of the containing extent.
    Percent,
    /// Relative to the element font size.
    Em,
    /// Relative to the root font size.
    Rem,
    /// Relative to the x-height, approximated as half an em.
    Ex,
    /// Points, 1/72 inch.
    Pt,
    /// Picas, 12 points.
    Pc,
    /// Inches.
    In,
    /// Centimetres.
    Cm,
    /// Millimetres.
    Mm,
}

impl Unit {
    /// Look up a unit by its symbol. The empty symbol is pixels.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol.trim().to_ascii_lowercase().as_str() {
            "" | "px" => Self::Px,
            "%" => Self::Percent,
            "em" => Self::Em,
            "rem" => Self::Rem,
            "ex" => Self::Ex,
            "pt" => Self::Pt,
            "pc" => Self::Pc,
            "in" => Self::In,
            "cm" => Self::Cm,
            "mm" => Self::Mm,
            _ => return None,
        })
    }

    /// The canonical symbol for this unit.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Em => "em",
            Self::Rem => "rem",
            Self::Ex => "ex",
            Self::Pt => "pt",
            Self::Pc => "pc",
            Self::In => "in",
            Self::Cm => "cm",
            Self::Mm => "mm",
        }
    }

    /// Convert a value in this unit to pixels. Percentages have no absolute
    /// size and return `None`.
    pub fn to_px(self, value: f64, font_size: f64) -> Option<f64> {
        Some(match self {
            Self::Px => value,
            Self::Percent => return None,
            Self::Em | Self::Rem => value * font_size,
            Self::Ex => value * font_size / 2.0,
            Self::Pt => value * PX_PER_IN / 72.0,
            Self::Pc => value * PX_PER_IN / 6.0,
            Self::In => value * PX_PER_IN,
            Self::Cm => value * PX_PER_IN / 2.54,
            Self::Mm => value * PX_PER_IN / 25.4,
        })
    }
}

/// Split a CSS-like length into its numeric part and unit symbol.
pub(crate) fn split_length(s: &str) -> Option<(f64, &str)> {
    let s = s.trim();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(s.len());
    let (number, symbol) = s.split_at(end);
    let value = number.parse::<f64>().ok()?;
    value.is_finite().then_some((value, symbol.trim()))
}

/// A declared width or height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dimension {
    /// No declared size: the widget is as large as its content.
    #[default]
    Undefined,
    /// A fixed length.
    Fixed(f64, Unit),
    /// A percentage of the space the layout allocates to the slot.
    Relative(f64),
}

impl Dimension {
    /// A fixed pixel size.
    pub fn px(value: u32) -> Self {
        Self::Fixed(f64::from(value), Unit::Px)
    }

    /// A percentage size.
    pub fn percent(value: f64) -> Self {
        Self::Relative(value)
    }

    /// True if the declared size ends in a percent sign.
    pub fn is_relative(&self) -> bool {
        matches!(self, Self::Relative(_))
    }

    /// True if no size is declared.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// The percentage for a relative size.
    pub fn percentage(&self) -> Option<f64> {
        match self {
            Self::Relative(p) => Some(*p),
            _ => None,
        }
    }

    /// Resolve a fixed size to whole pixels.
    pub fn fixed_px(&self, font_size: f64) -> Option<u32> {
        match self {
            Self::Fixed(v, unit) => unit.to_px(*v, font_size).map(round_px),
            _ => None,
        }
    }

    /// Apply a relative size to the extent it is resolved against. Fixed
    /// and undefined sizes return `None`.
    pub fn resolve_relative(&self, extent: u32) -> Option<u32> {
        self.percentage()
            .map(|p| round_px(f64::from(extent) * p / 100.0).min(extent))
    }
}

/// Round a non-negative pixel value, clamping negatives to zero.
pub(crate) fn round_px(v: f64) -> u32 {
    if v.is_nan() || v <= 0.0 {
        0
    } else if v >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        v.round() as u32
    }
}

impl FromStr for Dimension {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::Undefined);
        }
        let (value, symbol) =
            split_length(trimmed).ok_or_else(|| ParseError::with_input("bad size", s))?;
        if value < 0.0 {
            return Err(ParseError::with_input("negative size", s));
        }
        match Unit::from_symbol(symbol) {
            Some(Unit::Percent) => Ok(Self::Relative(value)),
            Some(unit) => Ok(Self::Fixed(value, unit)),
            None => Err(ParseError::with_input("unknown unit", s)),
        }
    }
}

impl TryFrom<String> for Dimension {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dimension> for String {
    fn from(d: Dimension) -> Self {
        d.to_string()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => Ok(()),
            Self::Fixed(v, unit) => write!(f, "{v}{}", unit.symbol()),
            Self::Relative(v) => write!(f, "{v}%"),
        }
    }
}

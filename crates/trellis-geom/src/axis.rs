use serde::{Deserialize, Serialize};

/// A layout axis. For an ordered layout the orientation names the primary
/// axis; the other one is the secondary axis.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    #[default]
    Vertical,
}

impl Axis {
    /// The perpendicular axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// True for the vertical axis.
    pub fn is_vertical(self) -> bool {
        self == Self::Vertical
    }
}

//! Slot captions.

use serde::{Deserialize, Serialize};

use crate::geom::Axis;

/// Where a caption sits relative to its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionPosition {
    /// Above the widget.
    #[default]
    Top,
    /// After the widget, on the same line.
    Right,
    /// Below the widget.
    Bottom,
    /// Before the widget, on the same line.
    Left,
}

impl CaptionPosition {
    /// The axis along which caption and widget are stacked.
    pub fn stacking_axis(self) -> Axis {
        match self {
            Self::Top | Self::Bottom => Axis::Vertical,
            Self::Left | Self::Right => Axis::Horizontal,
        }
    }

    /// True if the caption precedes the widget along its stacking axis.
    pub fn is_leading(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }
}

/// Caption content for a slot. A caption with neither text nor icon is not
/// rendered at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Caption {
    /// Caption text.
    pub text: Option<String>,
    /// Icon URL.
    pub icon: Option<String>,
    /// Extra style names.
    pub styles: Vec<String>,
    /// Error indicator text.
    pub error: Option<String>,
}

impl Caption {
    /// A text-only caption.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// True if the caption has nothing to show and should be torn down.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(str::is_empty) && self.icon.is_none()
    }
}

/// The outcome of updating a slot's caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionChange {
    /// A caption wrapper was created.
    Created,
    /// An existing caption changed content.
    Updated,
    /// The caption wrapper was torn down.
    Removed,
    /// Nothing changed.
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_captions() {
        assert!(Caption::default().is_empty());
        assert!(Caption::text("").is_empty());
        assert!(!Caption::text("Name").is_empty());
        let icon_only = Caption {
            icon: Some("img/user.png".into()),
            ..Caption::default()
        };
        assert!(!icon_only.is_empty());
        // Error text alone does not keep a caption alive.
        let error_only = Caption {
            error: Some("required".into()),
            ..Caption::default()
        };
        assert!(error_only.is_empty());
    }

    #[test]
    fn stacking() {
        assert_eq!(CaptionPosition::Top.stacking_axis(), Axis::Vertical);
        assert_eq!(CaptionPosition::Right.stacking_axis(), Axis::Horizontal);
        assert!(CaptionPosition::Left.is_leading());
        assert!(!CaptionPosition::Bottom.is_leading());
    }
}

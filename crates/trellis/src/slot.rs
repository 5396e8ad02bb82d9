//! Per-child slots.
//!
//! A slot wraps one child widget of a layout container together with the
//! metadata the engine needs: alignment, expand ratio, declared size and the
//! caption, which the slot owns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    alignment::{Alignment, Horizontal, Vertical},
    caption::{Caption, CaptionChange, CaptionPosition},
    id::WidgetId,
    measure::{Element, MeasureCache, Measurer},
    ordered::SlotInput,
    sizing::Dimension,
};

/// How a slot shares in leftover space.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct ExpandRatio(Option<f64>);

impl ExpandRatio {
    /// The "not expanding" sentinel.
    pub const NONE: Self = Self(None);

    /// A ratio. Negative and non-finite values mean "not expanding".
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio >= 0.0 {
            Self(Some(ratio))
        } else {
            Self::NONE
        }
    }

    /// The ratio, if the slot participates in distribution.
    pub fn get(&self) -> Option<f64> {
        self.0
    }

    /// True if the ratio is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0.is_some_and(|r| r > 0.0)
    }
}

impl fmt::Debug for ExpandRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(r) => write!(f, "ExpandRatio({r})"),
            None => f.write_str("ExpandRatio(none)"),
        }
    }
}

impl From<f64> for ExpandRatio {
    fn from(r: f64) -> Self {
        Self::new(r)
    }
}

impl From<ExpandRatio> for f64 {
    fn from(r: ExpandRatio) -> Self {
        r.0.unwrap_or(-1.0)
    }
}

/// One child of a layout container.
#[derive(Debug, Clone)]
pub struct Slot {
    /// The child widget. The widget itself is owned by the container.
    widget: WidgetId,
    /// Placement inside the slot.
    alignment: Alignment,
    /// Share of leftover space.
    expand_ratio: ExpandRatio,
    /// Declared width.
    width: Dimension,
    /// Declared height.
    height: Dimension,
    /// Caption, if one is shown.
    caption: Option<Caption>,
    /// Caption placement.
    caption_position: CaptionPosition,
    /// Whether a spacer precedes this slot.
    leading_spacer: bool,
    /// Style markers for the rendering layer.
    markers: Vec<&'static str>,
}

impl Slot {
    /// Create a slot for a newly attached widget.
    pub fn new(widget: WidgetId) -> Self {
        let mut slot = Self {
            widget,
            alignment: Alignment::default(),
            expand_ratio: ExpandRatio::NONE,
            width: Dimension::Undefined,
            height: Dimension::Undefined,
            caption: None,
            caption_position: CaptionPosition::default(),
            leading_spacer: false,
            markers: Vec::new(),
        };
        slot.refresh_markers();
        slot
    }

    /// The child widget.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// Current alignment.
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Store a new alignment. Only this slot's markers change.
    pub fn set_alignment(&mut self, alignment: Alignment) {
        if self.alignment != alignment {
            self.alignment = alignment;
            self.refresh_markers();
        }
    }

    /// Current expand ratio.
    pub fn expand_ratio(&self) -> ExpandRatio {
        self.expand_ratio
    }

    /// Set the expand ratio; negative values mean "do not expand".
    pub fn set_expand_ratio(&mut self, ratio: f64) {
        self.expand_ratio = ExpandRatio::new(ratio);
        self.refresh_markers();
    }

    /// Declared width.
    pub fn width(&self) -> Dimension {
        self.width
    }

    /// Declared height.
    pub fn height(&self) -> Dimension {
        self.height
    }

    /// Record the child's declared size.
    pub fn set_size(&mut self, width: Dimension, height: Dimension) {
        self.width = width;
        self.height = height;
        self.refresh_markers();
    }

    /// The caption, if shown.
    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    /// Caption placement.
    pub fn caption_position(&self) -> CaptionPosition {
        self.caption_position
    }

    /// Change caption placement.
    pub fn set_caption_position(&mut self, position: CaptionPosition) {
        self.caption_position = position;
    }

    /// Update the caption. A caption with neither text nor icon tears down
    /// any existing caption wrapper. Repeating the same caption is a no-op.
    pub fn set_caption(&mut self, caption: Option<Caption>) -> CaptionChange {
        let caption = caption.filter(|c| !c.is_empty());
        let change = match (&self.caption, &caption) {
            (None, None) => CaptionChange::Unchanged,
            (None, Some(_)) => CaptionChange::Created,
            (Some(_), None) => CaptionChange::Removed,
            (Some(old), Some(new)) if old == new => CaptionChange::Unchanged,
            (Some(_), Some(_)) => CaptionChange::Updated,
        };
        if change != CaptionChange::Unchanged {
            self.caption = caption;
            self.refresh_markers();
        }
        change
    }

    /// Whether a spacer precedes this slot.
    pub fn has_leading_spacer(&self) -> bool {
        self.leading_spacer
    }

    /// Add or remove the spacer that precedes this slot. Returns true if the
    /// flag changed.
    pub fn set_spacing(&mut self, enabled: bool) -> bool {
        if self.leading_spacer == enabled {
            return false;
        }
        self.leading_spacer = enabled;
        self.refresh_markers();
        true
    }

    /// Style markers describing which positioning rules apply.
    pub fn markers(&self) -> &[&'static str] {
        &self.markers
    }

    /// Recompute style markers from the slot state.
    fn refresh_markers(&mut self) {
        let mut m = Vec::new();
        match self.alignment.horizontal {
            Horizontal::Left => {}
            Horizontal::Center => m.push("align-center"),
            Horizontal::Right => m.push("align-right"),
        }
        match self.alignment.vertical {
            Vertical::Top => {}
            Vertical::Middle => m.push("align-middle"),
            Vertical::Bottom => m.push("align-bottom"),
        }
        if !self.alignment.is_top_left() {
            m.push("positioned");
        }
        if self.expand_ratio.is_positive() {
            m.push("expand");
        }
        if self.width.is_relative() {
            m.push("relative-width");
        }
        if self.height.is_relative() {
            m.push("relative-height");
        }
        if self.caption.is_some() {
            m.push("has-caption");
        }
        if self.leading_spacer {
            m.push("spacing");
        }
        self.markers = m;
    }

    /// Gather the slot's contribution for the engine. The caption is measured
    /// before the widget.
    pub fn input(&self, cache: &mut MeasureCache, measurer: &mut dyn Measurer) -> SlotInput {
        let caption = self
            .caption
            .as_ref()
            .map(|_| cache.size(Element::Caption(self.widget), measurer));
        let widget = cache.size(Element::Widget(self.widget), measurer);
        SlotInput {
            widget,
            caption,
            caption_position: self.caption_position,
            width: self.width,
            height: self.height,
            expand_ratio: self.expand_ratio,
            alignment: self.alignment,
            leading_spacer: self.leading_spacer,
        }
    }
}

//! Capabilities shared by the container kinds.
//!
//! Containers do not share a base type. Each kind implements the traits for
//! the roles it plays: [`Measurable`] for anything that can be solved into a
//! layout, [`CaptionOwner`] for containers that hold child captions, and
//! [`ExpandableChild`] for containers that accept per-child size hints.

use crate::{
    caption::{Caption, CaptionChange},
    config::Config,
    error::{Error, Result},
    geom::Expanse,
    id::WidgetId,
    measure::{Element, MeasureCache, Measurer},
    ordered::{Available, SlotGeometry},
    sizing::Dimension,
};

/// Everything a container needs while solving: the measurement cache, the
/// measurer behind it, and the active configuration.
pub struct SolveContext<'a> {
    /// Measurement cache.
    pub cache: &'a mut MeasureCache,
    /// Host measurer, consulted only for dirty entries.
    pub measurer: &'a mut dyn Measurer,
    /// Active configuration.
    pub config: &'a Config,
}

impl SolveContext<'_> {
    /// Outer size of a widget with fixed declared sizes applied.
    pub fn widget_size(&mut self, widget: WidgetId, width: Dimension, height: Dimension) -> Expanse {
        let measured = self.cache.size(Element::Widget(widget), self.measurer);
        self.with_fixed(measured, width, height)
    }

    /// Outer size of a widget's caption.
    pub fn caption_size(&mut self, widget: WidgetId) -> Expanse {
        self.cache.size(Element::Caption(widget), self.measurer)
    }

    /// Replace measured extents by fixed declared sizes.
    pub fn with_fixed(&self, measured: Expanse, width: Dimension, height: Dimension) -> Expanse {
        let fs = self.config.font_size;
        Expanse::new(
            width.fixed_px(fs).unwrap_or(measured.w),
            height.fixed_px(fs).unwrap_or(measured.h),
        )
    }
}

/// A solved container: its outer size and one geometry per child, relative
/// to the container's origin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerLayout {
    /// Outer size.
    pub size: Expanse,
    /// Child geometry in child order.
    pub children: Vec<(WidgetId, SlotGeometry)>,
}

impl ContainerLayout {
    /// Geometry for one child.
    pub fn child(&self, widget: WidgetId) -> Option<&SlotGeometry> {
        self.children
            .iter()
            .find(|(w, _)| *w == widget)
            .map(|(_, g)| g)
    }
}

/// Something that can be solved into a layout.
pub trait Measurable {
    /// Child widgets in layout order.
    fn children(&self) -> Vec<WidgetId>;

    /// Solve against the given availability.
    fn solve(&self, ctx: &mut SolveContext<'_>, width: Available, height: Available) -> ContainerLayout;
}

/// A container that holds captions for its children.
pub trait CaptionOwner {
    /// Set or clear a child's caption.
    fn set_child_caption(&mut self, child: WidgetId, caption: Option<Caption>) -> Result<CaptionChange>;

    /// A child's current caption.
    fn caption_of(&self, child: WidgetId) -> Option<&Caption>;
}

/// A container that accepts size hints for its children.
pub trait ExpandableChild {
    /// Set a child's declared size.
    fn set_child_size(&mut self, child: WidgetId, width: Dimension, height: Dimension) -> Result<()>;

    /// Set a child's expand ratio. Containers that never distribute leftover
    /// space reject this.
    fn set_child_expand_ratio(&mut self, child: WidgetId, ratio: f64) -> Result<()> {
        let _ = (child, ratio);
        Err(Error::Invalid("container does not distribute space".into()))
    }
}

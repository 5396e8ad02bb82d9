//! The ordered layout engine.
//!
//! Slots are laid out in list order along the primary axis (the container's
//! orientation) and aligned on the secondary axis. The solver is pure: it
//! takes measured slot inputs and returns geometry, so computing the same
//! inputs twice always yields the same output.
//!
//! Pass 1 sums the extents of every slot that is not relatively sized along
//! the primary axis, plus spacing and margins. An undefined container takes
//! that sum as its size. A definite container distributes whatever is left
//! over by expand ratio, or evenly across all slots when no slot declares a
//! positive ratio.
//!
//! Pass 2 finds the largest non-relative secondary extent, sizes the
//! container from it when undefined, and positions every slot according to
//! its alignment. Relatively sized slots are stretched.

use tracing::debug;

use crate::{
    alignment::Alignment,
    caption::CaptionPosition,
    geom::{Axis, Edges, Expanse, Rect},
    sizing::Dimension,
    slot::ExpandRatio,
};

/// Space offered to a container along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Available {
    /// A concrete pixel size.
    Definite(u32),
    /// Shrink to fit the content.
    #[default]
    Undefined,
}

impl Available {
    /// The pixel size, if definite.
    pub fn definite(self) -> Option<u32> {
        match self {
            Self::Definite(v) => Some(v),
            Self::Undefined => None,
        }
    }
}

/// Container-level inputs for the ordered engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedParams {
    /// Orientation: the primary axis.
    pub axis: Axis,
    /// Available width.
    pub width: Available,
    /// Available height.
    pub height: Available,
    /// Resolved pixel margins.
    pub margins: Edges,
    /// Pixel size of one spacer.
    pub spacing: u32,
}

impl OrderedParams {
    /// Availability along an axis.
    fn available(&self, axis: Axis) -> Available {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// Everything the engine needs to know about one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotInput {
    /// Measured outer size of the widget.
    pub widget: Expanse,
    /// Measured outer size of the caption, if there is one.
    pub caption: Option<Expanse>,
    /// Caption placement.
    pub caption_position: CaptionPosition,
    /// Declared width.
    pub width: Dimension,
    /// Declared height.
    pub height: Dimension,
    /// Share of leftover space.
    pub expand_ratio: ExpandRatio,
    /// Placement inside the slot.
    pub alignment: Alignment,
    /// Whether a spacer precedes the slot.
    pub leading_spacer: bool,
}

impl SlotInput {
    /// A captionless, top-left aligned, non-expanding slot of a fixed size.
    pub fn fixed(w: u32, h: u32) -> Self {
        Self {
            widget: Expanse::new(w, h),
            caption: None,
            caption_position: CaptionPosition::Top,
            width: Dimension::Undefined,
            height: Dimension::Undefined,
            expand_ratio: ExpandRatio::NONE,
            alignment: Alignment::TOP_LEFT,
            leading_spacer: false,
        }
    }

    /// Declared size along an axis.
    pub fn declared(&self, axis: Axis) -> Dimension {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// True if the widget is sized as a percentage along an axis.
    pub fn is_relative(&self, axis: Axis) -> bool {
        self.declared(axis).is_relative()
    }

    /// Caption extent reserved along an axis: the caption's full extent if
    /// caption and widget are stacked along that axis, otherwise nothing.
    pub fn caption_reservation(&self, axis: Axis) -> u32 {
        match self.caption {
            Some(c) if self.caption_position.stacking_axis() == axis => c.on(axis),
            _ => 0,
        }
    }

    /// Space used by widget and caption together along an axis. Stacked
    /// captions add to the widget; side-by-side captions only widen the slot
    /// if they are larger than the widget.
    pub fn used_extent(&self, axis: Axis) -> u32 {
        let widget = self.widget.on(axis);
        match self.caption {
            None => widget,
            Some(c) if self.caption_position.stacking_axis() == axis => {
                widget.saturating_add(c.on(axis))
            }
            Some(c) => widget.max(c.on(axis)),
        }
    }
}

/// Computed geometry for one slot, relative to the container's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotGeometry {
    /// The space allocated to the slot.
    pub cell: Rect,
    /// The widget inside the cell.
    pub widget: Rect,
    /// The caption inside the cell, if any.
    pub caption: Option<Rect>,
}

/// The result of an ordered layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderedLayout {
    /// Outer size of the container.
    pub size: Expanse,
    /// Geometry per slot, in slot order.
    pub slots: Vec<SlotGeometry>,
}

/// Solve an ordered layout.
pub fn solve(params: &OrderedParams, slots: &[SlotInput]) -> OrderedLayout {
    let main = params.axis;
    let cross = main.cross();

    // Pass 1: primary axis.
    let spacers = slots.iter().filter(|s| s.leading_spacer).count() as u32;
    let base: Vec<u32> = slots
        .iter()
        .map(|s| {
            if s.is_relative(main) {
                0
            } else {
                s.used_extent(main)
            }
        })
        .collect();
    let allocated = base
        .iter()
        .fold(0u32, |acc, b| acc.saturating_add(*b))
        .saturating_add(params.spacing.saturating_mul(spacers))
        .saturating_add(params.margins.along(main));

    let (main_size, unallocated) = match params.available(main) {
        Available::Undefined => (allocated, 0),
        Available::Definite(size) => (size, size.saturating_sub(allocated)),
    };
    let shares = distribute(unallocated, &expand_weights(slots));

    let mut extents = Vec::with_capacity(slots.len());
    let mut starts = Vec::with_capacity(slots.len());
    let mut pos = params.margins.leading(main);
    for (i, slot) in slots.iter().enumerate() {
        if slot.leading_spacer {
            pos = pos.saturating_add(params.spacing);
        }
        let extent = base[i].saturating_add(shares[i]);
        starts.push(pos);
        extents.push(extent);
        pos = pos.saturating_add(extent);
    }

    // Pass 2: secondary axis.
    let max_cross = slots
        .iter()
        .filter(|s| !s.is_relative(cross))
        .map(|s| s.used_extent(cross))
        .max()
        .unwrap_or(0);
    let cross_size = match params.available(cross) {
        Available::Undefined => max_cross.saturating_add(params.margins.along(cross)),
        Available::Definite(size) => size,
    };
    let cross_avail = cross_size.saturating_sub(params.margins.along(cross));
    let cross_start = params.margins.leading(cross);

    let geometry = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let cell = Rect::from_main_cross(main, starts[i], extents[i], cross_start, cross_avail);
            place_in_cell(slot, cell)
        })
        .collect();

    let size = Expanse::from_main_cross(main, main_size, cross_size);
    debug!(
        ?main,
        slots = slots.len(),
        allocated,
        unallocated,
        ?size,
        "ordered layout"
    );
    OrderedLayout {
        size,
        slots: geometry,
    }
}

/// Expand weights for distribution. If no slot has a positive ratio, every
/// slot gets an equal weight.
fn expand_weights(slots: &[SlotInput]) -> Vec<f64> {
    if slots.iter().any(|s| s.expand_ratio.is_positive()) {
        slots
            .iter()
            .map(|s| {
                s.expand_ratio
                    .get()
                    .filter(|r| *r > 0.0)
                    .unwrap_or(0.0)
            })
            .collect()
    } else {
        vec![1.0; slots.len()]
    }
}

/// Split `remaining` pixels proportionally to `weights`, in whole pixels.
/// The shares always sum to exactly `remaining` when any weight is positive.
/// Pixels lost to rounding go to the largest fractional remainders, earlier
/// slots first on ties.
pub fn distribute(remaining: u32, weights: &[f64]) -> Vec<u32> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if remaining == 0 || weights.is_empty() || total <= 0.0 || !total.is_finite() {
        return vec![0; weights.len()];
    }

    let mut base = Vec::with_capacity(weights.len());
    let mut frac = Vec::with_capacity(weights.len());
    for w in weights {
        let exact = if *w > 0.0 {
            f64::from(remaining) * w / total
        } else {
            0.0
        };
        let floor = exact.floor();
        base.push(floor as u32);
        frac.push(exact - floor);
    }

    let mut idx: Vec<usize> = (0..weights.len()).filter(|i| weights[*i] > 0.0).collect();
    idx.sort_by(|a, b| frac[*b].total_cmp(&frac[*a]).then_with(|| a.cmp(b)));

    let used: u64 = base.iter().map(|b| u64::from(*b)).sum();
    let remaining = u64::from(remaining);
    if used < remaining {
        for i in idx.iter().cycle().take((remaining - used) as usize) {
            base[*i] += 1;
        }
    } else if used > remaining {
        // Floating point can overshoot by a pixel; take it back from the
        // smallest remainders.
        let mut excess = used - remaining;
        for i in idx.iter().rev() {
            if excess == 0 {
                break;
            }
            if base[*i] > 0 {
                base[*i] -= 1;
                excess -= 1;
            }
        }
    }
    base
}

/// Position widget and caption inside a slot's cell on both axes.
pub(crate) fn place_in_cell(slot: &SlotInput, cell: Rect) -> SlotGeometry {
    let h = place_on_axis(slot, Axis::Horizontal, cell.extent(Axis::Horizontal));
    let v = place_on_axis(slot, Axis::Vertical, cell.extent(Axis::Vertical));
    let (cx, cy) = (cell.tl.x, cell.tl.y);
    let widget = Rect::new(
        cx.saturating_add(h.widget_start),
        cy.saturating_add(v.widget_start),
        h.widget,
        v.widget,
    );
    let caption = slot.caption.map(|_| {
        Rect::new(
            cx.saturating_add(h.caption_start),
            cy.saturating_add(v.caption_start),
            h.caption,
            v.caption,
        )
    });
    SlotGeometry {
        cell,
        widget,
        caption,
    }
}

/// Placement of widget and caption along one axis of a cell.
struct AxisPlacement {
    /// Widget offset from the cell start.
    widget_start: u32,
    /// Widget extent.
    widget: u32,
    /// Caption offset from the cell start.
    caption_start: u32,
    /// Caption extent.
    caption: u32,
}

/// Align widget and caption within `cell` pixels along `axis`.
fn place_on_axis(slot: &SlotInput, axis: Axis, cell: u32) -> AxisPlacement {
    let reserved = slot.caption_reservation(axis);
    let content = cell.saturating_sub(reserved);
    let widget = match slot.declared(axis) {
        d @ Dimension::Relative(_) => d.resolve_relative(content).unwrap_or(0),
        _ => slot.widget.on(axis),
    };
    let caption = slot.caption.map_or(0, |c| c.on(axis).min(cell));
    let stacked = slot.caption.is_some() && slot.caption_position.stacking_axis() == axis;
    let used = if stacked {
        widget.saturating_add(caption)
    } else {
        widget.max(caption)
    };
    let offset = slot.alignment.along(axis).offset(used, cell);

    let (widget_start, caption_start) = if !stacked {
        (offset, offset)
    } else if slot.caption_position.is_leading() {
        (offset.saturating_add(caption), offset)
    } else {
        (offset, offset.saturating_add(widget))
    };
    AxisPlacement {
        widget_start,
        widget,
        caption_start,
        caption,
    }
}

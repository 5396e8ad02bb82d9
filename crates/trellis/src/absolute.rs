//! Absolute layout: children positioned by CSS-like offset strings.
//!
//! A position is written as `top:10px;left:50%;z-index:3`. Parsing is
//! lenient: the string usually comes straight from the server and a single
//! bad token should not discard the rest, so unknown keys, missing values,
//! unparsable numbers and unknown units are dropped silently.

use std::mem;

use crate::{
    capability::{CaptionOwner, ContainerLayout, ExpandableChild, Measurable, SolveContext},
    caption::{Caption, CaptionChange},
    error::{Error, Result},
    geom::{Axis, Expanse, Rect},
    id::WidgetId,
    ordered::{Available, SlotGeometry},
    sizing::{Dimension, Unit, round_px, split_length},
};

/// One offset value from a position string.
///
/// Offsets are stored as written, sign included, but resolve to unsigned
/// pixels: a negative offset places the child flush with the edge it is
/// measured from instead of outside the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    /// Numeric value. May be negative; see [`Offset::to_px`].
    pub value: f64,
    /// Unit of the value.
    pub unit: Unit,
}

impl Offset {
    /// A pixel offset.
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    /// A percentage offset.
    pub fn percent(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    /// Parse a single offset value. Returns `None` for anything malformed.
    fn parse(s: &str) -> Option<Self> {
        let (value, symbol) = split_length(s)?;
        let unit = Unit::from_symbol(symbol)?;
        Some(Self { value, unit })
    }

    /// Resolve to pixels. Percentages resolve against `extent`; without one
    /// they are zero. Negative results clamp to zero.
    pub fn to_px(&self, extent: Option<u32>, font_size: f64) -> u32 {
        let px = match self.unit {
            Unit::Percent => extent.map_or(0.0, |e| f64::from(e) * self.value / 100.0),
            unit => unit.to_px(self.value, font_size).unwrap_or(0.0),
        };
        round_px(px)
    }
}

/// A parsed position string.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Offset from the top edge.
    pub top: Option<Offset>,
    /// Offset from the right edge.
    pub right: Option<Offset>,
    /// Offset from the bottom edge.
    pub bottom: Option<Offset>,
    /// Offset from the left edge.
    pub left: Option<Offset>,
    /// Paint order.
    pub z_index: Option<i32>,
}

impl Position {
    /// Parse a position string, dropping malformed tokens.
    pub fn parse(css: &str) -> Self {
        let mut pos = Self::default();
        for decl in css.split(';') {
            let Some((key, value)) = decl.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "z-index" => {
                    if let Ok(z) = value.parse::<i32>() {
                        pos.z_index = Some(z);
                    }
                }
                "top" => pos.top = Offset::parse(value).or(pos.top),
                "right" => pos.right = Offset::parse(value).or(pos.right),
                "bottom" => pos.bottom = Offset::parse(value).or(pos.bottom),
                "left" => pos.left = Offset::parse(value).or(pos.left),
                _ => {}
            }
        }
        pos
    }

    /// Render the position back to a canonical string.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (key, offset) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if let Some(o) = offset {
                out.push_str(&format!("{key}:{}{};", o.value, o.unit.symbol()));
            }
        }
        if let Some(z) = self.z_index {
            out.push_str(&format!("z-index:{z};"));
        }
        out
    }

    /// Leading and trailing offsets along an axis.
    fn along(&self, axis: Axis) -> (Option<Offset>, Option<Offset>) {
        match axis {
            Axis::Horizontal => (self.left, self.right),
            Axis::Vertical => (self.top, self.bottom),
        }
    }
}

/// One positioned child.
#[derive(Debug, Clone)]
pub struct AbsoluteChild {
    /// The child widget.
    widget: WidgetId,
    /// Parsed position.
    position: Position,
    /// Declared width.
    width: Dimension,
    /// Declared height.
    height: Dimension,
    /// Caption shown above the widget.
    caption: Option<Caption>,
}

impl AbsoluteChild {
    /// The child widget.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// The child's position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Declared size along an axis.
    fn declared(&self, axis: Axis) -> Dimension {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// The result of an absolute layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbsoluteLayout {
    /// Outer size of the container.
    pub size: Expanse,
    /// Child rects in child order.
    pub children: Vec<Rect>,
}

/// A container of absolutely positioned children.
#[derive(Debug, Clone, Default)]
pub struct AbsoluteContainer {
    /// Children in insertion order.
    children: Vec<AbsoluteChild>,
}

impl AbsoluteContainer {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Children in insertion order.
    pub fn entries(&self) -> &[AbsoluteChild] {
        &self.children
    }

    /// Index of the child holding `widget`.
    fn index_of(&self, widget: WidgetId) -> Option<usize> {
        self.children.iter().position(|c| c.widget == widget)
    }

    /// Replace the child list, keeping positions of children that remain.
    /// Returns the widgets that were dropped.
    pub fn set_children(&mut self, widgets: &[WidgetId]) -> Vec<WidgetId> {
        let mut old = mem::take(&mut self.children);
        for w in widgets {
            if self.index_of(*w).is_some() {
                continue;
            }
            let child = match old.iter().position(|c| c.widget == *w) {
                Some(pos) => old.remove(pos),
                None => AbsoluteChild {
                    widget: *w,
                    position: Position::default(),
                    width: Dimension::Undefined,
                    height: Dimension::Undefined,
                    caption: None,
                },
            };
            self.children.push(child);
        }
        old.into_iter().map(|c| c.widget).collect()
    }

    /// Set a child's position. Returns true if it changed.
    pub fn set_position(&mut self, widget: WidgetId, position: Position) -> Result<bool> {
        let i = self.index_of(widget).ok_or(Error::UnknownWidget(widget))?;
        let child = &mut self.children[i];
        if child.position == position {
            return Ok(false);
        }
        child.position = position;
        Ok(true)
    }

    /// Set a child's declared size.
    pub fn set_size(&mut self, widget: WidgetId, width: Dimension, height: Dimension) -> Result<()> {
        let i = self.index_of(widget).ok_or(Error::UnknownWidget(widget))?;
        self.children[i].width = width;
        self.children[i].height = height;
        Ok(())
    }

    /// Children sorted for painting: ascending z-index, insertion order on
    /// ties. Children without a z-index paint at zero.
    pub fn paint_order(&self) -> Vec<WidgetId> {
        let mut order: Vec<&AbsoluteChild> = self.children.iter().collect();
        order.sort_by_key(|c| c.position.z_index.unwrap_or(0));
        order.into_iter().map(|c| c.widget).collect()
    }

    /// Lay out the children. `measured` holds one outer size per child.
    pub fn arrange(
        &self,
        width: Available,
        height: Available,
        measured: &[Expanse],
        font_size: f64,
    ) -> AbsoluteLayout {
        let mut rects = Vec::with_capacity(self.children.len());
        let mut natural = Expanse::ZERO;
        for (i, child) in self.children.iter().enumerate() {
            let m = measured.get(i).copied().unwrap_or(Expanse::ZERO);
            let (x, w, need_w) = resolve_axis(child, Axis::Horizontal, width.definite(), m.w, font_size);
            let (y, h, need_h) = resolve_axis(child, Axis::Vertical, height.definite(), m.h, font_size);
            natural.w = natural.w.max(need_w);
            natural.h = natural.h.max(need_h);
            rects.push(Rect::new(x, y, w, h));
        }
        let size = Expanse::new(
            width.definite().unwrap_or(natural.w),
            height.definite().unwrap_or(natural.h),
        );
        AbsoluteLayout {
            size,
            children: rects,
        }
    }
}

impl Measurable for AbsoluteContainer {
    fn children(&self) -> Vec<WidgetId> {
        self.children.iter().map(|c| c.widget).collect()
    }

    fn solve(&self, ctx: &mut SolveContext<'_>, width: Available, height: Available) -> ContainerLayout {
        let mut captions = Vec::with_capacity(self.children.len());
        let mut footprints = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let caption = child.caption.as_ref().map(|_| ctx.caption_size(child.widget));
            let widget = ctx.widget_size(child.widget, child.width, child.height);
            // The caption sits above the widget inside the positioned wrapper.
            footprints.push(caption.map_or(widget, |c| {
                Expanse::new(widget.w.max(c.w), widget.h.saturating_add(c.h))
            }));
            captions.push(caption);
        }
        let out = self.arrange(width, height, &footprints, ctx.config.font_size);
        let children = self
            .children
            .iter()
            .zip(out.children)
            .zip(captions)
            .map(|((child, cell), caption)| {
                let ch = caption.map_or(0, |c| c.h.min(cell.h));
                let geometry = SlotGeometry {
                    cell,
                    widget: Rect::new(
                        cell.tl.x,
                        cell.tl.y.saturating_add(ch),
                        cell.w,
                        cell.h.saturating_sub(ch),
                    ),
                    caption: caption.map(|c| Rect::new(cell.tl.x, cell.tl.y, c.w.min(cell.w), ch)),
                };
                (child.widget, geometry)
            })
            .collect();
        ContainerLayout {
            size: out.size,
            children,
        }
    }
}

impl CaptionOwner for AbsoluteContainer {
    fn set_child_caption(&mut self, child: WidgetId, caption: Option<Caption>) -> Result<CaptionChange> {
        let i = self.index_of(child).ok_or(Error::UnknownWidget(child))?;
        let slot = &mut self.children[i].caption;
        let caption = caption.filter(|c| !c.is_empty());
        Ok(match (slot.as_ref(), caption) {
            (None, None) => CaptionChange::Unchanged,
            (Some(_), None) => {
                *slot = None;
                CaptionChange::Removed
            }
            (None, Some(c)) => {
                *slot = Some(c);
                CaptionChange::Created
            }
            (Some(old), Some(c)) if *old == c => CaptionChange::Unchanged,
            (Some(_), Some(c)) => {
                *slot = Some(c);
                CaptionChange::Updated
            }
        })
    }

    fn caption_of(&self, child: WidgetId) -> Option<&Caption> {
        self.index_of(child)
            .and_then(|i| self.children[i].caption.as_ref())
    }
}

impl ExpandableChild for AbsoluteContainer {
    fn set_child_size(&mut self, child: WidgetId, width: Dimension, height: Dimension) -> Result<()> {
        self.set_size(child, width, height)
    }
}

/// Resolve start and extent along one axis. Also returns the container
/// extent the child needs when the container shrinks to fit.
fn resolve_axis(
    child: &AbsoluteChild,
    axis: Axis,
    container: Option<u32>,
    measured: u32,
    font_size: f64,
) -> (u32, u32, u32) {
    let (lead, trail) = child.position.along(axis);
    let lead_px = lead.map(|o| o.to_px(container, font_size));
    let trail_px = trail.map(|o| o.to_px(container, font_size));

    let declared = child.declared(axis);
    let extent = match (declared, container) {
        (Dimension::Fixed(..), _) => declared.fixed_px(font_size).unwrap_or(measured),
        (Dimension::Relative(_), Some(c)) => declared.resolve_relative(c).unwrap_or(0),
        (_, Some(c)) if lead_px.is_some() && trail_px.is_some() => c
            .saturating_sub(lead_px.unwrap_or(0))
            .saturating_sub(trail_px.unwrap_or(0)),
        _ => measured,
    };

    let start = match (lead_px, trail_px, container) {
        (Some(l), _, _) => l,
        (None, Some(t), Some(c)) => c.saturating_sub(t).saturating_sub(extent),
        _ => 0,
    };
    let need = lead_px
        .unwrap_or(0)
        .saturating_add(extent)
        .saturating_add(trail_px.unwrap_or(0));
    (start, extent, need)
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn widgets(n: usize) -> Vec<WidgetId> {
        let mut sm: SlotMap<WidgetId, ()> = SlotMap::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    #[test]
    fn parse_full() {
        let p = Position::parse("top:10px;left:50%;z-index:3");
        assert_eq!(p.top, Some(Offset::px(10.0)));
        assert_eq!(p.left, Some(Offset::percent(50.0)));
        assert_eq!(p.right, None);
        assert_eq!(p.z_index, Some(3));
    }

    #[test]
    fn parse_is_lenient() {
        let p = Position::parse(" top : 5 ; left:; bogus:1px; right:abc; bottom:3furlongs; z-index:x;;");
        assert_eq!(p.top, Some(Offset::px(5.0)));
        assert_eq!(p.left, None);
        assert_eq!(p.right, None);
        assert_eq!(p.bottom, None);
        assert_eq!(p.z_index, None);
        assert_eq!(Position::parse(""), Position::default());
        assert_eq!(Position::parse("garbage"), Position::default());
    }

    #[test]
    fn parse_units() {
        let p = Position::parse("top:2em;left:1in;right:-4px");
        assert_eq!(p.top.map(|o| o.to_px(None, 16.0)), Some(32));
        assert_eq!(p.left.map(|o| o.to_px(None, 16.0)), Some(96));
        // Negative offsets clamp.
        assert_eq!(p.right.map(|o| o.to_px(None, 16.0)), Some(0));
    }

    #[test]
    fn css_roundtrip() {
        let p = Position::parse("left:50%;top:10px;z-index:-2");
        assert_eq!(p.to_css(), "top:10px;left:50%;z-index:-2;");
        assert_eq!(Position::parse(&p.to_css()), p);
    }

    #[test]
    fn resolves_offsets() -> Result<()> {
        let w = widgets(3);
        let mut c = AbsoluteContainer::new();
        c.set_children(&w);
        c.set_position(w[0], Position::parse("top:10px;left:50%"))?;
        c.set_position(w[1], Position::parse("right:20px;bottom:0"))?;
        c.set_position(w[2], Position::parse("left:10px;right:10px;top:0"))?;
        let measured = [Expanse::new(30, 40), Expanse::new(50, 60), Expanse::new(5, 5)];
        let out = c.arrange(Available::Definite(400), Available::Definite(300), &measured, 16.0);
        assert_eq!(out.size, Expanse::new(400, 300));
        assert_eq!(out.children[0], Rect::new(200, 10, 30, 40));
        assert_eq!(out.children[1], Rect::new(330, 240, 50, 60));
        // Both horizontal offsets and no declared width: stretch.
        assert_eq!(out.children[2], Rect::new(10, 0, 380, 5));
        Ok(())
    }

    #[test]
    fn declared_size_wins_over_stretch() -> Result<()> {
        let w = widgets(1);
        let mut c = AbsoluteContainer::new();
        c.set_children(&w);
        c.set_position(w[0], Position::parse("left:10px;right:10px"))?;
        c.set_size(w[0], Dimension::percent(50.0), Dimension::px(20))?;
        let out = c.arrange(
            Available::Definite(200),
            Available::Definite(100),
            &[Expanse::new(1, 1)],
            16.0,
        );
        assert_eq!(out.children[0], Rect::new(10, 0, 100, 20));
        Ok(())
    }

    #[test]
    fn shrink_to_fit() -> Result<()> {
        let w = widgets(2);
        let mut c = AbsoluteContainer::new();
        c.set_children(&w);
        c.set_position(w[0], Position::parse("left:10px;top:5px"))?;
        c.set_position(w[1], Position::parse("right:7px;bottom:3px"))?;
        let measured = [Expanse::new(30, 40), Expanse::new(50, 60)];
        let out = c.arrange(Available::Undefined, Available::Undefined, &measured, 16.0);
        assert_eq!(out.size, Expanse::new(57, 63));
        assert_eq!(out.children[1].tl.x, 0);
        Ok(())
    }

    #[test]
    fn paint_order_by_z() -> Result<()> {
        let w = widgets(4);
        let mut c = AbsoluteContainer::new();
        c.set_children(&w);
        c.set_position(w[0], Position::parse("z-index:2"))?;
        c.set_position(w[2], Position::parse("z-index:-1"))?;
        assert_eq!(c.paint_order(), vec![w[2], w[1], w[3], w[0]]);
        Ok(())
    }

    #[test]
    fn set_children_keeps_positions() -> Result<()> {
        let w = widgets(3);
        let mut c = AbsoluteContainer::new();
        c.set_children(&w);
        c.set_position(w[1], Position::parse("top:1px"))?;
        let dropped = c.set_children(&[w[1], w[2]]);
        assert_eq!(dropped, vec![w[0]]);
        assert_eq!(c.entries()[0].position().top, Some(Offset::px(1.0)));
        assert!(c.set_position(w[0], Position::default()).is_err());
        Ok(())
    }
}

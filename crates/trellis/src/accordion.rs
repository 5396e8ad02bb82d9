//! Accordion: a vertical stack of headers with at most one open item.
//!
//! Closed items only ever contribute their header height. The open item
//! receives the space the headers leave over when the accordion has a fixed
//! height, or reports its natural content height when it shrinks to fit.

use std::mem;

use tracing::debug;

use crate::{
    capability::{CaptionOwner, ContainerLayout, ExpandableChild, Measurable, SolveContext},
    caption::{Caption, CaptionChange},
    error::{Error, Result},
    geom::{Expanse, Rect},
    id::WidgetId,
    ordered::{Available, SlotGeometry},
    sizing::Dimension,
};

/// Open/closed state of a stack item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemState {
    /// Only the header is shown.
    #[default]
    Closed,
    /// Header and content are shown.
    Open,
}

/// A state transition, in the order listeners observe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackEvent {
    /// The item at this index closed.
    Closed(usize),
    /// The item at this index opened.
    Opened(usize),
}

/// One header/content pair.
#[derive(Debug, Clone)]
pub struct StackItem {
    /// Content widget.
    widget: WidgetId,
    /// Header caption.
    caption: Caption,
    /// Current state.
    state: ItemState,
    /// Declared content width.
    width: Dimension,
    /// Declared content height.
    height: Dimension,
}

impl StackItem {
    /// The content widget.
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    /// The header caption.
    pub fn caption(&self) -> &Caption {
        &self.caption
    }

    /// True if the item is open.
    pub fn is_open(&self) -> bool {
        self.state == ItemState::Open
    }
}

/// Measured sizes for one stack item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemMetrics {
    /// Header size.
    pub header: Expanse,
    /// Natural content size. Only consulted for the open item.
    pub content: Expanse,
}

/// The result of an accordion layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccordionLayout {
    /// Outer size of the accordion.
    pub size: Expanse,
    /// Geometry per item: `caption` is the header, `widget` the content.
    pub items: Vec<SlotGeometry>,
}

/// An accordion container.
#[derive(Debug, Clone, Default)]
pub struct Accordion {
    /// Items in display order.
    items: Vec<StackItem>,
    /// Index of the open item.
    open: Option<usize>,
    /// State transitions not yet drained.
    events: Vec<StackEvent>,
}

impl Accordion {
    /// An empty accordion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Items in display order.
    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    /// Index of the open item.
    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    /// True if the item at `index` is open.
    pub fn is_open(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(StackItem::is_open)
    }

    /// Index of the item holding `widget`.
    pub fn index_of(&self, widget: WidgetId) -> Option<usize> {
        self.items.iter().position(|i| i.widget == widget)
    }

    /// Replace the item list, keeping state for widgets that remain. Returns
    /// the widgets that were dropped.
    pub fn set_items(&mut self, widgets: &[WidgetId]) -> Vec<WidgetId> {
        let open_widget = self.open.and_then(|i| self.items.get(i)).map(|i| i.widget);
        let mut old = mem::take(&mut self.items);
        for w in widgets {
            if self.items.iter().any(|i| i.widget == *w) {
                continue;
            }
            let item = match old.iter().position(|i| i.widget == *w) {
                Some(pos) => old.swap_remove(pos),
                None => StackItem {
                    widget: *w,
                    caption: Caption::default(),
                    state: ItemState::Closed,
                    width: Dimension::Undefined,
                    height: Dimension::Undefined,
                },
            };
            self.items.push(item);
        }
        self.open = open_widget.and_then(|w| self.index_of(w));
        old.into_iter().map(|i| i.widget).collect()
    }

    /// Update the header of the item holding `widget`.
    pub fn set_caption(&mut self, widget: WidgetId, caption: Caption) -> Result<CaptionChange> {
        let index = self
            .index_of(widget)
            .ok_or(Error::UnknownWidget(widget))?;
        let item = &mut self.items[index];
        if item.caption == caption {
            return Ok(CaptionChange::Unchanged);
        }
        item.caption = caption;
        Ok(CaptionChange::Updated)
    }

    /// Open the item at `index`, closing the currently open item first.
    /// Opening the item that is already open does nothing.
    pub fn open(&mut self, index: usize) -> Result<()> {
        let len = self.items.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        if self.open == Some(index) {
            return Ok(());
        }
        if let Some(prev) = self.open.take() {
            self.items[prev].state = ItemState::Closed;
            self.events.push(StackEvent::Closed(prev));
        }
        self.items[index].state = ItemState::Open;
        self.open = Some(index);
        self.events.push(StackEvent::Opened(index));
        debug!(index, "accordion item opened");
        Ok(())
    }

    /// Close the item at `index` if it is open.
    pub fn close(&mut self, index: usize) -> Result<()> {
        let len = self.items.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        if self.open == Some(index) {
            self.items[index].state = ItemState::Closed;
            self.open = None;
            self.events.push(StackEvent::Closed(index));
        }
        Ok(())
    }

    /// Drain state transitions in the order they happened.
    pub fn take_events(&mut self) -> Vec<StackEvent> {
        mem::take(&mut self.events)
    }

    /// Lay out the stack. `metrics` holds one entry per item.
    pub fn arrange(&self, width: Available, height: Available, metrics: &[ItemMetrics]) -> AccordionLayout {
        let header = |i: usize| metrics.get(i).map_or(Expanse::ZERO, |m| m.header);
        let headers_total: u32 = (0..self.items.len())
            .map(|i| header(i).h)
            .fold(0, u32::saturating_add);

        let open_content = self.open.map(|i| metrics.get(i).map_or(Expanse::ZERO, |m| m.content));
        let content_h = match (height, self.open) {
            (Available::Definite(h), Some(_)) => h.saturating_sub(headers_total),
            (Available::Undefined, Some(_)) => open_content.map_or(0, |c| c.h),
            (_, None) => 0,
        };
        let total_h = match height {
            Available::Definite(h) => h,
            Available::Undefined => headers_total.saturating_add(content_h),
        };
        let total_w = match width {
            Available::Definite(w) => w,
            Available::Undefined => {
                let widest_header = (0..self.items.len()).map(|i| header(i).w).max().unwrap_or(0);
                widest_header.max(open_content.map_or(0, |c| c.w))
            }
        };

        let mut y = 0u32;
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let hh = header(i).h;
                let ch = if item.is_open() { content_h } else { 0 };
                let cell = Rect::new(0, y, total_w, hh.saturating_add(ch));
                let caption = Rect::new(0, y, total_w, hh);
                let widget = Rect::new(0, y.saturating_add(hh), total_w, ch);
                y = y.saturating_add(cell.h);
                SlotGeometry {
                    cell,
                    widget,
                    caption: Some(caption),
                }
            })
            .collect();

        AccordionLayout {
            size: Expanse::new(total_w, total_h),
            items,
        }
    }
}

impl Measurable for Accordion {
    fn children(&self) -> Vec<WidgetId> {
        self.items.iter().map(|i| i.widget).collect()
    }

    fn solve(&self, ctx: &mut SolveContext<'_>, width: Available, height: Available) -> ContainerLayout {
        // Closed content is never measured.
        let metrics: Vec<ItemMetrics> = self
            .items
            .iter()
            .map(|item| ItemMetrics {
                header: ctx.caption_size(item.widget),
                content: if item.is_open() {
                    ctx.widget_size(item.widget, item.width, item.height)
                } else {
                    Expanse::ZERO
                },
            })
            .collect();
        let out = self.arrange(width, height, &metrics);
        ContainerLayout {
            size: out.size,
            children: self.items.iter().map(|i| i.widget).zip(out.items).collect(),
        }
    }
}

impl CaptionOwner for Accordion {
    fn set_child_caption(&mut self, child: WidgetId, caption: Option<Caption>) -> Result<CaptionChange> {
        self.set_caption(child, caption.unwrap_or_default())
    }

    fn caption_of(&self, child: WidgetId) -> Option<&Caption> {
        self.index_of(child).map(|i| &self.items[i].caption)
    }
}

impl ExpandableChild for Accordion {
    fn set_child_size(&mut self, child: WidgetId, width: Dimension, height: Dimension) -> Result<()> {
        let i = self.index_of(child).ok_or(Error::UnknownWidget(child))?;
        self.items[i].width = width;
        self.items[i].height = height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn widgets(n: usize) -> Vec<WidgetId> {
        let mut sm: SlotMap<WidgetId, ()> = SlotMap::with_key();
        (0..n).map(|_| sm.insert(())).collect()
    }

    fn three() -> (Accordion, Vec<WidgetId>) {
        let w = widgets(3);
        let mut acc = Accordion::new();
        acc.set_items(&w);
        (acc, w)
    }

    fn metrics() -> Vec<ItemMetrics> {
        vec![
            ItemMetrics {
                header: Expanse::new(100, 20),
                content: Expanse::new(80, 200),
            },
            ItemMetrics {
                header: Expanse::new(120, 25),
                content: Expanse::new(150, 50),
            },
            ItemMetrics {
                header: Expanse::new(90, 20),
                content: Expanse::new(10, 10),
            },
        ]
    }

    #[test]
    fn opening_closes_previous_first() -> Result<()> {
        let (mut acc, _) = three();
        acc.open(0)?;
        acc.open(2)?;
        assert!(!acc.is_open(0));
        assert!(acc.is_open(2));
        assert_eq!(
            acc.take_events(),
            vec![
                StackEvent::Opened(0),
                StackEvent::Closed(0),
                StackEvent::Opened(2)
            ]
        );
        assert_eq!(acc.items().iter().filter(|i| i.is_open()).count(), 1);
        Ok(())
    }

    #[test]
    fn reopen_is_noop() -> Result<()> {
        let (mut acc, _) = three();
        acc.open(1)?;
        acc.take_events();
        acc.open(1)?;
        assert!(acc.take_events().is_empty());
        acc.close(0)?;
        assert!(acc.take_events().is_empty());
        acc.close(1)?;
        assert_eq!(acc.take_events(), vec![StackEvent::Closed(1)]);
        assert_eq!(acc.open_index(), None);
        Ok(())
    }

    #[test]
    fn open_out_of_range() {
        let (mut acc, _) = three();
        assert_eq!(acc.open(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn fixed_height_gives_leftover_to_open_item() -> Result<()> {
        let (mut acc, _) = three();
        acc.open(1)?;
        let out = acc.arrange(Available::Definite(300), Available::Definite(400), &metrics());
        assert_eq!(out.size, Expanse::new(300, 400));
        // 400 minus the closed headers (20 + 20) is the open item's height.
        assert_eq!(out.items[1].cell, Rect::new(0, 20, 300, 360));
        assert_eq!(out.items[1].widget, Rect::new(0, 45, 300, 335));
        assert_eq!(out.items[2].cell, Rect::new(0, 380, 300, 20));
        assert_eq!(out.items[0].widget.h, 0);
        Ok(())
    }

    #[test]
    fn shrink_to_fit_adopts_content() -> Result<()> {
        let (mut acc, _) = three();
        acc.open(0)?;
        let out = acc.arrange(Available::Undefined, Available::Undefined, &metrics());
        assert_eq!(out.size, Expanse::new(120, 20 + 25 + 20 + 200));
        assert_eq!(out.items[0].widget, Rect::new(0, 20, 120, 200));
        Ok(())
    }

    #[test]
    fn all_closed_reports_headers_only() {
        let (acc, _) = three();
        let out = acc.arrange(Available::Undefined, Available::Undefined, &metrics());
        assert_eq!(out.size.h, 65);
    }

    #[test]
    fn set_items_keeps_open_widget() -> Result<()> {
        let (mut acc, w) = three();
        acc.open(2)?;
        let dropped = acc.set_items(&[w[2], w[0]]);
        assert_eq!(dropped, vec![w[1]]);
        assert_eq!(acc.open_index(), Some(0));
        assert!(acc.is_open(0));
        let dropped = acc.set_items(&[w[0]]);
        assert_eq!(dropped, vec![w[2]]);
        assert_eq!(acc.open_index(), None);
        Ok(())
    }
}

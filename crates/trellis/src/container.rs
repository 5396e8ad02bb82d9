//! Layout containers and slot reconciliation.
//!
//! A container keeps one slot per child widget. When the server sends a new
//! child list, [`plan`] works out the smallest sequence of insertions and
//! moves that turns the current order into the new one. Replaying an
//! identical list produces no mutations at all.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use tracing::warn;

use crate::{
    alignment::Alignment,
    absolute::AbsoluteContainer,
    accordion::Accordion,
    capability::{CaptionOwner, ContainerLayout, ExpandableChild, Measurable, SolveContext},
    caption::{Caption, CaptionChange, CaptionPosition},
    config::Config,
    error::{Error, Result},
    geom::Axis,
    grid::GridContainer,
    id::{SlotId, WidgetId},
    margin::MarginInfo,
    ordered::{self, Available, OrderedParams},
    sizing::Dimension,
    slot::Slot,
};

/// One structural change made while reconciling a child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// A new slot was created at `index`.
    Inserted {
        /// The child widget.
        widget: WidgetId,
        /// Its position after insertion.
        index: usize,
    },
    /// An existing slot moved.
    Moved {
        /// The child widget.
        widget: WidgetId,
        /// Position before the move.
        from: usize,
        /// Position after the move.
        to: usize,
    },
    /// A slot was torn down.
    Removed {
        /// The child widget.
        widget: WidgetId,
    },
}

/// Compute the mutations that turn `current` into `target`. Vanished
/// children are removed first, then every target position is filled by
/// insert-or-move. Duplicate entries in `target` are ignored.
pub fn plan(current: &[WidgetId], target: &[WidgetId]) -> Vec<Mutation> {
    let mut seen = HashSet::with_capacity(target.len());
    let target: Vec<WidgetId> = target
        .iter()
        .copied()
        .filter(|w| {
            let fresh = seen.insert(*w);
            if !fresh {
                warn!(widget = ?w, "duplicate child ignored");
            }
            fresh
        })
        .collect();

    let mut mutations = Vec::new();
    let mut order: Vec<WidgetId> = Vec::with_capacity(current.len());
    for w in current {
        if seen.contains(w) {
            order.push(*w);
        } else {
            mutations.push(Mutation::Removed { widget: *w });
        }
    }

    for (to, w) in target.iter().enumerate() {
        match order.iter().position(|o| o == w) {
            Some(from) if from == to => {}
            Some(from) => {
                order.remove(from);
                order.insert(to, *w);
                mutations.push(Mutation::Moved {
                    widget: *w,
                    from,
                    to,
                });
            }
            None => {
                order.insert(to, *w);
                mutations.push(Mutation::Inserted {
                    widget: *w,
                    index: to,
                });
            }
        }
    }
    mutations
}

/// A vertical or horizontal ordered container.
#[derive(Debug, Clone)]
pub struct OrderedContainer {
    /// Slot arena.
    slots: SlotMap<SlotId, Slot>,
    /// Slots in layout order.
    order: Vec<SlotId>,
    /// Slot lookup by child widget.
    by_widget: SecondaryMap<WidgetId, SlotId>,
    /// Orientation.
    axis: Axis,
    /// Enabled margin sides.
    margins: MarginInfo,
    /// Whether spacers separate slots.
    spacing: bool,
}

impl OrderedContainer {
    /// An empty container laid out along `axis`.
    pub fn new(axis: Axis) -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            by_widget: SecondaryMap::new(),
            axis,
            margins: MarginInfo::NONE,
            spacing: false,
        }
    }

    /// Orientation.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Enabled margin sides.
    pub fn margins(&self) -> MarginInfo {
        self.margins
    }

    /// True if spacing is enabled.
    pub fn spacing(&self) -> bool {
        self.spacing
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the container has no slots.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Child widgets in order.
    pub fn widgets(&self) -> Vec<WidgetId> {
        self.slots_in_order().map(Slot::widget).collect()
    }

    /// Slots in layout order.
    pub fn slots_in_order(&self) -> impl Iterator<Item = &Slot> {
        self.order.iter().filter_map(|id| self.slots.get(*id))
    }

    /// The slot holding `widget`.
    pub fn slot(&self, widget: WidgetId) -> Option<&Slot> {
        self.by_widget.get(widget).and_then(|id| self.slots.get(*id))
    }

    /// Mutable access to the slot holding `widget`.
    fn slot_mut(&mut self, widget: WidgetId) -> Result<&mut Slot> {
        self.by_widget
            .get(widget)
            .and_then(|id| self.slots.get_mut(*id))
            .ok_or(Error::UnknownWidget(widget))
    }

    /// Bring the slot list in line with `widgets`. New slots get
    /// `caption_position`. Returns only the mutations that actually happened.
    pub fn reconcile(&mut self, widgets: &[WidgetId], caption_position: CaptionPosition) -> Vec<Mutation> {
        let mutations = plan(&self.widgets(), widgets);
        for m in &mutations {
            match *m {
                Mutation::Removed { widget } => {
                    if let Some(id) = self.by_widget.remove(widget) {
                        self.slots.remove(id);
                        self.order.retain(|o| *o != id);
                    }
                }
                Mutation::Moved { from, to, .. } => {
                    let id = self.order.remove(from);
                    self.order.insert(to, id);
                }
                Mutation::Inserted { widget, index } => {
                    let mut slot = Slot::new(widget);
                    slot.set_caption_position(caption_position);
                    let id = self.slots.insert(slot);
                    self.by_widget.insert(widget, id);
                    self.order.insert(index, id);
                }
            }
        }
        if !mutations.is_empty() {
            self.refresh_spacers();
        }
        mutations
    }

    /// Set the margin bitmask. Returns true if it changed.
    pub fn apply_margins(&mut self, margins: MarginInfo) -> bool {
        let changed = self.margins != margins;
        self.margins = margins;
        changed
    }

    /// Enable or disable spacing. Returns true if it changed.
    pub fn apply_spacing(&mut self, enabled: bool) -> bool {
        if self.spacing == enabled {
            return false;
        }
        self.spacing = enabled;
        self.refresh_spacers();
        true
    }

    /// Apply alignments. Children missing from the map get the default.
    pub fn apply_alignments(&mut self, alignments: &HashMap<WidgetId, Alignment>) {
        for id in &self.order {
            if let Some(slot) = self.slots.get_mut(*id) {
                let a = alignments.get(&slot.widget()).copied().unwrap_or_default();
                slot.set_alignment(a);
            }
        }
    }

    /// Apply expand ratios. Children missing from the map stop expanding.
    pub fn apply_expand_ratios(&mut self, ratios: &HashMap<WidgetId, f64>) {
        for id in &self.order {
            if let Some(slot) = self.slots.get_mut(*id) {
                let r = ratios.get(&slot.widget()).copied().unwrap_or(-1.0);
                slot.set_expand_ratio(r);
            }
        }
    }

    /// Set the caption position of one child.
    pub fn set_caption_position(&mut self, widget: WidgetId, position: CaptionPosition) -> Result<()> {
        self.slot_mut(widget)?.set_caption_position(position);
        Ok(())
    }

    /// Every slot but the first carries a leading spacer when spacing is on.
    fn refresh_spacers(&mut self) {
        for (i, id) in self.order.iter().enumerate() {
            if let Some(slot) = self.slots.get_mut(*id) {
                slot.set_spacing(self.spacing && i > 0);
            }
        }
    }

    /// Engine parameters for this container.
    pub fn params(&self, width: Available, height: Available, config: &Config) -> OrderedParams {
        OrderedParams {
            axis: self.axis,
            width,
            height,
            margins: self.margins.resolve(config.margin),
            spacing: config.spacing,
        }
    }
}

impl Measurable for OrderedContainer {
    fn children(&self) -> Vec<WidgetId> {
        self.widgets()
    }

    fn solve(&self, ctx: &mut SolveContext<'_>, width: Available, height: Available) -> ContainerLayout {
        let inputs: Vec<_> = self
            .slots_in_order()
            .map(|slot| {
                let mut input = slot.input(ctx.cache, ctx.measurer);
                input.widget = ctx.with_fixed(input.widget, slot.width(), slot.height());
                input
            })
            .collect();
        let out = ordered::solve(&self.params(width, height, ctx.config), &inputs);
        ContainerLayout {
            size: out.size,
            children: self.slots_in_order().map(Slot::widget).zip(out.slots).collect(),
        }
    }
}

impl CaptionOwner for OrderedContainer {
    fn set_child_caption(&mut self, child: WidgetId, caption: Option<Caption>) -> Result<CaptionChange> {
        Ok(self.slot_mut(child)?.set_caption(caption))
    }

    fn caption_of(&self, child: WidgetId) -> Option<&Caption> {
        self.slot(child).and_then(Slot::caption)
    }
}

impl ExpandableChild for OrderedContainer {
    fn set_child_size(&mut self, child: WidgetId, width: Dimension, height: Dimension) -> Result<()> {
        self.slot_mut(child)?.set_size(width, height);
        Ok(())
    }

    fn set_child_expand_ratio(&mut self, child: WidgetId, ratio: f64) -> Result<()> {
        self.slot_mut(child)?.set_expand_ratio(ratio);
        Ok(())
    }
}

/// The kind of a layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Ordered, top to bottom.
    #[default]
    Vertical,
    /// Ordered, left to right.
    Horizontal,
    /// Headers with one open item.
    Accordion,
    /// Children placed by position strings.
    Absolute,
    /// Children placed in rows and columns.
    Grid,
}

/// Any layout container.
#[derive(Debug, Clone)]
pub enum Container {
    /// Vertical or horizontal ordered layout.
    Ordered(OrderedContainer),
    /// Accordion.
    Accordion(Accordion),
    /// Absolute layout.
    Absolute(AbsoluteContainer),
    /// Grid layout.
    Grid(GridContainer),
}

impl Container {
    /// An empty container of the given kind.
    pub fn new(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Vertical => Self::Ordered(OrderedContainer::new(Axis::Vertical)),
            ContainerKind::Horizontal => Self::Ordered(OrderedContainer::new(Axis::Horizontal)),
            ContainerKind::Accordion => Self::Accordion(Accordion::new()),
            ContainerKind::Absolute => Self::Absolute(AbsoluteContainer::new()),
            ContainerKind::Grid => Self::Grid(GridContainer::new()),
        }
    }

    /// This container's kind.
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Ordered(o) if o.axis() == Axis::Horizontal => ContainerKind::Horizontal,
            Self::Ordered(_) => ContainerKind::Vertical,
            Self::Accordion(_) => ContainerKind::Accordion,
            Self::Absolute(_) => ContainerKind::Absolute,
            Self::Grid(_) => ContainerKind::Grid,
        }
    }

    /// Reconcile the child list.
    pub fn reconcile(&mut self, widgets: &[WidgetId], caption_position: CaptionPosition) -> Vec<Mutation> {
        match self {
            Self::Ordered(o) => o.reconcile(widgets, caption_position),
            Self::Accordion(a) => {
                let mutations = plan(&Measurable::children(a), widgets);
                if !mutations.is_empty() {
                    a.set_items(widgets);
                }
                mutations
            }
            Self::Absolute(a) => {
                let mutations = plan(&Measurable::children(a), widgets);
                if !mutations.is_empty() {
                    a.set_children(widgets);
                }
                mutations
            }
            Self::Grid(g) => {
                let mutations = plan(&g.widgets(), widgets);
                if !mutations.is_empty() {
                    g.set_children(widgets, caption_position);
                }
                mutations
            }
        }
    }

    /// The container as a solvable layout.
    pub fn measurable(&self) -> &dyn Measurable {
        match self {
            Self::Ordered(o) => o,
            Self::Accordion(a) => a,
            Self::Absolute(a) => a,
            Self::Grid(g) => g,
        }
    }

    /// The container as a caption holder.
    pub fn caption_owner(&mut self) -> &mut dyn CaptionOwner {
        match self {
            Self::Ordered(o) => o,
            Self::Accordion(a) => a,
            Self::Absolute(a) => a,
            Self::Grid(g) => g,
        }
    }

    /// The container as a receiver of child size hints.
    pub fn expandable(&mut self) -> &mut dyn ExpandableChild {
        match self {
            Self::Ordered(o) => o,
            Self::Accordion(a) => a,
            Self::Absolute(a) => a,
            Self::Grid(g) => g,
        }
    }
}

//! The layout coordinator.
//!
//! A [`Coordinator`] owns every widget record, every container, the
//! measurement cache and the queue of containers waiting to be solved.
//! Changes never trigger layout directly: they call
//! [`Coordinator::request_layout`], which records the container once and
//! raises the `scheduled` flag. The host calls
//! [`Coordinator::flush_pending_layout`] once per tick, which solves the
//! queued containers deepest first and follows size changes upward and
//! allocation changes downward until nothing changes or the pass limit is
//! reached.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap, HashSet},
    mem,
};

use scopeguard::guard;
use slotmap::SlotMap;
use tracing::{debug, error, warn};

use crate::{
    absolute::Position,
    accordion::{Accordion, StackEvent},
    capability::{ContainerLayout, SolveContext},
    caption::{Caption, CaptionChange},
    config::Config,
    container::{Container, ContainerKind, Mutation},
    diff::{ChildState, ContainerDiff},
    error::{Error, Result},
    geom::{Expanse, Rect},
    grid::{self, Area},
    id::WidgetId,
    measure::{BoxMetrics, Element, MeasureCache, Measurer},
    ordered::{Available, SlotGeometry},
    sizing::Dimension,
};

/// Something listeners may want to react to after a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutEvent {
    /// A container's outer size changed.
    SizeChanged {
        /// The container.
        widget: WidgetId,
        /// Previous size; zero on the first solve.
        old: Expanse,
        /// New size.
        new: Expanse,
    },
    /// An accordion item opened or closed.
    Stack {
        /// The accordion.
        container: WidgetId,
        /// The transition.
        event: StackEvent,
    },
}

/// Summary of one flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    /// Solve passes run.
    pub passes: usize,
    /// Container solves performed.
    pub solved: usize,
    /// True if the pass limit cut propagation short.
    pub truncated: bool,
}

/// Per-widget bookkeeping.
#[derive(Debug)]
struct WidgetRecord {
    /// Connector id.
    connector: String,
    /// The container this widget is a child of.
    parent: Option<WidgetId>,
    /// Declared width.
    width: Dimension,
    /// Declared height.
    height: Dimension,
    /// Set if the widget is itself a container.
    container: Option<Container>,
    /// Last solved layout, for containers.
    layout: Option<ContainerLayout>,
    /// Widget rect inside the parent, from the parent's last solve.
    allocation: Option<Rect>,
}

impl WidgetRecord {
    /// A fresh, detached widget.
    fn new(connector: &str) -> Self {
        Self {
            connector: connector.to_string(),
            parent: None,
            width: Dimension::Undefined,
            height: Dimension::Undefined,
            container: None,
            layout: None,
            allocation: None,
        }
    }
}

/// Top-level owner of all layout state.
#[derive(Debug)]
pub struct Coordinator {
    /// Widget arena.
    widgets: SlotMap<WidgetId, WidgetRecord>,
    /// Handle lookup by connector id.
    by_connector: HashMap<String, WidgetId>,
    /// Measurement cache.
    cache: MeasureCache,
    /// Containers waiting for layout, in request order.
    pending: Vec<WidgetId>,
    /// Membership index for `pending`.
    pending_set: HashSet<WidgetId>,
    /// True while a flush is owed.
    scheduled: bool,
    /// Widgets to re-measure at the start of the next flush.
    deferred: Vec<WidgetId>,
    /// Size offered to root containers with relative sizes.
    viewport: Option<Expanse>,
    /// Undrained events.
    events: Vec<LayoutEvent>,
    /// Active configuration.
    config: Config,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self {
            widgets: SlotMap::with_key(),
            by_connector: HashMap::new(),
            cache: MeasureCache::new(),
            pending: Vec::new(),
            pending_set: HashSet::new(),
            scheduled: false,
            deferred: Vec::new(),
            viewport: None,
            events: Vec::new(),
            config: Config::default(),
        }
    }
}

impl Coordinator {
    /// A coordinator with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The measurement cache.
    pub fn cache(&self) -> &MeasureCache {
        &self.cache
    }

    /// True if a flush is owed.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Containers waiting for layout.
    pub fn pending(&self) -> &[WidgetId] {
        &self.pending
    }

    /// The handle for a connector id, registering it on first sight.
    pub fn widget(&mut self, connector: &str) -> WidgetId {
        if let Some(id) = self.by_connector.get(connector) {
            return *id;
        }
        let id = self.widgets.insert(WidgetRecord::new(connector));
        self.by_connector.insert(connector.to_string(), id);
        id
    }

    /// The handle for a known connector id.
    pub fn lookup(&self, connector: &str) -> Option<WidgetId> {
        self.by_connector.get(connector).copied()
    }

    /// The connector id of a widget.
    pub fn connector(&self, id: WidgetId) -> Option<&str> {
        self.widgets.get(id).map(|r| r.connector.as_str())
    }

    /// The container a widget belongs to.
    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.widgets.get(id).and_then(|r| r.parent)
    }

    /// True if the widget is a container.
    pub fn is_container(&self, id: WidgetId) -> bool {
        self.widgets.get(id).is_some_and(|r| r.container.is_some())
    }

    /// A container by handle.
    pub fn container(&self, id: WidgetId) -> Option<&Container> {
        self.widgets.get(id).and_then(|r| r.container.as_ref())
    }

    /// Mutable access to a container.
    fn container_mut(&mut self, id: WidgetId) -> Result<&mut Container> {
        let record = self.widgets.get_mut(id).ok_or(Error::UnknownWidget(id))?;
        let connector = &record.connector;
        match record.container.as_mut() {
            Some(c) => Ok(c),
            None => Err(Error::UnknownContainer(connector.clone())),
        }
    }

    /// Containers without a parent.
    pub fn roots(&self) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .filter(|(_, r)| r.container.is_some() && r.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Children of a container in layout order.
    pub fn children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.container(id)
            .map(|c| c.measurable().children())
            .unwrap_or_default()
    }

    /// Make `connector` a container of the given kind. An existing container
    /// of the same kind is kept; a different kind replaces it.
    pub fn create_container(&mut self, connector: &str, kind: ContainerKind) -> Result<WidgetId> {
        let id = self.widget(connector);
        if self.container(id).map(Container::kind) == Some(kind) {
            return Ok(id);
        }
        let old_children = self.children(id);
        for child in old_children {
            self.detach(id, child);
        }
        let record = self.widgets.get_mut(id).ok_or(Error::UnknownWidget(id))?;
        record.container = Some(Container::new(kind));
        record.layout = None;
        debug!(connector, ?kind, "container created");
        self.request_layout(id);
        Ok(id)
    }

    /// Set the size offered to root containers.
    pub fn set_viewport(&mut self, size: Expanse) {
        if self.viewport == Some(size) {
            return;
        }
        self.viewport = Some(size);
        for root in self.roots() {
            self.request_layout(root);
        }
    }

    /// Apply a server diff to a container and schedule it for layout.
    /// Returns the structural mutations made to the child list.
    pub fn apply_diff(&mut self, connector: &str, diff: &ContainerDiff) -> Result<Vec<Mutation>> {
        let id = self
            .lookup(connector)
            .filter(|id| self.is_container(*id))
            .ok_or_else(|| Error::UnknownContainer(connector.to_string()))?;
        self.check_selection(id, connector, diff)?;
        self.check_grid(id, diff)?;

        // Anything applied before a failure still needs a layout pass.
        let result = self.apply_diff_to(id, connector, diff);
        self.request_layout(id);
        result
    }

    /// Reject a `selected` entry that could not be honoured once the rest of
    /// the diff is applied. Runs before anything is changed.
    fn check_selection(&self, id: WidgetId, connector: &str, diff: &ContainerDiff) -> Result<()> {
        let Some(selected) = &diff.selected else {
            return Ok(());
        };
        let Some(Container::Accordion(acc)) = self.container(id) else {
            return Err(Error::Invalid(format!("{connector} is not an accordion")));
        };
        let member = match &diff.children {
            Some(children) => children.iter().any(|c| c.id == *selected),
            None => self
                .lookup(selected)
                .and_then(|w| acc.index_of(w))
                .is_some(),
        };
        if member {
            Ok(())
        } else {
            Err(Error::Invalid(format!("{selected} is not an item of {connector}")))
        }
    }

    /// Reject grid settings and areas that cannot be applied. Runs before
    /// anything is changed.
    fn check_grid(&self, id: WidgetId, diff: &ContainerDiff) -> Result<()> {
        let Some(Container::Grid(g)) = self.container(id) else {
            return Ok(());
        };
        grid::check_dimensions(
            diff.rows.unwrap_or(g.rows()),
            diff.columns.unwrap_or(g.columns()),
        )?;
        if let Some(children) = &diff.children {
            let areas: Vec<Area> = children.iter().filter_map(|c| c.area).collect();
            grid::check_areas(&areas)?;
        }
        Ok(())
    }

    /// Apply the parts of a diff to a known container.
    fn apply_diff_to(&mut self, id: WidgetId, connector: &str, diff: &ContainerDiff) -> Result<Vec<Mutation>> {
        let mut mutations = Vec::new();
        if let Some(children) = &diff.children {
            let ids: Vec<WidgetId> = children.iter().map(|c| self.widget(&c.id)).collect();
            for child in &ids {
                if *child == id || self.is_ancestor(*child, id) {
                    return Err(Error::Invalid(format!(
                        "{} cannot contain its ancestor {}",
                        connector,
                        self.connector(*child).unwrap_or_default()
                    )));
                }
            }
            let caption_position = self.config.default_caption_position;
            mutations = self.container_mut(id)?.reconcile(&ids, caption_position);
            for m in &mutations {
                match *m {
                    Mutation::Removed { widget } => self.detach(id, widget),
                    Mutation::Inserted { widget, .. } => self.attach(id, widget)?,
                    Mutation::Moved { .. } => {}
                }
            }
            for (child, state) in ids.iter().zip(children) {
                self.apply_child_state(id, *child, state)?;
            }
            if let Container::Grid(g) = self.container_mut(id)? {
                let areas: Vec<(WidgetId, Option<Area>)> =
                    ids.iter().copied().zip(children.iter().map(|c| c.area)).collect();
                g.set_areas(&areas)?;
            }
        }
        self.apply_settings(id, connector, diff)?;

        if let Some(selected) = &diff.selected {
            let index = match (self.lookup(selected), self.container(id)) {
                (Some(item), Some(Container::Accordion(acc))) => acc.index_of(item),
                _ => None,
            };
            let index = index.ok_or_else(|| {
                Error::Invalid(format!("{selected} is not an item of {connector}"))
            })?;
            self.with_accordion(id, |acc| acc.open(index))?;
        }
        Ok(mutations)
    }

    /// Apply container-level settings: margins, spacing, per-child maps,
    /// grid tracks and the container's own declared size.
    fn apply_settings(&mut self, id: WidgetId, connector: &str, diff: &ContainerDiff) -> Result<()> {
        let alignments = match &diff.alignments {
            Some(map) => Some(self.resolve_keys(connector, map)),
            None => None,
        };
        let ratios = match &diff.expand_ratios {
            Some(map) => Some(self.resolve_keys(connector, map)),
            None => None,
        };
        let has_ratios = ratios.as_ref().is_some_and(|r| !r.is_empty());
        match self.container_mut(id)? {
            Container::Ordered(o) => {
                if let Some(m) = diff.margins {
                    o.apply_margins(m);
                }
                if let Some(s) = diff.spacing {
                    o.apply_spacing(s);
                }
                if let Some(a) = &alignments {
                    o.apply_alignments(a);
                }
                if let Some(r) = &ratios {
                    o.apply_expand_ratios(r);
                }
                if diff.has_grid_settings() {
                    warn!(connector, "grid settings ignored");
                }
            }
            Container::Grid(g) => {
                if let Some(m) = diff.margins {
                    g.apply_margins(m);
                }
                if let Some(s) = diff.spacing {
                    g.apply_spacing(s);
                }
                if let Some(a) = &alignments {
                    g.apply_alignments(a);
                }
                if diff.rows.is_some() || diff.columns.is_some() {
                    let rows = diff.rows.unwrap_or(g.rows());
                    let columns = diff.columns.unwrap_or(g.columns());
                    g.set_dimensions(rows, columns)?;
                }
                if let Some(r) = &diff.row_expand_ratios {
                    g.set_row_ratios(r);
                }
                if let Some(r) = &diff.column_expand_ratios {
                    g.set_column_ratios(r);
                }
                if has_ratios {
                    warn!(connector, "per-child expand ratios ignored by grid");
                }
            }
            Container::Accordion(_) | Container::Absolute(_) => {
                if diff.margins.is_some()
                    || diff.spacing.is_some()
                    || alignments.as_ref().is_some_and(|a| !a.is_empty())
                    || has_ratios
                    || diff.has_grid_settings()
                {
                    warn!(connector, "layout settings ignored");
                }
            }
        }

        let record = self.widgets.get_mut(id).ok_or(Error::UnknownWidget(id))?;
        if let Some(w) = diff.width {
            record.width = w;
        }
        if let Some(h) = diff.height {
            record.height = h;
        }
        Ok(())
    }

    /// Resolve connector-keyed map entries to widget handles. Unknown keys
    /// are skipped.
    fn resolve_keys<V: Copy>(
        &self,
        connector: &str,
        map: &BTreeMap<String, V>,
    ) -> HashMap<WidgetId, V> {
        map.iter()
            .filter_map(|(key, value)| match self.lookup(key) {
                Some(id) => Some((id, *value)),
                None => {
                    warn!(connector, %key, "unknown child in diff");
                    None
                }
            })
            .collect()
    }

    /// Apply the per-child part of a diff.
    fn apply_child_state(&mut self, container: WidgetId, child: WidgetId, state: &ChildState) -> Result<()> {
        let c = self.container_mut(container)?;
        c.expandable().set_child_size(child, state.width, state.height)?;
        let change = c
            .caption_owner()
            .set_child_caption(child, state.caption.clone())?;
        match c {
            Container::Ordered(o) => {
                if let Some(p) = state.caption_position {
                    o.set_caption_position(child, p)?;
                }
            }
            Container::Absolute(a) => {
                if let Some(css) = &state.position {
                    a.set_position(child, Position::parse(css))?;
                }
            }
            Container::Grid(g) => {
                if let Some(p) = state.caption_position {
                    g.set_caption_position(child, p)?;
                }
            }
            Container::Accordion(_) => {}
        }
        self.caption_changed(child, change);
        if let Some(record) = self.widgets.get_mut(child) {
            record.width = state.width;
            record.height = state.height;
        }
        Ok(())
    }

    /// Keep cache registrations in step with a caption change.
    fn caption_changed(&mut self, widget: WidgetId, change: CaptionChange) {
        let caption = Element::Caption(widget);
        match change {
            CaptionChange::Created => self.cache.register_dependency(widget, caption),
            CaptionChange::Updated => self.cache.set_dirty(caption),
            CaptionChange::Removed => {
                self.cache.deregister_dependency(widget, caption);
                self.cache.forget(caption);
            }
            CaptionChange::Unchanged => {}
        }
    }

    /// Record that `child` now lives in `parent`, taking it out of any
    /// previous container.
    fn attach(&mut self, parent: WidgetId, child: WidgetId) -> Result<()> {
        let previous = self.parent(child).filter(|p| *p != parent);
        if let Some(old) = previous {
            let remaining: Vec<WidgetId> = self
                .children(old)
                .into_iter()
                .filter(|w| *w != child)
                .collect();
            let caption_position = self.config.default_caption_position;
            self.container_mut(old)?.reconcile(&remaining, caption_position);
            self.detach(old, child);
            self.request_layout(old);
        }
        let record = self.widgets.get_mut(child).ok_or(Error::UnknownWidget(child))?;
        record.parent = Some(parent);
        record.allocation = None;
        if record.container.is_some() {
            self.request_layout(child);
        }
        Ok(())
    }

    /// Tear down the bookkeeping for a child removed from `parent`.
    fn detach(&mut self, parent: WidgetId, child: WidgetId) {
        let caption = Element::Caption(child);
        self.cache.deregister_dependency(child, caption);
        self.cache.forget(caption);
        let Some(record) = self.widgets.get_mut(child) else {
            return;
        };
        if record.parent == Some(parent) {
            record.parent = None;
            record.allocation = None;
        }
        if record.container.is_none() {
            self.cache.forget(Element::Widget(child));
        }
    }

    /// True if `ancestor` is a container above `id`.
    fn is_ancestor(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        let mut current = self.parent(id);
        let mut steps = 0;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.widgets.len() {
                break;
            }
            current = self.parent(p);
        }
        false
    }

    /// Nesting depth: zero for roots.
    fn depth(&self, id: WidgetId) -> usize {
        let mut depth = 0;
        let mut current = self.parent(id);
        while let Some(p) = current {
            depth += 1;
            if depth > self.widgets.len() {
                break;
            }
            current = self.parent(p);
        }
        depth
    }

    /// Queue a container for layout. Repeated requests before the next
    /// flush coalesce into one.
    pub fn request_layout(&mut self, id: WidgetId) {
        if !self.is_container(id) {
            return;
        }
        if self.pending_set.insert(id) {
            self.pending.push(id);
        }
        self.scheduled = true;
    }

    /// Report that an element changed size outside the engine's control.
    /// The element is re-measured on the next flush and every container it
    /// affects is scheduled.
    pub fn notify_resized(&mut self, element: Element) -> Result<()> {
        let widget = element.widget();
        if !self.widgets.contains_key(widget) {
            return Err(Error::UnknownWidget(widget));
        }
        if element == Element::Widget(widget) && self.is_container(widget) {
            // A container's size is computed, never measured.
            self.request_layout(widget);
            return Ok(());
        }
        let mut affected = self.cache.notify_resized(element);
        if !affected.contains(&widget) {
            affected.push(widget);
        }
        for w in affected {
            match self.parent(w) {
                Some(p) => self.request_layout(p),
                None => debug!(widget = ?w, "resized widget is not in a container"),
            }
        }
        Ok(())
    }

    /// Measure a widget on the next flush rather than now, for widgets that
    /// are not yet attached to the render tree.
    pub fn defer_measurement(&mut self, widget: WidgetId) -> Result<()> {
        if !self.widgets.contains_key(widget) {
            return Err(Error::UnknownWidget(widget));
        }
        if !self.deferred.contains(&widget) {
            self.deferred.push(widget);
        }
        self.scheduled = true;
        Ok(())
    }

    /// Update the caption a child shows in its container. A widget that is
    /// not inside a container is reported and ignored.
    pub fn update_caption(&mut self, widget: WidgetId, caption: Option<Caption>) -> Result<CaptionChange> {
        let record = self.widgets.get(widget).ok_or(Error::UnknownWidget(widget))?;
        let Some(parent) = record.parent.filter(|p| self.is_container(*p)) else {
            error!(
                connector = %record.connector,
                "caption update for a widget outside any container"
            );
            return Ok(CaptionChange::Unchanged);
        };
        let change = self
            .container_mut(parent)?
            .caption_owner()
            .set_child_caption(widget, caption)?;
        self.caption_changed(widget, change);
        if change != CaptionChange::Unchanged {
            self.request_layout(parent);
        }
        Ok(change)
    }

    /// Run `f` against an accordion, then collect its events and schedule it.
    fn with_accordion(&mut self, id: WidgetId, f: impl FnOnce(&mut Accordion) -> Result<()>) -> Result<()> {
        let events = match self.container_mut(id)? {
            Container::Accordion(acc) => {
                f(acc)?;
                acc.take_events()
            }
            _ => {
                return Err(Error::Invalid(format!(
                    "{} is not an accordion",
                    self.connector(id).unwrap_or_default()
                )));
            }
        };
        if !events.is_empty() {
            self.events.extend(
                events
                    .into_iter()
                    .map(|event| LayoutEvent::Stack { container: id, event }),
            );
            self.request_layout(id);
        }
        Ok(())
    }

    /// Open an accordion item.
    pub fn open_item(&mut self, connector: &str, index: usize) -> Result<()> {
        let id = self
            .lookup(connector)
            .ok_or_else(|| Error::UnknownContainer(connector.to_string()))?;
        self.with_accordion(id, |acc| acc.open(index))
    }

    /// Close an accordion item.
    pub fn close_item(&mut self, connector: &str, index: usize) -> Result<()> {
        let id = self
            .lookup(connector)
            .ok_or_else(|| Error::UnknownContainer(connector.to_string()))?;
        self.with_accordion(id, |acc| acc.close(index))
    }

    /// Space offered to a container along both axes.
    fn available(&self, id: WidgetId) -> (Available, Available) {
        let Some(record) = self.widgets.get(id) else {
            return (Available::Undefined, Available::Undefined);
        };
        let allocated = record.allocation.filter(|_| record.parent.is_some());
        let basis = if record.parent.is_none() {
            self.viewport
        } else {
            None
        };
        let fs = self.config.font_size;
        (
            resolve_available(record.width, allocated.map(|r| r.w), basis.map(|v| v.w), fs),
            resolve_available(record.height, allocated.map(|r| r.h), basis.map(|v| v.h), fs),
        )
    }

    /// Solve every pending container. Containers are solved deepest first,
    /// so a parent solved in the same pass sees its children's new sizes.
    pub fn flush_pending_layout(&mut self, measurer: &mut dyn Measurer) -> Result<FlushReport> {
        let mut this = guard(self, |c| {
            // Requests queued before an error stay scheduled.
            c.scheduled = !c.pending.is_empty();
        });

        for widget in mem::take(&mut this.deferred) {
            this.notify_resized(Element::Widget(widget))?;
        }

        let mut report = FlushReport::default();
        while !this.pending.is_empty() {
            if report.passes >= this.config.max_layout_passes {
                warn!(
                    passes = report.passes,
                    pending = this.pending.len(),
                    "layout did not settle, giving up"
                );
                this.pending.clear();
                this.pending_set.clear();
                report.truncated = true;
                break;
            }
            report.passes += 1;

            let mut batch = mem::take(&mut this.pending);
            this.pending_set.clear();
            batch.retain(|id| this.is_container(*id));
            batch.sort_by_key(|id| Reverse(this.depth(*id)));
            let mut in_batch: HashSet<WidgetId> = batch.iter().copied().collect();
            for id in batch {
                in_batch.remove(&id);
                this.solve_container(id, measurer, &in_batch)?;
                report.solved += 1;
            }
        }
        debug!(?report, "layout flushed");
        Ok(report)
    }

    /// Solve one container and propagate the consequences. Containers in
    /// `upcoming` will be solved later in the same pass.
    fn solve_container(
        &mut self,
        id: WidgetId,
        measurer: &mut dyn Measurer,
        upcoming: &HashSet<WidgetId>,
    ) -> Result<()> {
        let (width, height) = self.available(id);
        let record = self.widgets.get(id).ok_or(Error::UnknownWidget(id))?;
        let container = record
            .container
            .as_ref()
            .ok_or_else(|| Error::UnknownContainer(record.connector.clone()))?;
        let mut ctx = SolveContext {
            cache: &mut self.cache,
            measurer,
            config: &self.config,
        };
        let layout = container.measurable().solve(&mut ctx, width, height);
        let old = record.layout.as_ref().map(|l| l.size);
        let parent = record.parent;

        for (child, geometry) in &layout.children {
            let before = self.available(*child);
            if let Some(r) = self.widgets.get_mut(*child) {
                r.allocation = Some(geometry.widget);
            }
            if self.is_container(*child) && self.available(*child) != before {
                self.request_layout(*child);
            }
        }

        let size = layout.size;
        if let Some(r) = self.widgets.get_mut(id) {
            r.layout = Some(layout);
        }
        let stored = self
            .cache
            .store(Element::Widget(id), BoxMetrics::content(size.w, size.h));
        if old != Some(size) {
            self.events.push(LayoutEvent::SizeChanged {
                widget: id,
                old: old.unwrap_or(Expanse::ZERO),
                new: size,
            });
        }
        if old != Some(size) || stored {
            if let Some(p) = parent.filter(|p| !upcoming.contains(p)) {
                self.request_layout(p);
            }
        }
        Ok(())
    }

    /// Last solved layout of a container.
    pub fn layout_of(&self, id: WidgetId) -> Option<&ContainerLayout> {
        self.widgets.get(id).and_then(|r| r.layout.as_ref())
    }

    /// Geometry of a child inside its container, from the last solve.
    pub fn slot_geometry(&self, id: WidgetId) -> Option<SlotGeometry> {
        let parent = self.parent(id)?;
        self.layout_of(parent)?.child(id).copied()
    }

    /// Rect of a widget inside its container.
    pub fn allocation(&self, id: WidgetId) -> Option<Rect> {
        self.widgets.get(id).and_then(|r| r.allocation)
    }

    /// Drain events produced since the last call.
    pub fn take_events(&mut self) -> Vec<LayoutEvent> {
        mem::take(&mut self.events)
    }
}

/// Availability along one axis for a declared size.
fn resolve_available(declared: Dimension, allocated: Option<u32>, viewport: Option<u32>, font_size: f64) -> Available {
    let px = match declared {
        Dimension::Undefined => None,
        Dimension::Fixed(..) => allocated.or_else(|| declared.fixed_px(font_size)),
        Dimension::Relative(_) => {
            allocated.or_else(|| viewport.and_then(|v| declared.resolve_relative(v)))
        }
    };
    px.map_or(Available::Undefined, Available::Definite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{alignment::Alignment, geom::Edges, margin::MarginInfo, testing::FakeMeasurer};

    fn children(ids: &[&str]) -> ContainerDiff {
        ContainerDiff {
            children: Some(ids.iter().map(|id| ChildState::new(*id)).collect()),
            ..ContainerDiff::default()
        }
    }

    fn setup(kind: ContainerKind, ids: &[&str]) -> Result<(Coordinator, FakeMeasurer)> {
        let mut c = Coordinator::default();
        c.create_container("root", kind)?;
        c.apply_diff("root", &children(ids))?;
        let mut m = FakeMeasurer::new();
        for (i, id) in ids.iter().enumerate() {
            let w = c.widget(id);
            let i = i as u32;
            m.set(Element::Widget(w), 100 + i * 10, 50 + i * 10);
        }
        Ok((c, m))
    }

    #[test]
    fn worked_example() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Vertical, &["a", "b", "c"])?;
        let mut config = Config::default();
        config.margin = Edges::new(10, 0, 10, 0);
        config.spacing = 5;
        c.config = config;
        c.apply_diff(
            "root",
            &ContainerDiff {
                margins: Some(MarginInfo::new(true, false, true, false)),
                spacing: Some(true),
                width: Some(Dimension::px(200)),
                height: Some(Dimension::px(300)),
                ..ContainerDiff::default()
            },
        )?;
        c.flush_pending_layout(&mut m)?;
        let root = c.widget("root");
        let layout = c.layout_of(root).cloned().unwrap_or_default();
        assert_eq!(layout.size, Expanse::new(200, 300));
        let cells: Vec<(u32, u32)> = layout
            .children
            .iter()
            .map(|(_, g)| (g.cell.tl.y, g.cell.h))
            .collect();
        assert_eq!(cells, vec![(10, 80), (95, 90), (190, 100)]);
        Ok(())
    }

    #[test]
    fn requests_coalesce() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Vertical, &["a"])?;
        let root = c.widget("root");
        c.request_layout(root);
        c.request_layout(root);
        assert_eq!(c.pending(), &[root]);
        assert!(c.is_scheduled());
        let report = c.flush_pending_layout(&mut m)?;
        assert_eq!(report.solved, 1);
        assert!(!c.is_scheduled());
        assert!(c.pending().is_empty());
        Ok(())
    }

    #[test]
    fn measures_only_dirty_entries() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Horizontal, &["a", "b"])?;
        c.flush_pending_layout(&mut m)?;
        assert_eq!(m.calls().len(), 2);
        m.reset_calls();

        let root = c.widget("root");
        c.request_layout(root);
        c.flush_pending_layout(&mut m)?;
        assert!(m.calls().is_empty());

        let a = c.widget("a");
        m.set(Element::Widget(a), 300, 20);
        c.notify_resized(Element::Widget(a))?;
        c.flush_pending_layout(&mut m)?;
        assert_eq!(m.calls(), &[Element::Widget(a)]);
        assert_eq!(c.layout_of(root).map(|l| l.size), Some(Expanse::new(410, 60)));
        Ok(())
    }

    #[test]
    fn nested_size_propagates_upward() -> Result<()> {
        let mut c = Coordinator::default();
        let mut m = FakeMeasurer::new();
        c.create_container("root", ContainerKind::Vertical)?;
        c.create_container("inner", ContainerKind::Horizontal)?;
        c.apply_diff("root", &children(&["inner", "x"]))?;
        c.apply_diff("inner", &children(&["a", "b"]))?;
        let (a, b, x) = (c.widget("a"), c.widget("b"), c.widget("x"));
        m.set(Element::Widget(a), 10, 10)
            .set(Element::Widget(b), 20, 30)
            .set(Element::Widget(x), 5, 5);
        c.flush_pending_layout(&mut m)?;
        let root = c.widget("root");
        let inner = c.widget("inner");
        assert_eq!(c.layout_of(inner).map(|l| l.size), Some(Expanse::new(30, 30)));
        assert_eq!(c.layout_of(root).map(|l| l.size), Some(Expanse::new(30, 35)));
        // The container's size comes from solving, not from the measurer.
        assert_eq!(m.count(Element::Widget(inner)), 0);

        m.set(Element::Widget(b), 20, 60);
        c.notify_resized(Element::Widget(b))?;
        let report = c.flush_pending_layout(&mut m)?;
        assert!(!report.truncated);
        assert_eq!(c.layout_of(root).map(|l| l.size), Some(Expanse::new(30, 65)));
        assert_eq!(c.allocation(x), Some(Rect::new(0, 60, 5, 5)));
        let events = c.take_events();
        assert!(events.contains(&LayoutEvent::SizeChanged {
            widget: inner,
            old: Expanse::new(30, 30),
            new: Expanse::new(30, 60),
        }));
        Ok(())
    }

    #[test]
    fn relative_child_container_follows_allocation() -> Result<()> {
        let mut c = Coordinator::default();
        let mut m = FakeMeasurer::new();
        c.create_container("root", ContainerKind::Vertical)?;
        c.create_container("inner", ContainerKind::Horizontal)?;
        let mut diff = children(&["inner"]);
        if let Some(kids) = diff.children.as_mut() {
            kids[0].width = Dimension::percent(100.0);
        }
        diff.width = Some(Dimension::px(400));
        c.apply_diff("root", &diff)?;
        c.apply_diff(
            "inner",
            &ContainerDiff {
                expand_ratios: Some([("a".to_string(), 1.0)].into_iter().collect()),
                ..children(&["a", "b"])
            },
        )?;
        let (a, b) = (c.widget("a"), c.widget("b"));
        m.set(Element::Widget(a), 10, 10).set(Element::Widget(b), 20, 10);
        let report = c.flush_pending_layout(&mut m)?;
        assert!(report.passes >= 2);
        let inner = c.widget("inner");
        assert_eq!(c.layout_of(inner).map(|l| l.size.w), Some(400));
        assert_eq!(c.slot_geometry(a).map(|g| g.cell.w), Some(380));
        Ok(())
    }

    #[test]
    fn caption_update_without_container_is_ignored() -> Result<()> {
        let mut c = Coordinator::default();
        let lone = c.widget("lone");
        assert_eq!(
            c.update_caption(lone, Some(Caption::text("x")))?,
            CaptionChange::Unchanged
        );
        assert!(!c.is_scheduled());
        Ok(())
    }

    #[test]
    fn caption_update_registers_dependency() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Vertical, &["a"])?;
        let a = c.widget("a");
        m.set(Element::Caption(a), 40, 12);
        assert_eq!(
            c.update_caption(a, Some(Caption::text("Name")))?,
            CaptionChange::Created
        );
        assert_eq!(c.cache().dependents(Element::Caption(a)), &[a]);
        c.flush_pending_layout(&mut m)?;
        let g = c.slot_geometry(a).unwrap_or_default();
        assert_eq!(g.caption, Some(Rect::new(0, 0, 40, 12)));
        assert_eq!(g.widget, Rect::new(0, 12, 100, 50));

        assert_eq!(c.update_caption(a, None)?, CaptionChange::Removed);
        assert!(c.cache().dependents(Element::Caption(a)).is_empty());
        Ok(())
    }

    #[test]
    fn removal_tears_down_slot() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Vertical, &["a", "b"])?;
        let mut diff = children(&["a", "b"]);
        if let Some(kids) = diff.children.as_mut() {
            kids[1].caption = Some(Caption::text("B"));
        }
        c.apply_diff("root", &diff)?;
        c.flush_pending_layout(&mut m)?;
        let b = c.widget("b");
        let mutations = c.apply_diff("root", &children(&["a"]))?;
        assert_eq!(mutations, vec![Mutation::Removed { widget: b }]);
        assert_eq!(c.parent(b), None);
        assert!(c.cache().peek(Element::Caption(b)).is_none());
        assert!(c.cache().dependents(Element::Caption(b)).is_empty());
        // Replaying the same state changes nothing.
        assert!(c.apply_diff("root", &children(&["a"]))?.is_empty());
        Ok(())
    }

    #[test]
    fn reparenting_moves_child() -> Result<()> {
        let mut c = Coordinator::default();
        c.create_container("one", ContainerKind::Vertical)?;
        c.create_container("two", ContainerKind::Vertical)?;
        c.apply_diff("one", &children(&["a"]))?;
        c.apply_diff("two", &children(&["a"]))?;
        let (one, two, a) = (c.widget("one"), c.widget("two"), c.widget("a"));
        assert_eq!(c.parent(a), Some(two));
        assert!(c.children(one).is_empty());
        Ok(())
    }

    #[test]
    fn rejects_cycles() -> Result<()> {
        let mut c = Coordinator::default();
        c.create_container("outer", ContainerKind::Vertical)?;
        c.create_container("inner", ContainerKind::Vertical)?;
        c.apply_diff("outer", &children(&["inner"]))?;
        assert!(matches!(
            c.apply_diff("inner", &children(&["outer"])),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            c.apply_diff("nope", &children(&[])),
            Err(Error::UnknownContainer(_))
        ));
        Ok(())
    }

    #[test]
    fn bad_selection_changes_nothing() -> Result<()> {
        let mut c = Coordinator::default();
        c.create_container("v", ContainerKind::Vertical)?;
        let v = c.widget("v");
        let diff = ContainerDiff {
            selected: Some("a".into()),
            ..children(&["a", "b"])
        };
        assert!(matches!(c.apply_diff("v", &diff), Err(Error::Invalid(_))));
        assert!(c.children(v).is_empty());
        assert!(!c.is_scheduled());

        c.create_container("acc", ContainerKind::Accordion)?;
        c.apply_diff("acc", &children(&["p", "q"]))?;
        let acc = c.widget("acc");
        let mut m = FakeMeasurer::new();
        c.flush_pending_layout(&mut m)?;
        let diff = ContainerDiff {
            selected: Some("q".into()),
            ..children(&["p", "r"])
        };
        assert!(matches!(c.apply_diff("acc", &diff), Err(Error::Invalid(_))));
        assert_eq!(c.children(acc), vec![c.widget("p"), c.widget("q")]);
        assert!(!c.is_scheduled());

        // Selecting an item the same diff inserts is fine.
        let diff = ContainerDiff {
            selected: Some("r".into()),
            ..children(&["p", "r"])
        };
        c.apply_diff("acc", &diff)?;
        assert!(c.is_scheduled());
        assert!(matches!(c.container(acc), Some(Container::Accordion(a)) if a.open_index() == Some(1)));
        Ok(())
    }

    #[test]
    fn grid_areas_and_tracks() -> Result<()> {
        let mut c = Coordinator::default();
        c.create_container("g", ContainerKind::Grid)?;
        let g = c.widget("g");
        let mut diff = children(&["a", "b", "c"]);
        if let Some(kids) = diff.children.as_mut() {
            kids[0].area = Some(Area::cell(0, 0).spanning(1, 2));
        }
        diff.columns = Some(2);
        diff.column_expand_ratios = Some(vec![0.0, 1.0]);
        diff.width = Some(Dimension::px(100));
        c.apply_diff("g", &diff)?;
        let (a, b, cc) = (c.widget("a"), c.widget("b"), c.widget("c"));
        let mut m = FakeMeasurer::new();
        m.set(Element::Widget(a), 30, 10)
            .set(Element::Widget(b), 20, 5)
            .set(Element::Widget(cc), 10, 5);
        c.flush_pending_layout(&mut m)?;
        assert_eq!(c.slot_geometry(a).map(|s| s.cell), Some(Rect::new(0, 0, 100, 10)));
        assert_eq!(c.slot_geometry(b).map(|s| s.cell), Some(Rect::new(0, 10, 20, 5)));
        assert_eq!(c.slot_geometry(cc).map(|s| s.cell), Some(Rect::new(20, 10, 80, 5)));

        // Overlapping areas are rejected before anything changes.
        let mut clash = children(&["a", "b"]);
        if let Some(kids) = clash.children.as_mut() {
            kids[0].area = Some(Area::cell(0, 0));
            kids[1].area = Some(Area::cell(0, 0));
        }
        assert!(matches!(c.apply_diff("g", &clash), Err(Error::Invalid(_))));
        assert_eq!(c.children(g), vec![a, b, cc]);
        assert!(!c.is_scheduled());
        Ok(())
    }

    #[test]
    fn accordion_events_and_layout() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Accordion, &["p", "q"])?;
        let (root, p, q) = (c.widget("root"), c.widget("p"), c.widget("q"));
        m.set(Element::Caption(p), 80, 20).set(Element::Caption(q), 80, 20);
        c.apply_diff(
            "root",
            &ContainerDiff {
                height: Some(Dimension::px(200)),
                width: Some(Dimension::px(100)),
                selected: Some("p".into()),
                ..ContainerDiff::default()
            },
        )?;
        c.open_item("root", 1)?;
        assert_eq!(
            c.take_events(),
            vec![
                LayoutEvent::Stack { container: root, event: StackEvent::Opened(0) },
                LayoutEvent::Stack { container: root, event: StackEvent::Closed(0) },
                LayoutEvent::Stack { container: root, event: StackEvent::Opened(1) },
            ]
        );
        c.flush_pending_layout(&mut m)?;
        assert_eq!(c.slot_geometry(q).map(|g| g.widget), Some(Rect::new(0, 40, 100, 160)));
        // Closed content is never measured.
        assert_eq!(m.count(Element::Widget(p)), 0);
        assert!(matches!(c.open_item("root", 5), Err(Error::IndexOutOfRange { .. })));
        Ok(())
    }

    #[test]
    fn absolute_positions() -> Result<()> {
        let mut c = Coordinator::default();
        c.create_container("abs", ContainerKind::Absolute)?;
        let mut diff = children(&["a"]);
        if let Some(kids) = diff.children.as_mut() {
            kids[0].position = Some("right:10px;bottom:10%;bogus".into());
        }
        diff.width = Some(Dimension::px(300));
        diff.height = Some(Dimension::px(200));
        c.apply_diff("abs", &diff)?;
        let a = c.widget("a");
        let mut m = FakeMeasurer::new();
        m.set(Element::Widget(a), 50, 20);
        c.flush_pending_layout(&mut m)?;
        assert_eq!(c.allocation(a), Some(Rect::new(240, 160, 50, 20)));
        Ok(())
    }

    #[test]
    fn deferred_measurement_rereads() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Vertical, &["a"])?;
        c.flush_pending_layout(&mut m)?;
        let a = c.widget("a");
        m.reset_calls();
        c.defer_measurement(a)?;
        assert!(c.is_scheduled());
        c.flush_pending_layout(&mut m)?;
        assert_eq!(m.count(Element::Widget(a)), 1);
        Ok(())
    }

    #[test]
    fn viewport_resolves_relative_roots() -> Result<()> {
        let (mut c, mut m) = setup(ContainerKind::Vertical, &["a"])?;
        c.apply_diff(
            "root",
            &ContainerDiff {
                width: Some(Dimension::percent(50.0)),
                alignments: Some([("a".to_string(), Alignment::TOP_RIGHT)].into_iter().collect()),
                ..ContainerDiff::default()
            },
        )?;
        c.set_viewport(Expanse::new(800, 600));
        c.flush_pending_layout(&mut m)?;
        let a = c.widget("a");
        assert_eq!(c.allocation(a).map(|r| r.tl.x), Some(300));
        Ok(())
    }
}

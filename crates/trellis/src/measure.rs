//! Cached box measurements.
//!
//! Measuring a rendered element is the expensive operation the engine tries
//! to avoid. Every element gets a [`MeasuredSize`] entry that is re-read from
//! the [`Measurer`] only when it is dirty or has never been measured.
//! Auxiliary elements such as captions can be registered as dependencies of
//! a widget, so that a resize of the caption is reported as a change in the
//! widget's footprint.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    geom::{Edges, Expanse},
    id::WidgetId,
};

/// A measurable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// The rendered element of a widget.
    Widget(WidgetId),
    /// The caption wrapper owned by the slot of a widget.
    Caption(WidgetId),
}

impl Element {
    /// The widget this element belongs to.
    pub fn widget(&self) -> WidgetId {
        match self {
            Self::Widget(id) | Self::Caption(id) => *id,
        }
    }
}

/// Box-model metrics of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoxMetrics {
    /// Content box size.
    pub content: Expanse,
    /// Border widths.
    pub border: Edges,
    /// Padding widths.
    pub padding: Edges,
    /// Margin widths.
    pub margin: Edges,
}

impl BoxMetrics {
    /// Metrics with only a content size.
    pub fn content(w: u32, h: u32) -> Self {
        Self {
            content: Expanse::new(w, h),
            ..Self::default()
        }
    }

    /// Combined border and padding.
    pub fn border_padding(&self) -> Edges {
        self.border.plus(&self.padding)
    }

    /// Outer size: content plus border, padding and margin.
    pub fn outer(&self) -> Expanse {
        let e = self.border_padding().plus(&self.margin);
        Expanse::new(
            self.content.w.saturating_add(e.horizontal()),
            self.content.h.saturating_add(e.vertical()),
        )
    }
}

/// The measurement collaborator. Implementations query the host's box model.
pub trait Measurer {
    /// Measure an element. Returns `None` if the element is not attached to
    /// the render tree, in which case the engine treats it as zero-sized.
    fn measure(&mut self, element: Element) -> Option<BoxMetrics>;
}

/// Cached metrics for one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeasuredSize {
    /// Last known metrics.
    metrics: BoxMetrics,
    /// Whether the next access must re-measure.
    dirty: bool,
    /// Whether the element has been measured successfully at least once.
    measured: bool,
    /// Auxiliary elements whose size affects this element's footprint.
    dependencies: Vec<Element>,
}

impl MeasuredSize {
    /// Last known metrics.
    pub fn metrics(&self) -> BoxMetrics {
        self.metrics
    }

    /// Last known outer size.
    pub fn outer(&self) -> Expanse {
        self.metrics.outer()
    }

    /// True if the next access will re-measure.
    pub fn is_dirty(&self) -> bool {
        self.dirty || !self.measured
    }

    /// Registered dependency elements.
    pub fn dependencies(&self) -> &[Element] {
        &self.dependencies
    }
}

/// Per-element measurement cache.
#[derive(Debug, Default)]
pub struct MeasureCache {
    /// Cached entries.
    entries: HashMap<Element, MeasuredSize>,
    /// Reverse dependency index: auxiliary element to owning widgets.
    dependents: HashMap<Element, Vec<WidgetId>>,
    /// Number of measurer calls made through this cache.
    reads: u64,
}

impl MeasureCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The best-known metrics for an element, measuring only if needed.
    pub fn metrics(&mut self, element: Element, measurer: &mut dyn Measurer) -> BoxMetrics {
        let entry = self.entries.entry(element).or_default();
        if entry.dirty || !entry.measured {
            self.reads += 1;
            match measurer.measure(element) {
                Some(metrics) => {
                    trace!(?element, ?metrics, "measured");
                    entry.metrics = metrics;
                    entry.measured = true;
                    entry.dirty = false;
                }
                None => {
                    // Unattached: report zero and try again next time.
                    trace!(?element, "not attached");
                    entry.metrics = BoxMetrics::default();
                    entry.measured = false;
                }
            }
        }
        entry.metrics
    }

    /// The best-known outer size of an element.
    pub fn size(&mut self, element: Element, measurer: &mut dyn Measurer) -> Expanse {
        self.metrics(element, measurer).outer()
    }

    /// Inspect an entry without measuring.
    pub fn peek(&self, element: Element) -> Option<&MeasuredSize> {
        self.entries.get(&element)
    }

    /// Store metrics computed elsewhere, for instance the natural size of a
    /// nested container. Returns true if the outer size changed.
    pub fn store(&mut self, element: Element, metrics: BoxMetrics) -> bool {
        let entry = self.entries.entry(element).or_default();
        let changed = !entry.measured || entry.metrics.outer() != metrics.outer();
        entry.metrics = metrics;
        entry.measured = true;
        entry.dirty = false;
        changed
    }

    /// Mark an element for re-measurement on its next access.
    pub fn set_dirty(&mut self, element: Element) {
        self.entries.entry(element).or_default().dirty = true;
    }

    /// True if the element would be re-measured on its next access.
    pub fn is_dirty(&self, element: Element) -> bool {
        self.entries.get(&element).is_none_or(MeasuredSize::is_dirty)
    }

    /// Declare that `aux` contributes to the footprint of `owner`.
    pub fn register_dependency(&mut self, owner: WidgetId, aux: Element) {
        let deps = &mut self
            .entries
            .entry(Element::Widget(owner))
            .or_default()
            .dependencies;
        if !deps.contains(&aux) {
            deps.push(aux);
        }
        let owners = self.dependents.entry(aux).or_default();
        if !owners.contains(&owner) {
            owners.push(owner);
        }
    }

    /// Remove a dependency registration.
    pub fn deregister_dependency(&mut self, owner: WidgetId, aux: Element) {
        if let Some(entry) = self.entries.get_mut(&Element::Widget(owner)) {
            entry.dependencies.retain(|d| *d != aux);
        }
        if let Some(owners) = self.dependents.get_mut(&aux) {
            owners.retain(|o| *o != owner);
            if owners.is_empty() {
                self.dependents.remove(&aux);
            }
        }
    }

    /// Widgets whose footprint depends on `aux`.
    pub fn dependents(&self, aux: Element) -> &[WidgetId] {
        self.dependents.get(&aux).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record that an element changed size. The element is marked dirty and
    /// the widgets whose footprint it affects are returned: the element's own
    /// widget followed by any registered dependents.
    pub fn notify_resized(&mut self, element: Element) -> Vec<WidgetId> {
        self.set_dirty(element);
        let mut affected = Vec::new();
        if let Element::Widget(id) = element {
            affected.push(id);
        }
        for owner in self.dependents(element) {
            if !affected.contains(owner) {
                affected.push(*owner);
            }
        }
        affected
    }

    /// Drop an element's entry and every registration that mentions it.
    pub fn forget(&mut self, element: Element) {
        if let Some(entry) = self.entries.remove(&element) {
            for dep in entry.dependencies {
                if let Some(owners) = self.dependents.get_mut(&dep) {
                    owners.retain(|o| Element::Widget(*o) != element);
                    if owners.is_empty() {
                        self.dependents.remove(&dep);
                    }
                }
            }
        }
        if let Some(owners) = self.dependents.remove(&element) {
            for owner in owners {
                if let Some(entry) = self.entries.get_mut(&Element::Widget(owner)) {
                    entry.dependencies.retain(|d| *d != element);
                }
            }
        }
    }

    /// Number of measurer calls made so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }
}

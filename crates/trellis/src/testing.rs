//! Helpers for exercising the engine without a host.

use std::collections::HashMap;

use crate::measure::{BoxMetrics, Element, Measurer};

/// A measurer backed by a table of sizes. Elements missing from the table
/// are reported as unattached. Every call is recorded.
#[derive(Debug, Clone, Default)]
pub struct FakeMeasurer {
    /// Metrics per element.
    sizes: HashMap<Element, BoxMetrics>,
    /// Elements measured, in call order.
    calls: Vec<Element>,
}

impl FakeMeasurer {
    /// An empty measurer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give an element a content size.
    pub fn set(&mut self, element: Element, w: u32, h: u32) -> &mut Self {
        self.sizes.insert(element, BoxMetrics::content(w, h));
        self
    }

    /// Give an element full box metrics.
    pub fn set_metrics(&mut self, element: Element, metrics: BoxMetrics) -> &mut Self {
        self.sizes.insert(element, metrics);
        self
    }

    /// Detach an element: it will measure as `None`.
    pub fn remove(&mut self, element: Element) {
        self.sizes.remove(&element);
    }

    /// Every measurement made so far.
    pub fn calls(&self) -> &[Element] {
        &self.calls
    }

    /// How often an element was measured.
    pub fn count(&self, element: Element) -> usize {
        self.calls.iter().filter(|e| **e == element).count()
    }

    /// Forget recorded calls.
    pub fn reset_calls(&mut self) {
        self.calls.clear();
    }
}

impl Measurer for FakeMeasurer {
    fn measure(&mut self, element: Element) -> Option<BoxMetrics> {
        self.calls.push(element);
        self.sizes.get(&element).copied()
    }
}

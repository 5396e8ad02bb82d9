//! Trellis: an incremental ordered/box layout solver.
//!
//! Trellis computes pixel positions and sizes for a tree of layout
//! containers whose children declare fixed, relative or expand-ratio sizes,
//! captions, margins and spacing. It never measures anything itself: a host
//! supplies measurements through the [`Measurer`] trait and consumes the
//! computed geometry.
//!
//! # Quick Start
//!
//! The main entry points are:
//! - [`Coordinator`] - owns containers, the measurement cache and the layout
//!   queue
//! - [`ContainerDiff`] - a server-side state change for one container
//! - [`Measurer`] - the host's measurement primitive
//!
//! Apply diffs, then call [`Coordinator::flush_pending_layout`] once per host
//! tick.
//!
//! # Module Organization
//!
//! - [`ordered`] - the two-pass ordered engine, usable on its own
//! - [`grid`] - rows and columns sharing leftover space by track
//! - [`accordion`], [`absolute`] - the other container kinds
//! - [`measure`] - the measurement cache
//! - [`geom`] - geometry primitives

#![warn(missing_docs)]

pub use trellis_geom as geom;

pub mod absolute;
pub mod accordion;
pub mod alignment;
pub mod capability;
pub mod caption;
pub mod config;
pub mod container;
pub mod coordinator;
pub mod diff;
/// Debug dump utilities.
pub mod dump;
/// Core error types.
pub mod error;
pub mod grid;
/// Widget and slot handles.
pub mod id;
/// Container margin bitmask.
pub mod margin;
pub mod measure;
pub mod ordered;
pub mod sizing;
pub mod slot;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use alignment::Alignment;
pub use caption::{Caption, CaptionPosition};
pub use config::Config;
pub use container::{ContainerKind, Mutation};
pub use coordinator::{Coordinator, FlushReport, LayoutEvent};
pub use diff::{ChildState, ContainerDiff};
pub use error::{Error, Result};
pub use id::{SlotId, WidgetId};
pub use measure::{BoxMetrics, Element, Measurer};
pub use sizing::Dimension;

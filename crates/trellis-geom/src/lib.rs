//! Pixel geometry primitives used by the trellis layout engine.

#![warn(missing_docs)]

/// Primary and secondary layout axes.
mod axis;
/// Per-side edge widths: margins, borders and paddings.
mod edges;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use axis::Axis;
pub use edges::Edges;
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;

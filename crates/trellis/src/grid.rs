//! Grid layout: children placed in rows and columns.
//!
//! Every child covers an [`Area`] of one or more cells. A column is as wide
//! as its widest single-column child and a row as tall as its tallest
//! single-row child. Children spanning several tracks then widen those
//! tracks just enough to fit, narrowest spans first. A definite container
//! splits whatever is left over between its tracks by expand ratio, or
//! evenly when no track declares a positive ratio.
//!
//! Widgets sized as a percentage never widen a track. They stretch to the
//! cell they end up in.

use std::{
    collections::{HashMap, HashSet},
    ops::Range,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    alignment::Alignment,
    capability::{CaptionOwner, ContainerLayout, ExpandableChild, Measurable, SolveContext},
    caption::{Caption, CaptionChange, CaptionPosition},
    config::Config,
    error::{Error, Result},
    geom::{Axis, Edges, Expanse, Rect},
    id::WidgetId,
    margin::MarginInfo,
    ordered::{Available, SlotGeometry, SlotInput, distribute, place_in_cell},
    sizing::Dimension,
    slot::Slot,
};

/// Upper bound on the number of rows or columns.
pub const MAX_TRACKS: u32 = 1000;

/// The block of cells a child covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Area {
    /// First row.
    pub row: u32,
    /// First column.
    pub column: u32,
    /// Rows covered. Zero counts as one.
    pub row_span: u32,
    /// Columns covered. Zero counts as one.
    pub column_span: u32,
}

impl Default for Area {
    fn default() -> Self {
        Self::cell(0, 0)
    }
}

impl Area {
    /// A single cell.
    pub fn cell(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    /// The same origin covering `rows` by `columns` cells.
    pub fn spanning(self, rows: u32, columns: u32) -> Self {
        Self {
            row_span: rows,
            column_span: columns,
            ..self
        }
    }

    /// First track and number of tracks along an axis.
    pub fn along(&self, axis: Axis) -> (u32, u32) {
        match axis {
            Axis::Horizontal => (self.column, self.column_span.max(1)),
            Axis::Vertical => (self.row, self.row_span.max(1)),
        }
    }

    /// One past the last track along an axis.
    fn end(&self, axis: Axis) -> u32 {
        let (start, span) = self.along(axis);
        start.saturating_add(span)
    }

    /// True if the two areas share a cell.
    pub fn overlaps(&self, other: &Self) -> bool {
        [Axis::Horizontal, Axis::Vertical].into_iter().all(|axis| {
            self.along(axis).0 < other.end(axis) && other.along(axis).0 < self.end(axis)
        })
    }

    /// Track indices covered along an axis, clipped to `count` tracks.
    fn tracks(&self, axis: Axis, count: usize) -> Range<usize> {
        let last = count.saturating_sub(1);
        let start = (self.along(axis).0 as usize).min(last);
        let end = (self.end(axis) as usize).clamp(start + 1, count.max(start + 1));
        start..end
    }
}

/// Check a set of explicit areas: each must fit in [`MAX_TRACKS`] and no two
/// may share a cell.
pub fn check_areas(areas: &[Area]) -> Result<()> {
    for (i, a) in areas.iter().enumerate() {
        if a.end(Axis::Horizontal) > MAX_TRACKS || a.end(Axis::Vertical) > MAX_TRACKS {
            return Err(Error::Invalid(format!(
                "area at row {} column {} exceeds {MAX_TRACKS} tracks",
                a.row, a.column
            )));
        }
        if let Some(b) = areas[..i].iter().find(|b| b.overlaps(a)) {
            return Err(Error::Invalid(format!(
                "area at row {} column {} overlaps row {} column {}",
                a.row, a.column, b.row, b.column
            )));
        }
    }
    Ok(())
}

/// Check a declared grid size: between 1 and [`MAX_TRACKS`] tracks per axis.
pub fn check_dimensions(rows: u32, columns: u32) -> Result<()> {
    let valid = 1..=MAX_TRACKS;
    if valid.contains(&rows) && valid.contains(&columns) {
        Ok(())
    } else {
        Err(Error::Invalid(format!(
            "grid of {rows} by {columns} must have between 1 and {MAX_TRACKS} tracks per axis"
        )))
    }
}

/// Container-level inputs for the grid engine.
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    /// Available width.
    pub width: Available,
    /// Available height.
    pub height: Available,
    /// Resolved pixel margins.
    pub margins: Edges,
    /// Pixels between adjacent tracks, on both axes.
    pub spacing: u32,
    /// Expand ratio per column. Its length is the declared column count.
    pub column_ratios: Vec<f64>,
    /// Expand ratio per row. Its length is the declared row count.
    pub row_ratios: Vec<f64>,
}

impl GridParams {
    /// Availability along an axis.
    fn available(&self, axis: Axis) -> Available {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Declared track ratios along an axis.
    fn ratios(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Horizontal => &self.column_ratios,
            Axis::Vertical => &self.row_ratios,
        }
    }
}

/// One child as the grid engine sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInput {
    /// Measured slot contents and placement preferences.
    pub slot: SlotInput,
    /// The cells covered.
    pub area: Area,
}

/// The result of a grid layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridLayout {
    /// Outer size of the container.
    pub size: Expanse,
    /// Final column widths.
    pub column_widths: Vec<u32>,
    /// Final row heights.
    pub row_heights: Vec<u32>,
    /// Geometry per input, in input order.
    pub cells: Vec<SlotGeometry>,
}

/// Solved tracks along one axis.
struct Tracks {
    /// Offset of each track from the container origin.
    starts: Vec<u32>,
    /// Extent of each track.
    sizes: Vec<u32>,
    /// Container extent.
    outer: u32,
}

impl Tracks {
    /// Extent covered by a run of tracks, spacing between them included.
    fn span(&self, range: Range<usize>, spacing: u32) -> u32 {
        let gaps = spacing.saturating_mul(range.len().saturating_sub(1) as u32);
        self.sizes[range]
            .iter()
            .fold(gaps, |acc, s| acc.saturating_add(*s))
    }
}

/// Solve a grid layout.
pub fn solve(params: &GridParams, inputs: &[GridInput]) -> GridLayout {
    let columns = track_count(params, Axis::Horizontal, inputs);
    let rows = track_count(params, Axis::Vertical, inputs);
    let x = solve_axis(params, Axis::Horizontal, columns, inputs);
    let y = solve_axis(params, Axis::Vertical, rows, inputs);

    let cells = inputs
        .iter()
        .map(|input| {
            let across = input.area.tracks(Axis::Horizontal, columns);
            let down = input.area.tracks(Axis::Vertical, rows);
            let cell = Rect::new(
                x.starts[across.start],
                y.starts[down.start],
                x.span(across, params.spacing),
                y.span(down, params.spacing),
            );
            place_in_cell(&input.slot, cell)
        })
        .collect();

    let size = Expanse::new(x.outer, y.outer);
    debug!(columns, rows, cells = inputs.len(), ?size, "grid layout");
    GridLayout {
        size,
        column_widths: x.sizes,
        row_heights: y.sizes,
        cells,
    }
}

/// Tracks along an axis: the declared count, grown to cover every area.
fn track_count(params: &GridParams, axis: Axis, inputs: &[GridInput]) -> usize {
    inputs
        .iter()
        .map(|i| i.area.end(axis).min(MAX_TRACKS) as usize)
        .chain([params.ratios(axis).len()])
        .max()
        .unwrap_or(0)
}

/// Weights for spreading space over tracks. Without any positive ratio,
/// every track weighs the same.
fn track_weights(ratios: &[f64]) -> Vec<f64> {
    if ratios.iter().any(|r| r.is_finite() && *r > 0.0) {
        ratios
            .iter()
            .map(|r| if r.is_finite() && *r > 0.0 { *r } else { 0.0 })
            .collect()
    } else {
        vec![1.0; ratios.len()]
    }
}

/// Size and position the tracks along one axis.
fn solve_axis(params: &GridParams, axis: Axis, count: usize, inputs: &[GridInput]) -> Tracks {
    let mut ratios = params.ratios(axis).to_vec();
    ratios.resize(count, 0.0);

    let mut sizes = vec![0u32; count];
    let mut spanned = Vec::new();
    for input in inputs {
        let range = input.area.tracks(axis, count);
        let need = if input.slot.is_relative(axis) {
            0
        } else {
            input.slot.used_extent(axis)
        };
        if range.len() == 1 {
            sizes[range.start] = sizes[range.start].max(need);
        } else {
            spanned.push((range, need));
        }
    }

    // Narrow spans first, so wide ones see the tracks they already forced.
    spanned.sort_by_key(|(range, _)| range.len());
    for (range, need) in spanned {
        let gaps = params.spacing.saturating_mul(range.len() as u32 - 1);
        let allocated = sizes[range.clone()]
            .iter()
            .fold(gaps, |acc, s| acc.saturating_add(*s));
        if allocated < need {
            let extra = distribute(need - allocated, &track_weights(&ratios[range.clone()]));
            for (size, e) in sizes[range].iter_mut().zip(extra) {
                *size = size.saturating_add(e);
            }
        }
    }

    let gaps = params.spacing.saturating_mul(count.saturating_sub(1) as u32);
    let used = sizes
        .iter()
        .fold(gaps, |acc, s| acc.saturating_add(*s))
        .saturating_add(params.margins.along(axis));
    let outer = match params.available(axis) {
        Available::Definite(size) => {
            let shares = distribute(size.saturating_sub(used), &track_weights(&ratios));
            for (s, share) in sizes.iter_mut().zip(shares) {
                *s = s.saturating_add(share);
            }
            size
        }
        Available::Undefined => used,
    };

    let mut starts = Vec::with_capacity(count);
    let mut pos = params.margins.leading(axis);
    for s in &sizes {
        starts.push(pos);
        pos = pos.saturating_add(*s).saturating_add(params.spacing);
    }
    Tracks { starts, sizes, outer }
}

/// One child of a grid container.
#[derive(Debug, Clone)]
struct GridChild {
    /// Slot state shared with ordered containers.
    slot: Slot,
    /// Explicit placement. Children without one are placed automatically.
    area: Option<Area>,
}

/// A grid container.
#[derive(Debug, Clone)]
pub struct GridContainer {
    /// Children in child-list order.
    children: Vec<GridChild>,
    /// Declared row count.
    rows: u32,
    /// Declared column count.
    columns: u32,
    /// Expand ratio per row.
    row_ratios: Vec<f64>,
    /// Expand ratio per column.
    column_ratios: Vec<f64>,
    /// Enabled margin sides.
    margins: MarginInfo,
    /// Whether spacing separates tracks.
    spacing: bool,
}

impl Default for GridContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl GridContainer {
    /// An empty one-by-one grid.
    pub fn new() -> Self {
        Self {
            children: Vec::new(),
            rows: 1,
            columns: 1,
            row_ratios: Vec::new(),
            column_ratios: Vec::new(),
            margins: MarginInfo::NONE,
            spacing: false,
        }
    }

    /// Declared row count.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Declared column count.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Enabled margin sides.
    pub fn margins(&self) -> MarginInfo {
        self.margins
    }

    /// True if spacing is enabled.
    pub fn spacing(&self) -> bool {
        self.spacing
    }

    /// Child widgets in order.
    pub fn widgets(&self) -> Vec<WidgetId> {
        self.children.iter().map(|c| c.slot.widget()).collect()
    }

    /// The slot holding `widget`.
    pub fn slot(&self, widget: WidgetId) -> Option<&Slot> {
        self.child(widget).map(|c| &c.slot)
    }

    /// The explicit area of `widget`, if it has one.
    pub fn area(&self, widget: WidgetId) -> Option<Area> {
        self.child(widget).and_then(|c| c.area)
    }

    /// The child entry for `widget`.
    fn child(&self, widget: WidgetId) -> Option<&GridChild> {
        self.children.iter().find(|c| c.slot.widget() == widget)
    }

    /// Mutable access to the child entry for `widget`.
    fn child_mut(&mut self, widget: WidgetId) -> Result<&mut GridChild> {
        self.children
            .iter_mut()
            .find(|c| c.slot.widget() == widget)
            .ok_or(Error::UnknownWidget(widget))
    }

    /// Replace the child list. Surviving children keep their slot state and
    /// area; new ones get `caption_position`. Returns the dropped children.
    pub fn set_children(&mut self, widgets: &[WidgetId], caption_position: CaptionPosition) -> Vec<WidgetId> {
        let mut old: HashMap<WidgetId, GridChild> = self
            .children
            .drain(..)
            .map(|c| (c.slot.widget(), c))
            .collect();
        let mut seen = HashSet::with_capacity(widgets.len());
        self.children = widgets
            .iter()
            .filter(|w| seen.insert(**w))
            .map(|w| {
                old.remove(w).unwrap_or_else(|| {
                    let mut slot = Slot::new(*w);
                    slot.set_caption_position(caption_position);
                    GridChild { slot, area: None }
                })
            })
            .collect();
        old.into_keys().collect()
    }

    /// Set the declared grid size. Areas outside it grow the grid at solve
    /// time.
    pub fn set_dimensions(&mut self, rows: u32, columns: u32) -> Result<()> {
        check_dimensions(rows, columns)?;
        self.rows = rows;
        self.columns = columns;
        Ok(())
    }

    /// Set every child's explicit area at once. Children missing from
    /// `areas` keep theirs.
    pub fn set_areas(&mut self, areas: &[(WidgetId, Option<Area>)]) -> Result<()> {
        let mut merged: HashMap<WidgetId, Option<Area>> =
            self.children.iter().map(|c| (c.slot.widget(), c.area)).collect();
        for (widget, area) in areas {
            if !merged.contains_key(widget) {
                return Err(Error::UnknownWidget(*widget));
            }
            merged.insert(*widget, *area);
        }
        let explicit: Vec<Area> = merged.values().filter_map(|a| *a).collect();
        check_areas(&explicit)?;
        for child in &mut self.children {
            child.area = merged.get(&child.slot.widget()).copied().flatten();
        }
        Ok(())
    }

    /// Set the margin bitmask. Returns true if it changed.
    pub fn apply_margins(&mut self, margins: MarginInfo) -> bool {
        let changed = self.margins != margins;
        self.margins = margins;
        changed
    }

    /// Enable or disable spacing. Returns true if it changed.
    pub fn apply_spacing(&mut self, enabled: bool) -> bool {
        let changed = self.spacing != enabled;
        self.spacing = enabled;
        changed
    }

    /// Apply alignments. Children missing from the map get the default.
    pub fn apply_alignments(&mut self, alignments: &HashMap<WidgetId, Alignment>) {
        for child in &mut self.children {
            let a = alignments
                .get(&child.slot.widget())
                .copied()
                .unwrap_or_default();
            child.slot.set_alignment(a);
        }
    }

    /// Expand ratio per row. Rows past the end of the list do not expand.
    pub fn set_row_ratios(&mut self, ratios: &[f64]) {
        self.row_ratios = ratios.to_vec();
    }

    /// Expand ratio per column. Columns past the end of the list do not
    /// expand.
    pub fn set_column_ratios(&mut self, ratios: &[f64]) {
        self.column_ratios = ratios.to_vec();
    }

    /// Set the caption position of one child.
    pub fn set_caption_position(&mut self, widget: WidgetId, position: CaptionPosition) -> Result<()> {
        self.child_mut(widget)?.slot.set_caption_position(position);
        Ok(())
    }

    /// The area of every child, in child order. Children without an explicit
    /// area take the first free cell in reading order, `columns` cells to a
    /// row.
    pub fn placements(&self) -> Vec<Area> {
        let columns = self.columns.max(1);
        let mut taken: Vec<Area> = self.children.iter().filter_map(|c| c.area).collect();
        let mut cursor = 0u32;
        self.children
            .iter()
            .map(|c| {
                if let Some(a) = c.area {
                    return a;
                }
                loop {
                    let a = Area::cell(cursor / columns, cursor % columns);
                    cursor = cursor.saturating_add(1);
                    if cursor == u32::MAX || !taken.iter().any(|t| t.overlaps(&a)) {
                        taken.push(a);
                        return a;
                    }
                }
            })
            .collect()
    }

    /// Engine parameters for this container.
    pub fn params(&self, width: Available, height: Available, config: &Config) -> GridParams {
        let padded = |ratios: &[f64], count: u32| {
            let mut v = ratios.to_vec();
            v.resize(v.len().max(count as usize), 0.0);
            v
        };
        GridParams {
            width,
            height,
            margins: self.margins.resolve(config.margin),
            spacing: if self.spacing { config.spacing } else { 0 },
            column_ratios: padded(&self.column_ratios, self.columns),
            row_ratios: padded(&self.row_ratios, self.rows),
        }
    }
}

impl Measurable for GridContainer {
    fn children(&self) -> Vec<WidgetId> {
        self.widgets()
    }

    fn solve(&self, ctx: &mut SolveContext<'_>, width: Available, height: Available) -> ContainerLayout {
        let inputs: Vec<GridInput> = self
            .children
            .iter()
            .zip(self.placements())
            .map(|(child, area)| {
                let mut slot = child.slot.input(ctx.cache, ctx.measurer);
                slot.widget = ctx.with_fixed(slot.widget, child.slot.width(), child.slot.height());
                GridInput { slot, area }
            })
            .collect();
        let out = solve(&self.params(width, height, ctx.config), &inputs);
        ContainerLayout {
            size: out.size,
            children: self.widgets().into_iter().zip(out.cells).collect(),
        }
    }
}

impl CaptionOwner for GridContainer {
    fn set_child_caption(&mut self, child: WidgetId, caption: Option<Caption>) -> Result<CaptionChange> {
        Ok(self.child_mut(child)?.slot.set_caption(caption))
    }

    fn caption_of(&self, child: WidgetId) -> Option<&Caption> {
        self.slot(child).and_then(Slot::caption)
    }
}

impl ExpandableChild for GridContainer {
    fn set_child_size(&mut self, child: WidgetId, width: Dimension, height: Dimension) -> Result<()> {
        self.child_mut(child)?.slot.set_size(width, height);
        Ok(())
    }
}

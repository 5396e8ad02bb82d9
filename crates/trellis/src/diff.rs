//! State diffs received from the server.
//!
//! Every field of a [`ContainerDiff`] is optional: a missing field leaves
//! the corresponding container state untouched. When a per-child map such as
//! `alignments` is present, children that do not appear in it revert to the
//! default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    alignment::Alignment,
    caption::{Caption, CaptionPosition},
    error::{ParseError, Result},
    grid::Area,
    margin::MarginInfo,
    sizing::Dimension,
};

/// The server's view of one child.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildState {
    /// Connector id of the child.
    pub id: String,
    /// Declared width.
    pub width: Dimension,
    /// Declared height.
    pub height: Dimension,
    /// Caption, if the child has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
    /// Caption placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_position: Option<CaptionPosition>,
    /// Position string for absolute containers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Cells covered in a grid container. Without one the child is placed
    /// in the next free cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<Area>,
}

impl ChildState {
    /// A child with no declared size and no caption.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// A change to one container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerDiff {
    /// The full ordered child list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ChildState>>,
    /// Margin bitmask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<MarginInfo>,
    /// Spacing flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<bool>,
    /// Alignment bitmask per child connector id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignments: Option<BTreeMap<String, Alignment>>,
    /// Expand ratio per child connector id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand_ratios: Option<BTreeMap<String, f64>>,
    /// Declared width of the container itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    /// Declared height of the container itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    /// Connector id of the open accordion item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    /// Declared grid row count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Declared grid column count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
    /// Expand ratio per grid row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_expand_ratios: Option<Vec<f64>>,
    /// Expand ratio per grid column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_expand_ratios: Option<Vec<f64>>,
}

impl ContainerDiff {
    /// Decode a diff from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ParseError::new(e.to_string()).into())
    }

    /// Encode the diff as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ParseError::new(e.to_string()).into())
    }

    /// True if the diff carries any grid-only setting.
    pub fn has_grid_settings(&self) -> bool {
        self.rows.is_some()
            || self.columns.is_some()
            || self.row_expand_ratios.is_some()
            || self.column_expand_ratios.is_some()
    }

    /// True if the diff changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn decodes_wire_form() -> Result<()> {
        let diff = ContainerDiff::from_json(
            r#"{
                "children": [
                    {"id": "a", "height": "50px"},
                    {"id": "b", "width": "100%", "caption": {"text": "Name"}},
                    {"id": "c", "position": "top:5px"}
                ],
                "margins": 5,
                "spacing": true,
                "alignments": {"a": 48},
                "expand_ratios": {"b": 1.5, "c": -1}
            }"#,
        )?;
        let children = diff.children.as_deref().unwrap_or_default();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].height, Dimension::px(50));
        assert!(children[0].width.is_undefined());
        assert_eq!(children[1].width, Dimension::percent(100.0));
        assert_eq!(children[1].caption, Some(Caption::text("Name")));
        assert_eq!(children[2].position.as_deref(), Some("top:5px"));
        assert_eq!(diff.margins, Some(MarginInfo::new(true, false, true, false)));
        assert_eq!(
            diff.alignments.as_ref().and_then(|m| m.get("a")).copied(),
            Some(Alignment::MIDDLE_CENTER)
        );
        assert_eq!(diff.width, None);
        Ok(())
    }

    #[test]
    fn decodes_grid_fields() -> Result<()> {
        let diff = ContainerDiff::from_json(
            r#"{
                "children": [{"id": "a", "area": {"row": 1, "column": 2, "column_span": 2}}],
                "rows": 2,
                "columns": 4,
                "column_expand_ratios": [0, 1]
            }"#,
        )?;
        let area = diff.children.as_deref().unwrap_or_default()[0].area;
        assert_eq!(area, Some(Area::cell(1, 2).spanning(1, 2)));
        assert_eq!(diff.columns, Some(4));
        assert!(diff.has_grid_settings());
        assert!(!ContainerDiff::default().has_grid_settings());
        Ok(())
    }

    #[test]
    fn rejects_bad_sizes() {
        let err = ContainerDiff::from_json(r#"{"children": [{"id": "a", "width": "12furlongs"}]}"#);
        assert!(matches!(err, Err(Error::Parse(_))));
    }

    #[test]
    fn empty_diff() -> Result<()> {
        let diff = ContainerDiff::from_json("{}")?;
        assert!(diff.is_empty());
        assert_eq!(diff.to_json()?, "{}");
        Ok(())
    }
}

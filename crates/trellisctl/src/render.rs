//! Output formats for a solved scene.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use serde::Serialize;
use trellis::{
    ContainerKind, Coordinator, WidgetId, dump,
    geom::{Expanse, Rect},
};

/// One child in the JSON output.
#[derive(Debug, Serialize)]
struct ChildOut {
    /// Connector id.
    id: String,
    /// Cell rect inside the container.
    cell: Rect,
    /// Widget rect inside the container.
    widget: Rect,
    /// Caption rect, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<Rect>,
}

/// One container in the JSON output.
#[derive(Debug, Serialize)]
struct ContainerOut {
    /// Connector id.
    id: String,
    /// Container kind.
    kind: ContainerKind,
    /// Solved outer size.
    size: Expanse,
    /// Children in layout order.
    children: Vec<ChildOut>,
}

/// Every container, parents before children.
fn containers(coord: &Coordinator) -> Vec<WidgetId> {
    let mut out = Vec::new();
    let mut stack: Vec<WidgetId> = coord.roots().into_iter().rev().collect();
    while let Some(id) = stack.pop() {
        if coord.is_container(id) {
            out.push(id);
            stack.extend(coord.children(id).into_iter().rev());
        }
    }
    out
}

/// Connector id of a widget, for display.
fn name(coord: &Coordinator, id: WidgetId) -> String {
    coord.connector(id).unwrap_or("?").to_string()
}

/// Short rect form.
fn rect(r: Rect) -> String {
    format!("{},{} {}×{}", r.tl.x, r.tl.y, r.w, r.h)
}

/// Render the layout as a table with one row per child.
pub fn table(coord: &Coordinator) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(presets::UTF8_FULL);
    table.set_header(vec!["container", "child", "cell", "widget", "caption"]);
    for id in containers(coord) {
        let Some(layout) = coord.layout_of(id) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(name(coord, id)).fg(Color::Cyan),
            Cell::new(""),
            Cell::new(format!("{}×{}", layout.size.w, layout.size.h)).fg(Color::Yellow),
            Cell::new(""),
            Cell::new(""),
        ]);
        for (child, g) in &layout.children {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(name(coord, *child)).fg(Color::Green),
                Cell::new(rect(g.cell)),
                Cell::new(rect(g.widget)),
                Cell::new(g.caption.map(rect).unwrap_or_default()),
            ]);
        }
    }
    table.to_string()
}

/// Render the layout as pretty-printed JSON.
pub fn json(coord: &Coordinator) -> Result<String> {
    let out: Vec<ContainerOut> = containers(coord)
        .into_iter()
        .filter_map(|id| {
            let container = coord.container(id)?;
            let layout = coord.layout_of(id)?;
            Some(ContainerOut {
                id: name(coord, id),
                kind: container.kind(),
                size: layout.size,
                children: layout
                    .children
                    .iter()
                    .map(|(child, g)| ChildOut {
                        id: name(coord, *child),
                        cell: g.cell,
                        widget: g.widget,
                        caption: g.caption,
                    })
                    .collect(),
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&out)?)
}

/// Render the container tree with the library's dump format.
pub fn tree(coord: &Coordinator, color: bool) -> Result<String> {
    let mut out = String::new();
    for root in coord.roots() {
        let s = if color {
            dump::dump(coord, root)?
        } else {
            dump::dump_plain(coord, root)?
        };
        out.push_str(&s);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use trellis::Config;

    use super::*;
    use crate::scene::Scene;

    fn solved() -> Result<Coordinator> {
        let scene = Scene::from_json(
            r#"{
                "containers": [
                    {"id": "outer", "kind": "horizontal", "diff": {
                        "children": [{"id": "x"}, {"id": "inner"}]
                    }},
                    {"id": "inner", "kind": "vertical", "diff": {
                        "children": [{"id": "y", "caption": {"text": "Y"}}]
                    }}
                ],
                "sizes": {"x": {"w": 10, "h": 10}, "y": {"w": 20, "h": 5}},
                "captions": {"y": {"w": 8, "h": 3}}
            }"#,
        )?;
        scene.solve(Config::default())
    }

    #[test]
    fn containers_parent_first() -> Result<()> {
        let coord = solved()?;
        let names: Vec<String> = containers(&coord)
            .into_iter()
            .map(|id| name(&coord, id))
            .collect();
        assert_eq!(names, vec!["outer", "inner"]);
        Ok(())
    }

    #[test]
    fn json_lists_every_container() -> Result<()> {
        let coord = solved()?;
        let v: serde_json::Value = serde_json::from_str(&json(&coord)?)?;
        assert_eq!(v[0]["id"], "outer");
        assert_eq!(v[0]["kind"], "horizontal");
        assert_eq!(v[1]["children"][0]["id"], "y");
        assert_eq!(v[1]["children"][0]["caption"]["h"], 3);
        assert_eq!(v[1]["size"]["h"], 8);
        Ok(())
    }

    #[test]
    fn table_and_tree_mention_children() -> Result<()> {
        let coord = solved()?;
        assert!(table(&coord).contains("inner"));
        let t = tree(&coord, false)?;
        assert!(t.starts_with("outer Horizontal\n"));
        assert!(t.contains("        y\n"));
        Ok(())
    }
}

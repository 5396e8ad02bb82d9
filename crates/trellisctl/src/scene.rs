//! Scene files: a set of containers, the diffs that populate them, and a
//! static table of rendered sizes standing in for a real measurer.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, info};
use trellis::{
    BoxMetrics, Config, ContainerDiff, ContainerKind, Coordinator, Element, Measurer,
    geom::Expanse,
};

/// One container in a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneContainer {
    /// Connector id.
    pub id: String,
    /// Container kind.
    #[serde(default)]
    pub kind: ContainerKind,
    /// Initial state.
    #[serde(default)]
    pub diff: ContainerDiff,
}

/// An accordion item to open after the diffs are applied.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenItem {
    /// Accordion connector id.
    pub container: String,
    /// Item index.
    pub index: usize,
}

/// A layout scene.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    /// Viewport offered to root containers with relative sizes.
    pub viewport: Option<Expanse>,
    /// Containers, in the order their diffs are applied.
    pub containers: Vec<SceneContainer>,
    /// Rendered widget sizes by connector id.
    pub sizes: HashMap<String, Expanse>,
    /// Rendered caption sizes by connector id.
    pub captions: HashMap<String, Expanse>,
    /// Accordion items to open.
    pub open: Vec<OpenItem>,
}

impl Scene {
    /// Parse a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scene")
    }

    /// Read a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Build a coordinator for the scene and solve it.
    pub fn solve(&self, config: Config) -> Result<Coordinator> {
        let mut coord = Coordinator::new(config).context("invalid configuration")?;
        for c in &self.containers {
            coord
                .create_container(&c.id, c.kind)
                .with_context(|| format!("creating container {}", c.id))?;
        }
        for c in &self.containers {
            let mutations = coord
                .apply_diff(&c.id, &c.diff)
                .with_context(|| format!("applying diff to {}", c.id))?;
            debug!(container = %c.id, mutations = mutations.len(), "diff applied");
        }
        for item in &self.open {
            coord
                .open_item(&item.container, item.index)
                .with_context(|| format!("opening item {} of {}", item.index, item.container))?;
        }
        if let Some(v) = self.viewport {
            coord.set_viewport(v);
        }

        let mut measurer = StaticMeasurer::default();
        for (connector, size) in &self.sizes {
            let id = coord.widget(connector);
            measurer.set(Element::Widget(id), *size);
        }
        for (connector, size) in &self.captions {
            let id = coord.widget(connector);
            measurer.set(Element::Caption(id), *size);
        }

        let report = coord.flush_pending_layout(&mut measurer)?;
        if report.truncated {
            bail!("layout did not settle after {} passes", report.passes);
        }
        info!(
            passes = report.passes,
            solved = report.solved,
            measured = measurer.calls,
            "scene solved"
        );
        Ok(coord)
    }
}

/// A measurer backed by a fixed size table. Widgets missing from the table
/// are reported as unattached.
#[derive(Debug, Default)]
pub struct StaticMeasurer {
    /// Known sizes.
    sizes: HashMap<Element, BoxMetrics>,
    /// Number of measurements served.
    calls: usize,
}

impl StaticMeasurer {
    /// Record the rendered size of an element.
    pub fn set(&mut self, element: Element, size: Expanse) {
        self.sizes
            .insert(element, BoxMetrics::content(size.w, size.h));
    }
}

impl Measurer for StaticMeasurer {
    fn measure(&mut self, element: Element) -> Option<BoxMetrics> {
        self.calls += 1;
        self.sizes.get(&element).copied()
    }
}

/// Load a configuration file.
pub fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use trellis::geom::{Edges, Rect};

    use super::*;

    const STACK: &str = r#"{
        "containers": [
            {"id": "v", "kind": "vertical", "diff": {
                "children": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
                "margins": 5, "spacing": true, "height": "300px"
            }}
        ],
        "sizes": {
            "a": {"w": 100, "h": 50},
            "b": {"w": 100, "h": 60},
            "c": {"w": 100, "h": 70}
        }
    }"#;

    #[test]
    fn solves_a_stack() -> Result<()> {
        let config = Config {
            spacing: 5,
            margin: Edges::uniform(10),
            ..Config::default()
        };
        let c = Scene::from_json(STACK)?.solve(config)?;
        let b = c.lookup("b").context("b")?;
        assert_eq!(c.slot_geometry(b).map(|g| g.cell), Some(Rect::new(0, 95, 100, 90)));
        assert!(!c.is_scheduled());
        Ok(())
    }

    #[test]
    fn opens_accordion_items() -> Result<()> {
        let scene = Scene::from_json(
            r#"{
                "containers": [{"id": "acc", "kind": "accordion", "diff": {
                    "children": [{"id": "p", "caption": {"text": "P"}},
                                 {"id": "q", "caption": {"text": "Q"}}]
                }}],
                "sizes": {"p": {"w": 10, "h": 10}, "q": {"w": 30, "h": 40}},
                "captions": {"p": {"w": 20, "h": 5}, "q": {"w": 20, "h": 5}},
                "open": [{"container": "acc", "index": 1}]
            }"#,
        )?;
        let coord = scene.solve(Config::default())?;
        let acc = coord.lookup("acc").context("acc")?;
        assert_eq!(
            coord.layout_of(acc).map(|l| l.size),
            Some(Expanse::new(30, 50))
        );
        Ok(())
    }

    #[test]
    fn solves_a_grid() -> Result<()> {
        let scene = Scene::from_json(
            r#"{
                "containers": [{"id": "g", "kind": "grid", "diff": {
                    "columns": 2,
                    "children": [{"id": "a"}, {"id": "b"}, {"id": "c"}]
                }}],
                "sizes": {"a": {"w": 10, "h": 10}, "b": {"w": 20, "h": 5}, "c": {"w": 15, "h": 8}}
            }"#,
        )?;
        let coord = scene.solve(Config::default())?;
        let c = coord.lookup("c").context("c")?;
        assert_eq!(coord.slot_geometry(c).map(|g| g.cell), Some(Rect::new(0, 10, 15, 8)));
        Ok(())
    }

    #[test]
    fn unknown_container_is_an_error() {
        let scene = Scene {
            containers: vec![SceneContainer {
                id: "v".into(),
                kind: ContainerKind::Vertical,
                diff: ContainerDiff {
                    selected: Some("x".into()),
                    ..ContainerDiff::default()
                },
            }],
            ..Scene::default()
        };
        assert!(scene.solve(Config::default()).is_err());
    }

    #[test]
    fn config_from_toml() -> Result<()> {
        let config: Config = toml::from_str("spacing = 3\nfont_size = 12.0\n")?;
        assert_eq!(config.spacing, 3);
        assert_eq!(config.max_layout_passes, 8);
        Ok(())
    }
}

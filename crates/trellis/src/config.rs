//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{
    caption::CaptionPosition,
    error::{Error, Result},
    geom::Edges,
};

/// Default spacer size in pixels.
pub const DEFAULT_SPACING: u32 = 6;
/// Default margin on each enabled side, in pixels.
pub const DEFAULT_MARGIN: u32 = 12;
/// Default font size for em-based units.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Default bound on layout propagation passes per flush.
pub const DEFAULT_MAX_LAYOUT_PASSES: usize = 8;

/// Tunables shared by every container a coordinator owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pixel size of one spacer between slots.
    pub spacing: u32,
    /// Pixel size of each margin side, applied where the margin bitmask
    /// enables it.
    pub margin: Edges,
    /// Font size used to resolve em, rem and ex lengths.
    pub font_size: f64,
    /// Upper bound on solve passes in one flush.
    pub max_layout_passes: usize,
    /// Caption placement for new slots.
    pub default_caption_position: CaptionPosition,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            margin: Edges::uniform(DEFAULT_MARGIN),
            font_size: DEFAULT_FONT_SIZE,
            max_layout_passes: DEFAULT_MAX_LAYOUT_PASSES,
            default_caption_position: CaptionPosition::default(),
        }
    }
}

impl Config {
    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(Error::Config(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        if self.max_layout_passes == 0 {
            return Err(Error::Config("max_layout_passes must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.spacing, 6);
        assert_eq!(c.margin, Edges::uniform(12));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() -> serde_json::Result<()> {
        let c: Config = serde_json::from_str(r#"{"spacing": 4, "margin": {"top": 2}}"#)?;
        assert_eq!(c.spacing, 4);
        assert_eq!(c.margin, Edges::new(2, 0, 0, 0));
        assert_eq!(c.max_layout_passes, DEFAULT_MAX_LAYOUT_PASSES);
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        let c = Config {
            font_size: 0.0,
            ..Config::default()
        };
        assert!(matches!(c.validate(), Err(Error::Config(_))));
        let c = Config {
            max_layout_passes: 0,
            ..Config::default()
        };
        assert!(c.validate().is_err());
    }
}

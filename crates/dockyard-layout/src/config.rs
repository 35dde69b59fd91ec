//! Engine configuration.
//!
//! [`DockConfig`] gathers every metric and tuning knob of the engine. It can
//! be built in code or loaded from JSON; missing fields take their defaults.
//!
//! ```
//! use dockyard_layout::config::DockConfig;
//!
//! let config = DockConfig::from_json_str(r#"{ "title_bar_size": 30.0 }"#).unwrap();
//! assert_eq!(config.title_bar_size, 30.0);
//! assert_eq!(config.splitter_size, DockConfig::default().splitter_size);
//! ```

use std::path::Path;
use std::time::Duration;

use dockyard_core::geometry::SizeBox;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Thickness of an anchor hit band measured from a container edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnchorBand {
    /// Fixed pixel thickness.
    Pixels(f64),
    /// Fraction of the container extent along the tested axis.
    Percent(f64),
}

impl AnchorBand {
    /// Band thickness for a container of the given extent, never more than
    /// half of it.
    #[must_use]
    pub fn resolve(self, extent: f64) -> f64 {
        let extent = extent.max(0.0);
        let raw = match self {
            Self::Pixels(px) => px,
            Self::Percent(fraction) => extent * fraction,
        };
        raw.clamp(0.0, extent / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockConfig {
    /// Frame title/tab bar thickness.
    pub title_bar_size: f64,
    /// Splitter divider bar thickness.
    pub splitter_size: f64,
    /// Drawer tab strip thickness.
    pub collapser_strip_size: f64,
    /// Band along the main region edges that docks against the whole region.
    pub edge_anchor_band: AnchorBand,
    /// Band along each frame edge that splits the frame.
    pub panel_anchor_band: AnchorBand,
    pub edge_docking: bool,
    /// Offer all four title bands so a drop can change tab orientation.
    pub tab_reorientation: bool,
    /// Minimum interval between two re-solves.
    pub response_rate_ms: u64,
    /// Pointer travel before a press turns into a drag.
    pub drag_threshold: f64,
    /// Ticks a divider slide takes.
    pub animation_steps: u32,
    /// Size given to new floating frames without an explicit rectangle.
    pub floating_size: SizeBox,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            title_bar_size: 24.0,
            splitter_size: 3.0,
            collapser_strip_size: 28.0,
            edge_anchor_band: AnchorBand::Pixels(50.0),
            panel_anchor_band: AnchorBand::Percent(0.15),
            edge_docking: true,
            tab_reorientation: false,
            response_rate_ms: 10,
            drag_threshold: 3.0,
            animation_steps: 10,
            floating_size: SizeBox::new(320.0, 240.0),
        }
    }
}

impl DockConfig {
    /// Load from a JSON string and validate.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(s).map_err(|err| ConfigError::Json(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file on disk and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|err| ConfigError::Io(err.to_string()))?;
        Self::from_json_str(&content)
    }

    #[must_use]
    pub fn response_rate(&self) -> Duration {
        Duration::from_millis(self.response_rate_ms)
    }

    /// Check every field is within range; reports the first offender.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let metrics = [
            ("title_bar_size", self.title_bar_size),
            ("splitter_size", self.splitter_size),
            ("collapser_strip_size", self.collapser_strip_size),
            ("drag_threshold", self.drag_threshold),
            ("floating_size.width", self.floating_size.width),
            ("floating_size.height", self.floating_size.height),
        ];
        for (field, value) in metrics {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeOrNonFinite { field, value });
            }
        }
        for (field, band) in [
            ("edge_anchor_band", self.edge_anchor_band),
            ("panel_anchor_band", self.panel_anchor_band),
        ] {
            match band {
                AnchorBand::Pixels(value) if !value.is_finite() || value < 0.0 => {
                    return Err(ConfigError::NegativeOrNonFinite { field, value });
                }
                AnchorBand::Percent(value) if !(value > 0.0 && value <= 0.5) => {
                    return Err(ConfigError::PercentOutOfRange { field, value });
                }
                _ => {}
            }
        }
        if self.response_rate_ms == 0 {
            return Err(ConfigError::ZeroResponseRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(DockConfig::default().validate(), Ok(()));
    }

    #[test]
    fn anchor_band_resolution() {
        assert_eq!(AnchorBand::Pixels(50.0).resolve(400.0), 50.0);
        assert_eq!(AnchorBand::Pixels(50.0).resolve(60.0), 30.0);
        assert_eq!(AnchorBand::Percent(0.25).resolve(400.0), 100.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = DockConfig {
            splitter_size: -1.0,
            ..DockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeOrNonFinite {
                field: "splitter_size",
                ..
            })
        ));

        let config = DockConfig {
            panel_anchor_band: AnchorBand::Percent(0.9),
            ..DockConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PercentOutOfRange { .. })
        ));

        let config = DockConfig {
            response_rate_ms: 0,
            ..DockConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroResponseRate));
    }

    #[test]
    fn json_fills_missing_fields_and_validates() {
        let config = DockConfig::from_json_str(
            r#"{ "edge_anchor_band": { "kind": "percent", "value": 0.1 }, "edge_docking": false }"#,
        )
        .expect("valid config");
        assert_eq!(config.edge_anchor_band, AnchorBand::Percent(0.1));
        assert!(!config.edge_docking);
        assert_eq!(config.title_bar_size, 24.0);

        assert!(matches!(
            DockConfig::from_json_str(r#"{ "title_bar_size": -3 }"#),
            Err(ConfigError::NegativeOrNonFinite { .. })
        ));
        assert!(matches!(
            DockConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn loads_from_a_file() {
        let path = std::env::temp_dir().join(format!("dockyard-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "drag_threshold": 6.0 }"#).expect("write config");
        let config = DockConfig::from_json_file(&path).expect("load");
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.drag_threshold, 6.0);

        assert!(matches!(
            DockConfig::from_json_file(path.with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}

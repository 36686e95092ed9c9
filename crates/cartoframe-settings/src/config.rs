//! Configuration for the CartoFrame viewport engine.
//!
//! Supports JSON and TOML file formats stored in platform-specific
//! directories. Out-of-range values are clamped into their documented
//! ranges rather than rejected, so a hand-edited config file degrades
//! gracefully instead of refusing to load.

use cartoframe_core::constants::{DRAW_BATCH_SIZE, EXTEND_BUFFER_COEFF, VIEW_HISTORY_CAPACITY};
use cartoframe_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SettingsError, SettingsResult};

/// Viewport engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Over-allocate the back buffer beyond the client size.
    pub extend_buffer: bool,
    /// Buffer size multiplier when extension is on. Valid range 1..=5.
    pub extend_coefficient: u32,
    /// Feature count per draw batch before the renderer yields.
    /// Valid range 1_000..=200_000.
    pub draw_batch_size: usize,
    /// Depth of each zoom-history stack. Valid range 1..=100.
    pub history_capacity: usize,
    /// Map background color as RGBA bytes.
    pub background_color: [u8; 4],
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            extend_buffer: true,
            extend_coefficient: EXTEND_BUFFER_COEFF,
            draw_batch_size: DRAW_BATCH_SIZE,
            history_capacity: VIEW_HISTORY_CAPACITY,
            background_color: [255, 255, 255, 255],
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewport engine settings.
    pub viewport: ViewportSettings,
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML).
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let mut config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::LoadError(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        config.validate();
        Ok(config)
    }

    /// Save config to file (JSON or TOML).
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::SaveError(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp all values into their documented ranges. Returns whether the
    /// config was already valid.
    pub fn validate(&mut self) -> bool {
        let v = &mut self.viewport;
        let before = v.clone();
        v.extend_coefficient = v.extend_coefficient.clamp(1, 5);
        v.draw_batch_size = v.draw_batch_size.clamp(1_000, 200_000);
        v.history_capacity = v.history_capacity.clamp(1, 100);
        *v == before
    }

    /// The construction-time engine configuration these settings describe.
    pub fn engine_config(&self) -> EngineConfig {
        let v = &self.viewport;
        EngineConfig {
            extend_buffer: v.extend_buffer,
            extend_coefficient: v.extend_coefficient,
            draw_batch_size: v.draw_batch_size,
            history_capacity: v.history_capacity,
            background_color: v.background_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_engine_defaults() {
        let config = Config::default();
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_validate_clamps_out_of_range() {
        let mut config = Config::default();
        config.viewport.extend_coefficient = 99;
        config.viewport.draw_batch_size = 10;
        config.viewport.history_capacity = 0;

        assert!(!config.validate());
        assert_eq!(config.viewport.extend_coefficient, 5);
        assert_eq!(config.viewport.draw_batch_size, 1_000);
        assert_eq!(config.viewport.history_capacity, 1);

        assert!(config.validate(), "already clamped");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [viewport]
            extend_buffer = false
            "#,
        )
        .expect("valid toml");
        assert!(!parsed.viewport.extend_buffer);
        assert_eq!(parsed.viewport.extend_coefficient, EXTEND_BUFFER_COEFF);
        assert_eq!(parsed.viewport.history_capacity, VIEW_HISTORY_CAPACITY);
    }

    #[test]
    fn test_empty_config_is_default() {
        let parsed: Config = toml::from_str("").expect("valid toml");
        assert_eq!(parsed, Config::default());
    }
}

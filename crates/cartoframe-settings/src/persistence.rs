//! Settings persistence.
//!
//! Loads and saves the application configuration from the platform config
//! directory, falling back to defaults when no file exists yet.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};

const CONFIG_DIR_NAME: &str = "cartoframe";
const CONFIG_FILE_NAME: &str = "settings.toml";

/// Settings persistence layer.
#[derive(Debug, Clone, Default)]
pub struct SettingsPersistence {
    config: Config,
}

impl SettingsPersistence {
    /// Create a new persistence layer with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform-specific path of the settings file.
    pub fn config_file_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| SettingsError::ConfigDirectory("No config directory".to_string()))?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Create the settings directory if it does not exist yet.
    pub fn ensure_config_dir() -> SettingsResult<()> {
        let path = Self::config_file_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Load settings from the platform config path, or defaults when the
    /// file does not exist.
    pub fn load_or_default() -> Self {
        match Self::config_file_path() {
            Ok(path) if path.exists() => match Config::load_from_file(&path) {
                Ok(config) => Self { config },
                Err(_) => Self::default(),
            },
            _ => Self::default(),
        }
    }

    /// Load settings from an explicit file.
    pub fn load_from_file(path: &std::path::Path) -> SettingsResult<Self> {
        let config = Config::load_from_file(path)?;
        Ok(Self { config })
    }

    /// Save settings to an explicit file.
    pub fn save_to_file(&self, path: &std::path::Path) -> SettingsResult<()> {
        self.config.save_to_file(path)
    }

    /// Save settings to the platform config path.
    pub fn save(&self) -> SettingsResult<()> {
        Self::ensure_config_dir()?;
        self.save_to_file(&Self::config_file_path()?)
    }

    /// Get reference to config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

//! CartoFrame Settings Crate
//!
//! Handles application configuration and settings persistence. The engine
//! reads its construction-time [`cartoframe_core::EngineConfig`] from here;
//! values are validated and clamped before they reach the viewport.

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{Config, ViewportSettings};
pub use error::{SettingsError, SettingsResult};
pub use persistence::SettingsPersistence;

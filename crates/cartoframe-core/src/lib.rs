//! # CartoFrame Core
//!
//! Core types, events, and utilities for CartoFrame.
//! Provides the geometry value types shared by the viewport engine,
//! the unified error taxonomy, the application event bus, and the
//! engine's default constants.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod geom;

pub use error::{BufferError, Error, ProjectionError, RenderError, Result};

pub use geom::{CrsDescriptor, Extent, GeoPoint, PixelRect, PixelSize};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, init_event_bus, AppEvent, BufferEvent, EventBus, EventBusConfig, EventCategory,
    EventFilter, LayerEvent, LayerId, ProjectionEvent, SubscriptionId, ViewportEvent,
};

pub use constants::EngineConfig;

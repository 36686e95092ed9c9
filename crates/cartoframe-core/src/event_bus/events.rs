//! Event type definitions for the event bus.
//!
//! This module defines the engine's events organized by category.
//! Events are designed to be cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

use crate::geom::{CrsDescriptor, Extent, PixelRect, PixelSize};

/// Identifier of a layer inside a layer collection.
pub type LayerId = u64;

/// Root event enum for all engine events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// View and extent navigation
    Viewport(ViewportEvent),
    /// Back/front buffer lifecycle
    Buffer(BufferEvent),
    /// Layer collection structure
    Layers(LayerEvent),
    /// Coordinate-system resolution
    Projection(ProjectionEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Viewport(_) => EventCategory::Viewport,
            AppEvent::Buffer(_) => EventCategory::Buffer,
            AppEvent::Layers(_) => EventCategory::Layers,
            AppEvent::Projection(_) => EventCategory::Projection,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Viewport(e) => e.description(),
            AppEvent::Buffer(e) => e.description(),
            AppEvent::Layers(e) => e.description(),
            AppEvent::Projection(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// View and extent navigation events.
    Viewport,
    /// Buffer lifecycle events.
    Buffer,
    /// Layer collection events.
    Layers,
    /// Projection resolution events.
    Projection,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Viewport => write!(f, "Viewport"),
            EventCategory::Buffer => write!(f, "Buffer"),
            EventCategory::Layers => write!(f, "Layers"),
            EventCategory::Projection => write!(f, "Projection"),
        }
    }
}

/// View and extent navigation events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewportEvent {
    /// The geographic extent changed (pan, zoom, explicit assignment).
    ExtentChanged {
        /// Extent before the change.
        old: Extent,
        /// Extent after the change.
        new: Extent,
    },
    /// The view rectangle into the back buffer changed.
    ViewChanged {
        /// View rectangle before the change.
        old: PixelRect,
        /// View rectangle after the change.
        new: PixelRect,
    },
    /// The host client area was resized and the view was reconciled.
    Resized {
        /// New host client size.
        client: PixelSize,
    },
}

impl ViewportEvent {
    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            ViewportEvent::ExtentChanged { new, .. } => {
                format!("Extent changed to {:.3}x{:.3}", new.width(), new.height())
            }
            ViewportEvent::ViewChanged { new, .. } => {
                format!("View changed to {}x{}", new.width, new.height)
            }
            ViewportEvent::Resized { client } => {
                format!("Resized to {}x{}", client.width, client.height)
            }
        }
    }
}

/// Buffer lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BufferEvent {
    /// A back buffer finished (part of) a render pass and was committed.
    BufferChanged {
        /// Pixel rectangles actually touched by the pass.
        touched: Vec<PixelRect>,
    },
    /// The front buffer was blitted to the host surface.
    ScreenUpdated,
    /// The buffer was reallocated to a new size.
    BufferResized {
        /// New buffer size in pixels.
        size: PixelSize,
    },
}

impl BufferEvent {
    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            BufferEvent::BufferChanged { touched } => {
                format!("Buffer changed ({} regions)", touched.len())
            }
            BufferEvent::ScreenUpdated => "Screen updated".to_string(),
            BufferEvent::BufferResized { size } => {
                format!("Buffer resized to {}x{}", size.width, size.height)
            }
        }
    }
}

/// Layer collection structural events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LayerEvent {
    /// A layer was added to the collection.
    Added {
        /// Identifier of the added layer.
        id: LayerId,
        /// Display name of the added layer.
        name: String,
    },
    /// A layer was removed from the collection.
    Removed {
        /// Identifier of the removed layer.
        id: LayerId,
    },
    /// A layer's visibility flag changed.
    VisibilityChanged {
        /// Identifier of the layer.
        id: LayerId,
        /// New visibility.
        visible: bool,
    },
    /// A layer moved to a new z-order position.
    Reordered {
        /// Identifier of the layer.
        id: LayerId,
        /// New position in the z-stack (0 = bottom).
        position: usize,
    },
}

impl LayerEvent {
    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            LayerEvent::Added { id, name } => format!("Layer {} '{}' added", id, name),
            LayerEvent::Removed { id } => format!("Layer {} removed", id),
            LayerEvent::VisibilityChanged { id, visible } => {
                format!("Layer {} visibility: {}", id, visible)
            }
            LayerEvent::Reordered { id, position } => {
                format!("Layer {} moved to position {}", id, position)
            }
        }
    }
}

/// Projection resolution events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProjectionEvent {
    /// The map adopted a projection (first layer wins).
    Adopted {
        /// The adopted coordinate system.
        crs: CrsDescriptor,
    },
    /// A previously undefined layer was assigned a coordinate system.
    Assigned {
        /// Identifier of the layer.
        id: LayerId,
        /// The assigned coordinate system.
        crs: CrsDescriptor,
    },
    /// A mismatched layer was reprojected into the map projection.
    Reprojected {
        /// Identifier of the layer.
        id: LayerId,
        /// Coordinate system before reprojection.
        from: CrsDescriptor,
        /// Coordinate system after reprojection.
        to: CrsDescriptor,
    },
    /// The user declined to define or reproject; the layer stays as-is.
    Declined {
        /// Identifier of the layer.
        id: LayerId,
    },
}

impl ProjectionEvent {
    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            ProjectionEvent::Adopted { crs } => format!("Map adopted projection {}", crs),
            ProjectionEvent::Assigned { id, crs } => {
                format!("Layer {} assigned projection {}", id, crs)
            }
            ProjectionEvent::Reprojected { id, to, .. } => {
                format!("Layer {} reprojected to {}", id, to)
            }
            ProjectionEvent::Declined { id } => {
                format!("Projection resolution declined for layer {}", id)
            }
        }
    }
}

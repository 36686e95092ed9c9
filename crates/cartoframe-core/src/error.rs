//! Error handling for CartoFrame
//!
//! Provides error types for the layers of the viewport engine:
//! - Buffer errors (raster allocation and sizing)
//! - Render errors (draw-pass orchestration)
//! - Projection errors (layer coordinate-system resolution)
//!
//! All error types use `thiserror` for ergonomic error handling. Degenerate
//! geometry (zero-size extents, views, or client rectangles) is deliberately
//! not an error anywhere in the engine: those paths early-return instead.

use thiserror::Error;

/// Buffer error type
///
/// Represents failures while allocating or resizing the raster back/front
/// buffers. A failure here is fatal to the current render cycle but never
/// invalidates the previously committed front buffer.
#[derive(Error, Debug, Clone)]
pub enum BufferError {
    /// Raster surface allocation failed
    #[error("Buffer allocation failed for {width}x{height} pixels")]
    AllocationFailed {
        /// Requested buffer width in pixels.
        width: u32,
        /// Requested buffer height in pixels.
        height: u32,
    },

    /// Requested buffer dimensions collapse to zero even after flooring
    #[error("Degenerate buffer size {width}x{height}")]
    DegenerateSize {
        /// Requested buffer width in pixels.
        width: u32,
        /// Requested buffer height in pixels.
        height: u32,
    },
}

/// Render error type
///
/// Represents failures during a chunked render pass. Per-layer draw
/// failures are isolated by the renderer (logged and skipped) and only
/// surface here when the whole pass cannot proceed.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    /// A layer's draw call failed
    #[error("Layer '{layer}' failed to draw: {reason}")]
    LayerDrawFailed {
        /// Name of the layer that failed.
        layer: String,
        /// Description of the failure.
        reason: String,
    },

    /// Render was requested without a back buffer and one could not be made
    #[error("No back buffer available")]
    NoBackBuffer,

    /// The host cancelled an in-progress chunked draw
    #[error("Render cancelled between draw batches")]
    Cancelled,
}

/// Projection error type
///
/// Represents failures while resolving a newly added layer's coordinate
/// system against the map's projection.
#[derive(Error, Debug, Clone)]
pub enum ProjectionError {
    /// Layer projection differs from the map projection
    #[error("Layer '{layer}' projection mismatch: map is {expected}, layer is {actual}")]
    Mismatch {
        /// Name of the mismatched layer.
        layer: String,
        /// The map's coordinate-system descriptor.
        expected: String,
        /// The layer's coordinate-system descriptor.
        actual: String,
    },

    /// The projection service failed to reproject the layer's geometry
    #[error("Reprojection of layer '{layer}' failed: {reason}")]
    ReprojectFailed {
        /// Name of the layer being reprojected.
        layer: String,
        /// Description of the failure.
        reason: String,
    },

    /// The layer carries no coordinate system and none could be assigned
    #[error("Layer '{layer}' has no defined coordinate system")]
    Undefined {
        /// Name of the undefined layer.
        layer: String,
    },
}

/// Main error type for CartoFrame
///
/// A unified error type that can represent any error from all layers of the
/// engine. This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer error
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Projection error
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a buffer error
    pub fn is_buffer_error(&self) -> bool {
        matches!(self, Error::Buffer(_))
    }

    /// Check if this is a render error
    pub fn is_render_error(&self) -> bool {
        matches!(self, Error::Render(_))
    }

    /// Check if the render pass was cancelled by the host
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Render(RenderError::Cancelled))
    }

    /// Check if this is a projection error
    pub fn is_projection_error(&self) -> bool {
        matches!(self, Error::Projection(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

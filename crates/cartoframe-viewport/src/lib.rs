//! # CartoFrame Viewport
//!
//! The viewport/buffered-rendering engine behind the CartoFrame map
//! display. It owns the mapping between geographic and pixel coordinates,
//! a raster back buffer deliberately larger than the visible window for
//! fast panning, bounded view-history stacks for zoom navigation, and
//! chunked, clip-scoped redraws across a stack of layers with a two-pass
//! (normal, then selected) compositing order.
//!
//! ## Architecture
//!
//! ```text
//! ViewportController (facade)
//!   ├── CoordinateTransform (world <-> buffer pixels)
//!   ├── BufferManager (front/back Pixmap ownership)
//!   ├── ViewHistory (bounded previous/next extent stacks)
//!   ├── LayerCollection (ordered z-stack of MapLayers)
//!   ├── ChunkedRenderer (clip-scoped two-pass compositor)
//!   └── ReprojectionPolicy (on-add coordinate-system resolution)
//! ```
//!
//! The engine is single-threaded and cooperative: everything runs on the
//! thread that owns the host surface. The only yield point is the
//! batch-yield hook between feature chunks during large layer draws; a
//! pathologically large single batch blocks the thread, which is an
//! accepted and documented limitation rather than a silent failure.

pub mod buffer;
pub mod collection;
pub mod controller;
pub mod history;
pub mod host;
pub mod layer;
pub mod renderer;
pub mod reproject;
pub mod transform;

pub use buffer::BufferManager;
pub use collection::LayerCollection;
pub use controller::ViewportController;
pub use history::{BoundedExtentStack, ViewHistory};
pub use host::{HostSurface, OffscreenSurface};
pub use layer::{
    BatchControl, DrawContext, DrawPass, LabelPainter, LabelStyle, LayerKind, LayerStyle,
    LineFeature, MapLayer, PlacardPainter, PlacedLabels, PointFeature, PolygonFeature,
    RasterPatch, RenderObserver,
};
pub use renderer::ChunkedRenderer;
pub use reproject::{
    resolve_on_add, ActionMode, PassthroughProjection, ProjectionPrompt, ProjectionService,
    PromptAnswer, ReprojectionPolicy, SilentPrompt,
};
pub use transform::CoordinateTransform;

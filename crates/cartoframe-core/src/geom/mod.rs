//! Geometry value types shared across the engine.
//!
//! All types here are immutable values: transform operations produce new
//! values rather than mutating in place.

mod extent;
mod pixel;

pub use extent::{Extent, GeoPoint};
pub use pixel::{PixelRect, PixelSize};

use serde::{Deserialize, Serialize};

/// Opaque coordinate-system descriptor.
///
/// The engine never interprets the contents; equality and reprojection are
/// delegated to the projection service collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrsDescriptor(pub String);

impl CrsDescriptor {
    /// Creates a descriptor from any string-like identifier (WKT, EPSG code,
    /// proj string).
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self(descriptor.into())
    }
}

impl std::fmt::Display for CrsDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

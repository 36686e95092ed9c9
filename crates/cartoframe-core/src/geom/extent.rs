//! Geographic extent and point types.

use serde::{Deserialize, Serialize};

/// A point in world (geographic) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    /// Creates a new geographic point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned geographic bounding box in world coordinates.
///
/// Invariant: `max_x >= min_x` and `max_y >= min_y`; the constructor
/// normalizes swapped corners. A zero-area extent (a single point) is a
/// valid value and is handled explicitly by callers that divide by the
/// span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Creates an extent from two corners, normalizing min/max ordering.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Creates an extent from a center point and spans.
    pub fn from_center(center: GeoPoint, width: f64, height: f64) -> Self {
        let w = width.abs();
        let h = height.abs();
        Self::new(
            center.x - w / 2.0,
            center.y - h / 2.0,
            center.x + w / 2.0,
            center.y + h / 2.0,
        )
    }

    /// Horizontal span in world units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Vertical span in world units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center point of the extent.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when both spans are zero (a single point).
    pub fn is_point(&self) -> bool {
        self.width() == 0.0 && self.height() == 0.0
    }

    /// True when either span is zero. Callers that divide by a span must
    /// check this first.
    pub fn has_zero_span(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Width divided by height, or 0.0 for a zero-height extent.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height() == 0.0 {
            0.0
        } else {
            self.width() / self.height()
        }
    }

    /// Returns true when this extent overlaps `other` (shared edges count).
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Returns true when the point lies inside or on the boundary.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Smallest extent covering both `self` and `other`.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// New extent translated by world-unit deltas.
    pub fn translated(&self, dx: f64, dy: f64) -> Extent {
        Extent {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// New extent with both spans multiplied by `factor`, keeping the
    /// center fixed. A factor of 0.5 is a 2x zoom in.
    pub fn scaled_about_center(&self, factor: f64) -> Extent {
        let factor = factor.abs();
        Self::from_center(self.center(), self.width() * factor, self.height() * factor)
    }

    /// New extent with both spans grown by `fraction` of themselves on each
    /// side (auto-fit padding).
    pub fn padded(&self, fraction: f64) -> Extent {
        let dx = self.width() * fraction;
        let dy = self.height() * fraction;
        Extent {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Expands whichever axis is proportionally narrower than
    /// `target_aspect` (width / height), keeping the center fixed, so the
    /// original content is padded rather than cropped.
    ///
    /// Degenerate inputs pass through unchanged: a non-positive target
    /// aspect or an extent with a zero span on the axis that would be used
    /// for the computation.
    pub fn expanded_to_aspect(&self, target_aspect: f64) -> Extent {
        if target_aspect <= 0.0 || self.is_point() {
            return *self;
        }
        if self.height() == 0.0 {
            // Width-only extent: synthesize height from the target aspect.
            return Self::from_center(self.center(), self.width(), self.width() / target_aspect);
        }
        if self.width() == 0.0 {
            return Self::from_center(self.center(), self.height() * target_aspect, self.height());
        }
        let aspect = self.width() / self.height();
        if aspect < target_aspect {
            // Relatively too narrow: grow width, keep height and vertical
            // center fixed.
            Self::from_center(self.center(), self.height() * target_aspect, self.height())
        } else if aspect > target_aspect {
            Self::from_center(self.center(), self.width(), self.width() / target_aspect)
        } else {
            *self
        }
    }

    /// Approximate equality, tolerant of accumulated rounding from repeated
    /// transforms. The tolerance scales with the extent span so that tiny
    /// look-alike extents compare equal.
    pub fn approx_eq(&self, other: &Extent) -> bool {
        let scale = self
            .width()
            .abs()
            .max(self.height().abs())
            .max(other.width().abs())
            .max(other.height().abs())
            .max(1.0);
        let eps = scale * 1e-9;
        (self.min_x - other.min_x).abs() <= eps
            && (self.min_y - other.min_y).abs() <= eps
            && (self.max_x - other.max_x).abs() <= eps
            && (self.max_y - other.max_y).abs() <= eps
    }
}

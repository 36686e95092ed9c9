//! Coordinate transformation between geographic and buffer-pixel space.
//!
//! Handles conversion between world coordinates (geographic extents) and
//! pixel coordinates on a raster surface. Only axis-aligned scale and
//! translate are supported; there is no rotation.

use cartoframe_core::{Extent, GeoPoint, PixelRect, PixelSize};

/// Bidirectional mapping between a geographic extent and a pixel surface.
///
/// All operations are pure and never panic: degenerate inputs (a zero
/// extent span or a zero pixel dimension) yield the origin point rather
/// than dividing by zero. Callers that need to distinguish the degenerate
/// case check [`CoordinateTransform::is_degenerate`] themselves.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransform {
    extent: Extent,
    surface: PixelSize,
}

impl CoordinateTransform {
    /// Creates a transform mapping `extent` onto a surface of `surface`
    /// pixels.
    pub fn new(extent: Extent, surface: PixelSize) -> Self {
        Self { extent, surface }
    }

    /// The geographic extent this transform maps from.
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// The pixel surface this transform maps onto.
    pub fn surface(&self) -> PixelSize {
        self.surface
    }

    /// True when any division the transform performs would be by zero.
    pub fn is_degenerate(&self) -> bool {
        self.extent.has_zero_span() || self.surface.is_empty()
    }

    /// Pixels per world unit along X (0.0 when degenerate).
    pub fn scale_x(&self) -> f64 {
        if self.extent.width() == 0.0 {
            0.0
        } else {
            f64::from(self.surface.width) / self.extent.width()
        }
    }

    /// Pixels per world unit along Y (0.0 when degenerate).
    pub fn scale_y(&self) -> f64 {
        if self.extent.height() == 0.0 {
            0.0
        } else {
            f64::from(self.surface.height) / self.extent.height()
        }
    }

    /// Converts world coordinates to pixel coordinates.
    ///
    /// Pixel space has its origin at the top-left with +Y going down;
    /// world space is bottom-left oriented with +Y going up, so Y is
    /// flipped:
    ///
    /// ```text
    /// px = (x - min_x) * width / extent_width
    /// py = (max_y - y) * height / extent_height
    /// ```
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        if self.is_degenerate() {
            return (0.0, 0.0);
        }
        let px = (x - self.extent.min_x) * f64::from(self.surface.width) / self.extent.width();
        let py = (self.extent.max_y - y) * f64::from(self.surface.height) / self.extent.height();
        (px, py)
    }

    /// Converts pixel coordinates back to world coordinates. Exact
    /// algebraic inverse of [`CoordinateTransform::geo_to_pixel`].
    pub fn pixel_to_geo(&self, px: f64, py: f64) -> GeoPoint {
        if self.is_degenerate() {
            return GeoPoint::new(0.0, 0.0);
        }
        let x = self.extent.min_x + px * self.extent.width() / f64::from(self.surface.width);
        let y = self.extent.max_y - py * self.extent.height() / f64::from(self.surface.height);
        GeoPoint::new(x, y)
    }

    /// Transforms a geographic extent into the covering pixel rectangle.
    ///
    /// Corners are transformed independently (axis-aligned scale +
    /// translate only) and the result is grown outward to whole pixels so
    /// the rectangle always covers the extent.
    pub fn extent_to_rect(&self, e: &Extent) -> PixelRect {
        if self.is_degenerate() {
            return PixelRect::default();
        }
        let (left, top) = self.geo_to_pixel(e.min_x, e.max_y);
        let (right, bottom) = self.geo_to_pixel(e.max_x, e.min_y);
        let x = left.floor();
        let y = top.floor();
        let w = (right.ceil() - x).max(0.0);
        let h = (bottom.ceil() - y).max(0.0);
        PixelRect::new(x as i32, y as i32, w as u32, h as u32)
    }

    /// Transforms a pixel rectangle back to the geographic extent it
    /// covers.
    pub fn rect_to_extent(&self, r: &PixelRect) -> Extent {
        let tl = self.pixel_to_geo(f64::from(r.x), f64::from(r.y));
        let br = self.pixel_to_geo(f64::from(r.right()), f64::from(r.bottom()));
        Extent::new(tl.x, br.y, br.x, tl.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mapping() {
        // Extent (0,0,100,100) on a 200x100 surface: (50,50) -> (100,50).
        let t = CoordinateTransform::new(
            Extent::new(0.0, 0.0, 100.0, 100.0),
            PixelSize::new(200, 100),
        );
        assert_eq!(t.geo_to_pixel(50.0, 50.0), (100.0, 50.0));
        // Top-left of the extent is pixel origin.
        assert_eq!(t.geo_to_pixel(0.0, 100.0), (0.0, 0.0));
        // Bottom-right of the extent is the far pixel corner.
        assert_eq!(t.geo_to_pixel(100.0, 0.0), (200.0, 100.0));
    }

    #[test]
    fn test_round_trip() {
        let t = CoordinateTransform::new(
            Extent::new(-30.0, 10.0, 70.0, 60.0),
            PixelSize::new(640, 480),
        );
        let (px, py) = t.geo_to_pixel(12.5, 42.0);
        let p = t.pixel_to_geo(px, py);
        assert!((p.x - 12.5).abs() < 1e-9);
        assert!((p.y - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_extent_yields_origin() {
        let t = CoordinateTransform::new(
            Extent::new(5.0, 5.0, 5.0, 5.0),
            PixelSize::new(100, 100),
        );
        assert!(t.is_degenerate());
        assert_eq!(t.geo_to_pixel(5.0, 5.0), (0.0, 0.0));
        assert_eq!(t.pixel_to_geo(50.0, 50.0), GeoPoint::new(0.0, 0.0));
        assert_eq!(t.extent_to_rect(&Extent::new(0.0, 0.0, 1.0, 1.0)), PixelRect::default());
    }

    #[test]
    fn test_degenerate_surface_yields_origin() {
        let t = CoordinateTransform::new(
            Extent::new(0.0, 0.0, 10.0, 10.0),
            PixelSize::new(0, 100),
        );
        assert!(t.is_degenerate());
        assert_eq!(t.geo_to_pixel(3.0, 4.0), (0.0, 0.0));
    }

    #[test]
    fn test_extent_to_rect_covers() {
        let t = CoordinateTransform::new(
            Extent::new(0.0, 0.0, 100.0, 100.0),
            PixelSize::new(100, 100),
        );
        let r = t.extent_to_rect(&Extent::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(r, PixelRect::new(10, 80, 10, 10));
    }

    #[test]
    fn test_rect_to_extent_inverse() {
        let t = CoordinateTransform::new(
            Extent::new(0.0, 0.0, 100.0, 100.0),
            PixelSize::new(100, 100),
        );
        let e = t.rect_to_extent(&PixelRect::new(10, 80, 10, 10));
        assert!(e.approx_eq(&Extent::new(10.0, 10.0, 20.0, 20.0)));
    }
}

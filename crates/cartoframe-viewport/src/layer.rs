//! Layer model and draw contract.
//!
//! Layers are a closed set of tagged variants (point, line, polygon,
//! raster, group) dispatched through a single draw interface so the
//! renderer can treat them uniformly for ordering and clipping. Each layer
//! draws in two passes: the normal pass paints unselected features, the
//! selected pass paints only the selection so highlights always composite
//! above normal content regardless of layer order.
//!
//! Large layers honor the chunking contract: a pass touching more features
//! than the configured batch size splits into successive batches and
//! yields to the render observer between them, keeping the redraw
//! visually incremental and interruptible.

use std::collections::HashSet;

use cartoframe_core::{CrsDescriptor, Extent, GeoPoint, LayerId, PixelRect, PixelSize, RenderError};
use tiny_skia::{
    Color, FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};
use tracing::trace;

use crate::transform::CoordinateTransform;

/// Which compositing pass a draw call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPass {
    /// Unselected representation, painted first in z-order.
    Normal,
    /// Selected features only, painted above all normal content.
    Selected,
}

/// Decision returned by the batch-yield hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchControl {
    /// Keep drawing the next batch.
    Continue,
    /// Abandon the render pass; the back buffer is discarded uncommitted.
    Cancel,
}

/// Observer of an in-progress render pass.
///
/// `on_batch` is invoked between feature batches of a large layer draw so
/// the host can pump its event queue, surface incremental progress, or
/// cancel a superseded redraw.
pub trait RenderObserver {
    /// Called after each completed batch except the last of a layer.
    fn on_batch(&mut self, layer: LayerId, features_drawn: usize) -> BatchControl {
        let _ = (layer, features_drawn);
        BatchControl::Continue
    }
}

/// Observer that never interrupts.
impl RenderObserver for () {}

/// Everything a layer needs to paint itself into the back buffer.
///
/// Handed to layers per draw call; layers must not retain any of it past
/// the call.
pub struct DrawContext<'a> {
    /// The back buffer being painted.
    pub pixmap: &'a mut Pixmap,
    /// Clip mask covering the invalidated regions, if any.
    pub mask: Option<&'a Mask>,
    /// World-to-buffer-pixel transform for path drawing.
    pub world: Transform,
    /// The same mapping in pure form, for pixel-space work.
    pub to_px: &'a CoordinateTransform,
    /// The extent currently shown in the view.
    pub extent: &'a Extent,
    /// Feature count per batch before yielding.
    pub batch_size: usize,
    /// Batch-yield hook.
    pub observer: &'a mut dyn RenderObserver,
}

/// Symbolizer colors and widths for a layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerStyle {
    /// Fill color for polygons and point markers.
    pub fill: Color,
    /// Stroke color for lines and outlines.
    pub stroke: Color,
    /// Stroke width in screen pixels.
    pub stroke_width: f32,
    /// Highlight color used by the selected pass.
    pub selection: Color,
    /// Point marker radius in screen pixels.
    pub point_radius: f32,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            fill: Color::from_rgba8(52, 152, 219, 255),
            stroke: Color::from_rgba8(41, 128, 185, 255),
            stroke_width: 1.0,
            selection: Color::from_rgba8(255, 235, 59, 255),
            point_radius: 3.0,
        }
    }
}

/// Label configuration for a layer.
#[derive(Debug, Clone, Copy)]
pub struct LabelStyle {
    /// Whether the label pass includes this layer.
    pub enabled: bool,
    /// Label color.
    pub color: Color,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::from_rgba8(33, 33, 33, 255),
        }
    }
}

/// Paints label text. The engine orchestrates placement and deduplication;
/// the actual glyph rendering is the host's concern, supplied through this
/// trait.
pub trait LabelPainter {
    /// Approximate pixel footprint of a label string.
    fn measure(&self, text: &str) -> PixelSize {
        PixelSize::new(text.chars().count() as u32 * 7, 12)
    }

    /// Paints a label whose top-left anchor is at `anchor` buffer pixels.
    fn draw_label(
        &mut self,
        pixmap: &mut Pixmap,
        mask: Option<&Mask>,
        anchor: (f32, f32),
        text: &str,
        color: Color,
    );
}

/// Fallback painter that fills the measured label footprint with a
/// translucent placard. Hosts with a real text stack substitute their own
/// painter.
#[derive(Debug, Default)]
pub struct PlacardPainter;

impl LabelPainter for PlacardPainter {
    fn draw_label(
        &mut self,
        pixmap: &mut Pixmap,
        mask: Option<&Mask>,
        anchor: (f32, f32),
        text: &str,
        color: Color,
    ) {
        let size = self.measure(text);
        let Some(rect) = Rect::from_xywh(anchor.0, anchor.1, size.width as f32, size.height as f32)
        else {
            return;
        };
        let mut paint = Paint::default();
        let mut c = color;
        c.set_alpha(0.6);
        paint.set_color(c);
        pixmap.fill_rect(rect, &paint, Transform::identity(), mask);
    }
}

/// Registry of label rectangles already placed during the current label
/// pass. Cleared at the start of every pass so labels never double-stack
/// between calls.
#[derive(Debug, Default)]
pub struct PlacedLabels {
    rects: Vec<PixelRect>,
}

impl PlacedLabels {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `rect` unless it overlaps an already placed label.
    /// Returns whether the label may be drawn.
    pub fn try_place(&mut self, rect: PixelRect) -> bool {
        if rect.is_empty() {
            return false;
        }
        if self.rects.iter().any(|r| r.intersect(&rect).is_some()) {
            return false;
        }
        self.rects.push(rect);
        true
    }

    /// Drops all placements.
    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Number of labels placed so far.
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// True when nothing has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// A point feature with an optional label.
#[derive(Debug, Clone)]
pub struct PointFeature {
    pub position: GeoPoint,
    pub label: Option<String>,
}

impl PointFeature {
    /// Creates an unlabeled point feature.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: GeoPoint::new(x, y),
            label: None,
        }
    }
}

/// A polyline feature with an optional label.
#[derive(Debug, Clone)]
pub struct LineFeature {
    pub vertices: Vec<GeoPoint>,
    pub label: Option<String>,
}

/// A single-ring polygon feature with an optional label.
#[derive(Debug, Clone)]
pub struct PolygonFeature {
    pub ring: Vec<GeoPoint>,
    pub label: Option<String>,
}

/// A georeferenced raster patch.
#[derive(Debug, Clone)]
pub struct RasterPatch {
    /// The raster pixels.
    pub pixmap: Pixmap,
    /// The geographic footprint of the raster.
    pub extent: Extent,
}

/// The closed set of drawable layer variants.
#[derive(Debug, Clone)]
pub enum LayerKind {
    /// Point features drawn as fixed-pixel-radius markers.
    Point(Vec<PointFeature>),
    /// Polyline features drawn as strokes.
    Line(Vec<LineFeature>),
    /// Polygon features drawn filled with an outline.
    Polygon(Vec<PolygonFeature>),
    /// A georeferenced raster blitted through the transform.
    Raster(RasterPatch),
    /// Nested layers drawn in child z-order.
    Group(Vec<MapLayer>),
}

/// A drawable layer in the map's z-stack.
#[derive(Debug, Clone)]
pub struct MapLayer {
    /// Identifier assigned by the owning collection (0 = unassigned).
    pub id: LayerId,
    /// Display name.
    pub name: String,
    /// Visibility flag.
    pub visible: bool,
    /// Dynamic visibility: hide when the view extent is wider than this.
    pub max_visible_width: Option<f64>,
    /// Symbolizer configuration.
    pub style: LayerStyle,
    /// Label configuration.
    pub label_style: LabelStyle,
    /// Coordinate system, if defined.
    pub crs: Option<CrsDescriptor>,
    /// Indices of selected features.
    pub selected: HashSet<usize>,
    kind: LayerKind,
}

impl MapLayer {
    fn with_kind(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: 0,
            name: name.into(),
            visible: true,
            max_visible_width: None,
            style: LayerStyle::default(),
            label_style: LabelStyle::default(),
            crs: None,
            selected: HashSet::new(),
            kind,
        }
    }

    /// Creates a point layer.
    pub fn points(name: impl Into<String>, features: Vec<PointFeature>) -> Self {
        Self::with_kind(name, LayerKind::Point(features))
    }

    /// Creates a line layer.
    pub fn lines(name: impl Into<String>, features: Vec<LineFeature>) -> Self {
        Self::with_kind(name, LayerKind::Line(features))
    }

    /// Creates a polygon layer.
    pub fn polygons(name: impl Into<String>, features: Vec<PolygonFeature>) -> Self {
        Self::with_kind(name, LayerKind::Polygon(features))
    }

    /// Creates a raster layer.
    pub fn raster(name: impl Into<String>, patch: RasterPatch) -> Self {
        Self::with_kind(name, LayerKind::Raster(patch))
    }

    /// Creates a group layer drawing its children in order.
    pub fn group(name: impl Into<String>, children: Vec<MapLayer>) -> Self {
        Self::with_kind(name, LayerKind::Group(children))
    }

    /// The layer's variant.
    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    /// Mutable access to the layer's variant.
    pub fn kind_mut(&mut self) -> &mut LayerKind {
        &mut self.kind
    }

    /// Total feature count (children summed for groups, 1 for rasters).
    pub fn feature_count(&self) -> usize {
        match &self.kind {
            LayerKind::Point(f) => f.len(),
            LayerKind::Line(f) => f.len(),
            LayerKind::Polygon(f) => f.len(),
            LayerKind::Raster(_) => 1,
            LayerKind::Group(children) => children.iter().map(MapLayer::feature_count).sum(),
        }
    }

    /// Geographic bounds of the layer's content, if it has any.
    pub fn extent(&self) -> Option<Extent> {
        fn points_extent<'a>(points: impl Iterator<Item = &'a GeoPoint>) -> Option<Extent> {
            let mut acc: Option<Extent> = None;
            for p in points {
                let e = Extent::new(p.x, p.y, p.x, p.y);
                acc = Some(match acc {
                    Some(a) => a.union(&e),
                    None => e,
                });
            }
            acc
        }
        match &self.kind {
            LayerKind::Point(f) => points_extent(f.iter().map(|p| &p.position)),
            LayerKind::Line(f) => points_extent(f.iter().flat_map(|l| l.vertices.iter())),
            LayerKind::Polygon(f) => points_extent(f.iter().flat_map(|p| p.ring.iter())),
            LayerKind::Raster(patch) => Some(patch.extent),
            LayerKind::Group(children) => {
                let mut acc: Option<Extent> = None;
                for child in children {
                    if let Some(e) = child.extent() {
                        acc = Some(match acc {
                            Some(a) => a.union(&e),
                            None => e,
                        });
                    }
                }
                acc
            }
        }
    }

    /// Whether this layer should draw at the given view extent.
    ///
    /// Combines the visibility flag with the dynamic-visibility width
    /// threshold: a layer with `max_visible_width` set hides once the view
    /// is zoomed out wider than the threshold.
    pub fn is_visible_at(&self, extent: &Extent) -> bool {
        self.visible
            && self
                .max_visible_width
                .is_none_or(|max| extent.width() <= max)
    }

    /// Marks a feature as selected.
    pub fn select(&mut self, index: usize) {
        self.selected.insert(index);
    }

    /// Clears the feature selection.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Paints one compositing pass of this layer into the back buffer.
    ///
    /// Splits into batches of `ctx.batch_size` features and yields to
    /// `ctx.observer` between batches. Returns
    /// [`RenderError::Cancelled`] when the observer interrupts.
    pub fn draw(&self, ctx: &mut DrawContext<'_>, pass: DrawPass) -> Result<(), RenderError> {
        match &self.kind {
            LayerKind::Point(features) => self.draw_points(ctx, pass, features),
            LayerKind::Line(features) => self.draw_lines(ctx, pass, features),
            LayerKind::Polygon(features) => self.draw_polygons(ctx, pass, features),
            LayerKind::Raster(patch) => {
                // Rasters have no per-feature selection; they only paint in
                // the normal pass.
                if pass == DrawPass::Normal {
                    self.draw_raster(ctx, patch);
                }
                Ok(())
            }
            LayerKind::Group(children) => {
                for child in children {
                    if child.is_visible_at(ctx.extent) {
                        child.draw(ctx, pass)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// True when `index` belongs to the requested pass.
    fn in_pass(&self, index: usize, pass: DrawPass) -> bool {
        match pass {
            DrawPass::Normal => !self.selected.contains(&index),
            DrawPass::Selected => self.selected.contains(&index),
        }
    }

    fn pass_paint(&self, pass: DrawPass, fill: bool) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(match pass {
            DrawPass::Normal if fill => self.style.fill,
            DrawPass::Normal => self.style.stroke,
            DrawPass::Selected => self.style.selection,
        });
        paint
    }

    /// Yields between batches; maps a cancel decision to an error.
    fn yield_batch(
        &self,
        ctx: &mut DrawContext<'_>,
        drawn: usize,
        total: usize,
    ) -> Result<(), RenderError> {
        if drawn >= total {
            return Ok(());
        }
        trace!("Layer {} yielded after {}/{} features", self.id, drawn, total);
        match ctx.observer.on_batch(self.id, drawn) {
            BatchControl::Continue => Ok(()),
            BatchControl::Cancel => Err(RenderError::Cancelled),
        }
    }

    fn draw_points(
        &self,
        ctx: &mut DrawContext<'_>,
        pass: DrawPass,
        features: &[PointFeature],
    ) -> Result<(), RenderError> {
        let paint = self.pass_paint(pass, true);
        let radius = self.style.point_radius;
        let total = features.len();
        let mut drawn = 0;
        for chunk in features.chunks(ctx.batch_size.max(1)) {
            let base = drawn;
            let mut pb = PathBuilder::new();
            for (offset, feature) in chunk.iter().enumerate() {
                if !self.in_pass(base + offset, pass) {
                    continue;
                }
                let (px, py) = ctx
                    .to_px
                    .geo_to_pixel(feature.position.x, feature.position.y);
                // Markers keep a fixed pixel radius regardless of zoom, so
                // they are built in pixel space.
                pb.push_circle(px as f32, py as f32, radius);
            }
            if let Some(path) = pb.finish() {
                ctx.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), ctx.mask);
            }
            drawn += chunk.len();
            self.yield_batch(ctx, drawn, total)?;
        }
        Ok(())
    }

    fn draw_lines(
        &self,
        ctx: &mut DrawContext<'_>,
        pass: DrawPass,
        features: &[LineFeature],
    ) -> Result<(), RenderError> {
        let paint = self.pass_paint(pass, false);
        let stroke = self.world_stroke(ctx);
        let total = features.len();
        let mut drawn = 0;
        for chunk in features.chunks(ctx.batch_size.max(1)) {
            let base = drawn;
            let mut pb = PathBuilder::new();
            for (offset, feature) in chunk.iter().enumerate() {
                if !self.in_pass(base + offset, pass) {
                    continue;
                }
                let mut vertices = feature.vertices.iter();
                if let Some(first) = vertices.next() {
                    pb.move_to(first.x as f32, first.y as f32);
                    for v in vertices {
                        pb.line_to(v.x as f32, v.y as f32);
                    }
                }
            }
            if let Some(path) = pb.finish() {
                ctx.pixmap
                    .stroke_path(&path, &paint, &stroke, ctx.world, ctx.mask);
            }
            drawn += chunk.len();
            self.yield_batch(ctx, drawn, total)?;
        }
        Ok(())
    }

    fn draw_polygons(
        &self,
        ctx: &mut DrawContext<'_>,
        pass: DrawPass,
        features: &[PolygonFeature],
    ) -> Result<(), RenderError> {
        let fill_paint = self.pass_paint(pass, true);
        let stroke_paint = self.pass_paint(pass, false);
        let stroke = self.world_stroke(ctx);
        let total = features.len();
        let mut drawn = 0;
        for chunk in features.chunks(ctx.batch_size.max(1)) {
            let base = drawn;
            let mut pb = PathBuilder::new();
            for (offset, feature) in chunk.iter().enumerate() {
                if !self.in_pass(base + offset, pass) {
                    continue;
                }
                let mut vertices = feature.ring.iter();
                if let Some(first) = vertices.next() {
                    pb.move_to(first.x as f32, first.y as f32);
                    for v in vertices {
                        pb.line_to(v.x as f32, v.y as f32);
                    }
                    pb.close();
                }
            }
            if let Some(path) = pb.finish() {
                ctx.pixmap
                    .fill_path(&path, &fill_paint, FillRule::Winding, ctx.world, ctx.mask);
                ctx.pixmap
                    .stroke_path(&path, &stroke_paint, &stroke, ctx.world, ctx.mask);
            }
            drawn += chunk.len();
            self.yield_batch(ctx, drawn, total)?;
        }
        Ok(())
    }

    fn draw_raster(&self, ctx: &mut DrawContext<'_>, patch: &RasterPatch) {
        let dest = ctx.to_px.extent_to_rect(&patch.extent);
        if dest.is_empty() || patch.pixmap.width() == 0 || patch.pixmap.height() == 0 {
            return;
        }
        let sx = dest.width as f32 / patch.pixmap.width() as f32;
        let sy = dest.height as f32 / patch.pixmap.height() as f32;
        let transform =
            Transform::from_scale(sx, sy).post_translate(dest.x as f32, dest.y as f32);
        ctx.pixmap.draw_pixmap(
            0,
            0,
            patch.pixmap.as_ref(),
            &PixmapPaint::default(),
            transform,
            ctx.mask,
        );
    }

    /// Stroke whose width stays constant in screen pixels: the world-space
    /// width is the pixel width divided by the current scale.
    fn world_stroke(&self, ctx: &DrawContext<'_>) -> Stroke {
        let scale = ctx.to_px.scale_x() as f32;
        let width = if scale > 0.0 {
            self.style.stroke_width / scale
        } else {
            self.style.stroke_width
        };
        Stroke {
            width,
            ..Default::default()
        }
    }

    /// Paints this layer's labels, deduplicating against `placed`.
    pub fn draw_labels(
        &self,
        ctx: &mut DrawContext<'_>,
        painter: &mut dyn LabelPainter,
        placed: &mut PlacedLabels,
    ) -> Result<(), RenderError> {
        if let LayerKind::Group(children) = &self.kind {
            for child in children {
                if child.label_style.enabled && child.is_visible_at(ctx.extent) {
                    child.draw_labels(ctx, painter, placed)?;
                }
            }
            return Ok(());
        }
        if !self.label_style.enabled {
            return Ok(());
        }
        let color = self.label_style.color;
        for (anchor, text) in self.label_anchors() {
            let (px, py) = ctx.to_px.geo_to_pixel(anchor.x, anchor.y);
            let size = painter.measure(text);
            let rect = PixelRect::new(px as i32, py as i32, size.width, size.height);
            if placed.try_place(rect) {
                painter.draw_label(ctx.pixmap, ctx.mask, (px as f32, py as f32), text, color);
            }
        }
        Ok(())
    }

    /// Anchor point and text for every labeled feature.
    fn label_anchors(&self) -> Vec<(GeoPoint, &str)> {
        fn ring_center(ring: &[GeoPoint]) -> GeoPoint {
            if ring.is_empty() {
                return GeoPoint::new(0.0, 0.0);
            }
            let n = ring.len() as f64;
            GeoPoint::new(
                ring.iter().map(|p| p.x).sum::<f64>() / n,
                ring.iter().map(|p| p.y).sum::<f64>() / n,
            )
        }
        match &self.kind {
            LayerKind::Point(features) => features
                .iter()
                .filter_map(|f| f.label.as_deref().map(|l| (f.position, l)))
                .collect(),
            LayerKind::Line(features) => features
                .iter()
                .filter_map(|f| {
                    f.label
                        .as_deref()
                        .and_then(|l| f.vertices.get(f.vertices.len() / 2).map(|v| (*v, l)))
                })
                .collect(),
            LayerKind::Polygon(features) => features
                .iter()
                .filter_map(|f| f.label.as_deref().map(|l| (ring_center(&f.ring), l)))
                .collect(),
            LayerKind::Raster(_) | LayerKind::Group(_) => Vec::new(),
        }
    }
}

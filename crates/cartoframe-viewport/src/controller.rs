//! Viewport facade tying the engine together.
//!
//! The controller owns the current geographic extent, the buffer manager,
//! the view history, the layer stack, the renderer, and the reprojection
//! policy, and exposes the navigation surface hosts call: set-extent, pan,
//! zoom in/out, zoom to previous/next, zoom to layers, resize, and layer
//! management. Every extent change flows through one code path so history
//! recording, event emission, and redraw stay consistent.

use cartoframe_core::{
    constants::ZOOM_IN_FACTOR, emit, AppEvent, BufferEvent, CrsDescriptor, EngineConfig, Error,
    Extent, LayerEvent, LayerId, PixelRect, RenderError, Result, ViewportEvent,
};
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};
use tracing::{debug, warn};

use crate::buffer::BufferManager;
use crate::collection::LayerCollection;
use crate::history::ViewHistory;
use crate::host::HostSurface;
use crate::layer::{MapLayer, RenderObserver};
use crate::renderer::ChunkedRenderer;
use crate::reproject::{
    resolve_on_add, ProjectionPrompt, ProjectionService, ReprojectionPolicy,
};

/// The viewport engine facade.
pub struct ViewportController<H: HostSurface> {
    host: H,
    config: EngineConfig,
    extent: Extent,
    /// Extent latched by the first resize of a sequence, so repeated
    /// resizes reconcile against the original rather than compounding.
    original_extent: Option<Extent>,
    buffers: BufferManager,
    history: ViewHistory,
    layers: LayerCollection,
    renderer: ChunkedRenderer,
    policy: ReprojectionPolicy,
    projection: Option<CrsDescriptor>,
    session_projection: Option<CrsDescriptor>,
}

impl<H: HostSurface> ViewportController<H> {
    /// Creates a controller over the given host surface.
    ///
    /// The initial extent is a degenerate point, so nothing renders until
    /// the first [`ViewportController::set_extent`] or layer auto-fit.
    pub fn new(host: H, config: EngineConfig) -> Self {
        let client = host.client_size();
        let buffers = BufferManager::new(client, config.extend_buffer, config.effective_coefficient());
        Self {
            host,
            extent: Extent::new(0.0, 0.0, 0.0, 0.0),
            original_extent: None,
            buffers,
            history: ViewHistory::new(config.history_capacity),
            layers: LayerCollection::new(),
            renderer: ChunkedRenderer::new(config.draw_batch_size),
            policy: ReprojectionPolicy::default(),
            projection: None,
            session_projection: None,
            config,
        }
    }

    /// The extent currently shown.
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// The map's coordinate system, once one has been adopted.
    pub fn projection(&self) -> Option<&CrsDescriptor> {
        self.projection.as_ref()
    }

    /// The layer stack.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Mutable layer access. Content edits made through this do not
    /// trigger a redraw; call [`ViewportController::refresh`] afterwards.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// The buffer manager (front buffer, view rectangle, sizing).
    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    /// The host surface.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The renderer, for installing a label painter.
    pub fn renderer_mut(&mut self) -> &mut ChunkedRenderer {
        &mut self.renderer
    }

    /// The on-add projection policy.
    pub fn policy_mut(&mut self) -> &mut ReprojectionPolicy {
        &mut self.policy
    }

    fn background(&self) -> Color {
        let [r, g, b, a] = self.config.background_color;
        Color::from_rgba8(r, g, b, a)
    }

    /// Geographic extent covering the whole back buffer: the view extent
    /// grown outward by the buffer's margin around the view rectangle.
    fn buffer_extent(&self) -> Extent {
        let client = self.buffers.client_size();
        if client.is_empty() || self.extent.has_zero_span() {
            return self.extent;
        }
        let buffer = self.buffers.buffer_size();
        let (off_x, off_y) = if self.buffers.is_extended() {
            (f64::from(client.width), f64::from(client.height))
        } else {
            (0.0, 0.0)
        };
        let wpp_x = self.extent.width() / f64::from(client.width);
        let wpp_y = self.extent.height() / f64::from(client.height);
        let min_x = self.extent.min_x - off_x * wpp_x;
        let max_y = self.extent.max_y + off_y * wpp_y;
        Extent::new(
            min_x,
            max_y - f64::from(buffer.height) * wpp_y,
            min_x + f64::from(buffer.width) * wpp_x,
            max_y,
        )
    }

    /// Repaints the whole buffer from the layer stack.
    pub fn refresh(&mut self) -> Result<()> {
        self.refresh_with(&mut ())
    }

    /// Full repaint with a batch-yield observer attached.
    pub fn refresh_with(&mut self, observer: &mut dyn RenderObserver) -> Result<()> {
        let view_extent = self.extent;
        let buffer_extent = self.buffer_extent();
        let background = self.background();
        match self.renderer.render(
            &mut self.buffers,
            &self.layers,
            &view_extent,
            &buffer_extent,
            &[],
            background,
            observer,
        ) {
            Ok(touched) => {
                if !touched.is_empty() {
                    self.host.request_redraw();
                }
                Ok(())
            }
            // A cancelled pass was superseded, not failed.
            Err(e) if e.is_cancelled() => {
                debug!("Refresh cancelled");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Repaints only the given geographic regions, leaving the rest of the
    /// buffer untouched.
    pub fn invalidate_regions(&mut self, regions: &[Extent]) -> Result<()> {
        let view_extent = self.extent;
        let buffer_extent = self.buffer_extent();
        let background = self.background();
        match self.renderer.render(
            &mut self.buffers,
            &self.layers,
            &view_extent,
            &buffer_extent,
            regions,
            background,
            &mut (),
        ) {
            Ok(touched) => {
                if !touched.is_empty() {
                    self.host.request_redraw();
                }
                Ok(())
            }
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Single code path for extent changes: records history for fresh
    /// navigations, resets the resize latch, notifies, and repaints.
    ///
    /// Transitions away from a degenerate extent are never recorded, so
    /// zoom-to-previous cannot land on an empty view.
    fn apply_extent(&mut self, new: Extent, record: bool) -> Result<()> {
        let old = self.extent;
        if record && !old.is_point() {
            self.history.record_fresh(&old, &new);
        }
        // Any navigation invalidates the latched pre-resize extent.
        self.original_extent = None;
        self.extent = new;
        let _ = emit!(AppEvent::Viewport(ViewportEvent::ExtentChanged { old, new }));
        self.refresh()
    }

    /// Shows `extent`, reconciled to the client aspect ratio by growing the
    /// narrower axis. Records history.
    pub fn set_extent(&mut self, extent: Extent) -> Result<()> {
        let aspect = self.buffers.client_size().aspect_ratio();
        let reconciled = if aspect > 0.0 {
            extent.expanded_to_aspect(aspect)
        } else {
            extent
        };
        self.apply_extent(reconciled, true)
    }

    /// Pans by a screen-pixel delta: positive `dx` moves the view right,
    /// positive `dy` moves it down.
    ///
    /// With the extended buffer enabled and the shifted view rectangle
    /// still inside the committed buffer, the pan only moves the view
    /// window over pre-rendered pixels; no redraw happens.
    pub fn pan(&mut self, dx: i32, dy: i32) -> Result<()> {
        if self.extent.has_zero_span() || (dx == 0 && dy == 0) {
            return Ok(());
        }
        let client = self.buffers.client_size();
        if client.is_empty() {
            return Ok(());
        }
        let wpp_x = self.extent.width() / f64::from(client.width);
        let wpp_y = self.extent.height() / f64::from(client.height);
        // Screen +Y is down, world +Y is up.
        let new_extent = self
            .extent
            .translated(f64::from(dx) * wpp_x, -f64::from(dy) * wpp_y);

        let old_view = self.buffers.view_rect();
        let shifted = old_view.offset_by(dx, dy);
        let buffer_rect = PixelRect::from_size(self.buffers.buffer_size());
        let cheap = self.buffers.front().is_some()
            && self.buffers.is_extended()
            && buffer_rect.contains_rect(&shifted);

        if cheap {
            let old = self.extent;
            self.history.record_fresh(&old, &new_extent);
            self.original_extent = None;
            self.extent = new_extent;
            self.buffers.set_view_rect(shifted);
            debug!("Cheap pan to view rect {:?}", shifted);
            let _ = emit!(AppEvent::Viewport(ViewportEvent::ExtentChanged {
                old,
                new: new_extent,
            }));
            let _ = emit!(AppEvent::Viewport(ViewportEvent::ViewChanged {
                old: old_view,
                new: shifted,
            }));
            let _ = emit!(AppEvent::Buffer(BufferEvent::ScreenUpdated));
            self.host.request_redraw();
            Ok(())
        } else {
            self.apply_extent(new_extent, true)
        }
    }

    /// Zooms in one step about the extent center.
    pub fn zoom_in(&mut self) -> Result<()> {
        if self.extent.has_zero_span() {
            return Ok(());
        }
        let new = self.extent.scaled_about_center(ZOOM_IN_FACTOR);
        self.apply_extent(new, true)
    }

    /// Zooms out one step about the extent center. Exact inverse of
    /// [`ViewportController::zoom_in`].
    pub fn zoom_out(&mut self) -> Result<()> {
        if self.extent.has_zero_span() {
            return Ok(());
        }
        let new = self.extent.scaled_about_center(1.0 / ZOOM_IN_FACTOR);
        self.apply_extent(new, true)
    }

    /// Returns to the previous extent in the navigation history.
    pub fn zoom_to_previous(&mut self) -> Result<()> {
        match self.history.go_back(self.extent) {
            Some(restored) => self.apply_extent(restored, false),
            None => Ok(()),
        }
    }

    /// Moves forward again after a zoom-to-previous.
    pub fn zoom_to_next(&mut self) -> Result<()> {
        match self.history.go_forward(self.extent) {
            Some(restored) => self.apply_extent(restored, false),
            None => Ok(()),
        }
    }

    /// Whether zoom-to-previous has somewhere to go.
    pub fn can_zoom_to_previous(&self) -> bool {
        self.history.can_go_back()
    }

    /// Whether zoom-to-next has somewhere to go.
    pub fn can_zoom_to_next(&self) -> bool {
        self.history.can_go_forward()
    }

    /// Fits the view to the union of all layer extents, with a margin.
    pub fn zoom_to_layers(&mut self) -> Result<()> {
        let Some(bounds) = self.layers.extent() else {
            return Ok(());
        };
        let padded = bounds.padded(cartoframe_core::constants::AUTO_FIT_PADDING);
        let aspect = self.buffers.client_size().aspect_ratio();
        let fitted = if aspect > 0.0 {
            padded.expanded_to_aspect(aspect)
        } else {
            padded
        };
        self.apply_extent(fitted, true)
    }

    /// Adopts the host's current client size.
    ///
    /// The first resize of a sequence latches the pre-resize extent; each
    /// subsequent resize reconciles that original extent to the new aspect
    /// ratio, so dragging a window edge back and forth is lossless. Resize
    /// transitions are never recorded in history.
    pub fn resize(&mut self) -> Result<()> {
        let client = self.host.client_size();
        let old_view = self.buffers.view_rect();
        if !self.buffers.resize(client) {
            return Ok(());
        }
        let _ = emit!(AppEvent::Viewport(ViewportEvent::Resized { client }));
        let _ = emit!(AppEvent::Buffer(BufferEvent::BufferResized {
            size: self.buffers.buffer_size(),
        }));
        let new_view = self.buffers.view_rect();
        if new_view != old_view {
            let _ = emit!(AppEvent::Viewport(ViewportEvent::ViewChanged {
                old: old_view,
                new: new_view,
            }));
        }
        if self.extent.has_zero_span() {
            return Ok(());
        }
        let original = *self.original_extent.get_or_insert(self.extent);
        let aspect = client.aspect_ratio();
        if aspect <= 0.0 {
            return Ok(());
        }
        let old = self.extent;
        let new = original.expanded_to_aspect(aspect);
        self.extent = new;
        let _ = emit!(AppEvent::Viewport(ViewportEvent::ExtentChanged { old, new }));
        self.refresh()
    }

    /// Toggles the extended back buffer. Changing the policy forces a full
    /// repaint at the new buffer size.
    pub fn set_extend_buffer(&mut self, extend: bool) -> Result<()> {
        let old_view = self.buffers.view_rect();
        if self.buffers.set_extend_buffer(extend) {
            let _ = emit!(AppEvent::Buffer(BufferEvent::BufferResized {
                size: self.buffers.buffer_size(),
            }));
            let new_view = self.buffers.view_rect();
            if new_view != old_view {
                let _ = emit!(AppEvent::Viewport(ViewportEvent::ViewChanged {
                    old: old_view,
                    new: new_view,
                }));
            }
            self.refresh()
        } else {
            Ok(())
        }
    }

    /// Adds a layer on top of the stack, resolving its coordinate system
    /// against the map's per the reprojection policy.
    ///
    /// The first layer with content auto-fits the view; later additions
    /// repaint at the current extent.
    pub fn add_layer(
        &mut self,
        mut layer: MapLayer,
        svc: &dyn ProjectionService,
        prompt: &mut dyn ProjectionPrompt,
    ) -> Result<LayerId> {
        let existing = self.layers.len();
        if layer.id == 0 {
            layer.id = self.layers.allocate_id();
        }
        let events = resolve_on_add(
            &mut self.policy,
            &mut self.projection,
            &mut self.session_projection,
            existing,
            &mut layer,
            svc,
            prompt,
        );
        for event in events {
            debug!("{}", event.description());
            let _ = emit!(AppEvent::Projection(event));
        }

        let name = layer.name.clone();
        let id = self.layers.add(layer);
        let _ = emit!(AppEvent::Layers(LayerEvent::Added { id, name }));

        if self.extent.is_point() {
            self.zoom_to_layers()?;
        } else {
            self.refresh()?;
        }
        Ok(id)
    }

    /// Removes a layer and repaints.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<()> {
        if self.layers.remove(id).is_some() {
            let _ = emit!(AppEvent::Layers(LayerEvent::Removed { id }));
            self.refresh()?;
        }
        Ok(())
    }

    /// Sets a layer's visibility and repaints on change.
    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> Result<()> {
        if self.layers.set_visible(id, visible) {
            let _ = emit!(AppEvent::Layers(LayerEvent::VisibilityChanged { id, visible }));
            self.refresh()?;
        }
        Ok(())
    }

    /// Moves a layer to a new z-position and repaints on change.
    pub fn move_layer(&mut self, id: LayerId, position: usize) -> Result<()> {
        if self.layers.move_to(id, position) {
            let _ = emit!(AppEvent::Layers(LayerEvent::Reordered { id, position }));
            self.refresh()?;
        }
        Ok(())
    }

    /// Blits the view window of the front buffer into `dest`, which the
    /// host presents. `dest` is expected to be client-sized; `paint_clip`
    /// optionally restricts the blit to the host's dirty rectangle (in
    /// client pixel coordinates).
    pub fn draw_to(&self, dest: &mut Pixmap, paint_clip: Option<PixelRect>) -> Result<()> {
        let Some(front) = self.buffers.front() else {
            return Err(Error::Render(RenderError::NoBackBuffer));
        };
        let view = self.buffers.view_rect();
        let mask = paint_clip
            .and_then(|clip| crate::renderer::build_clip_mask(dest.width(), dest.height(), &[clip]));
        dest.draw_pixmap(
            -view.x,
            -view.y,
            front.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            mask.as_ref(),
        );
        let _ = emit!(AppEvent::Buffer(BufferEvent::ScreenUpdated));
        Ok(())
    }

    /// Releases the front buffer and clears history. The controller stays
    /// usable; the next refresh reallocates.
    pub fn dispose(&mut self) {
        self.buffers.clear();
        self.history.clear();
    }
}

impl<H: HostSurface> std::fmt::Debug for ViewportController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportController")
            .field("extent", &self.extent)
            .field("layers", &self.layers.len())
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::OffscreenSurface;
    use crate::layer::PointFeature;
    use crate::reproject::{PassthroughProjection, SilentPrompt};
    use cartoframe_core::PixelSize;

    fn controller(width: u32, height: u32) -> ViewportController<OffscreenSurface> {
        ViewportController::new(OffscreenSurface::new(width, height), EngineConfig::default())
    }

    fn unextended(width: u32, height: u32) -> ViewportController<OffscreenSurface> {
        let config = EngineConfig {
            extend_buffer: false,
            ..Default::default()
        };
        ViewportController::new(OffscreenSurface::new(width, height), config)
    }

    #[test]
    fn test_set_extent_reconciles_aspect() {
        let mut vp = unextended(200, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        // Client is 2:1, so the extent widens to 200 about its center.
        let e = *vp.extent();
        assert!((e.width() - 200.0).abs() < 1e-9);
        assert!((e.height() - 100.0).abs() < 1e-9);
        assert!((e.center().x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_round_trip_is_exact() {
        let mut vp = unextended(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let before = *vp.extent();
        vp.zoom_in().unwrap();
        assert!((vp.extent().width() - before.width() / 2.0).abs() < 1e-9);
        vp.zoom_out().unwrap();
        assert!(vp.extent().approx_eq(&before));
    }

    #[test]
    fn test_history_navigation() {
        let mut vp = unextended(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        vp.zoom_in().unwrap();
        let zoomed = *vp.extent();
        assert!(vp.can_zoom_to_previous());

        vp.zoom_to_previous().unwrap();
        assert!((vp.extent().width() - 100.0).abs() < 1e-9);
        assert!(vp.can_zoom_to_next());

        vp.zoom_to_next().unwrap();
        assert!(vp.extent().approx_eq(&zoomed));
    }

    #[test]
    fn test_fresh_navigation_clears_redo() {
        let mut vp = unextended(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        vp.zoom_in().unwrap();
        vp.zoom_to_previous().unwrap();
        assert!(vp.can_zoom_to_next());

        vp.pan(10, 0).unwrap();
        assert!(!vp.can_zoom_to_next());
    }

    #[test]
    fn test_pan_shifts_extent() {
        let mut vp = unextended(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        // 10 px right, 10 px down on a 100px/100unit view.
        vp.pan(10, 10).unwrap();
        let e = *vp.extent();
        assert!((e.min_x - 10.0).abs() < 1e-9);
        assert!((e.max_y - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_cheap_pan_moves_view_rect() {
        let mut vp = controller(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert!(vp.buffers().is_extended());
        assert!(vp.buffers().front().is_some());
        let before = vp.buffers().view_rect();

        vp.pan(20, 0).unwrap();
        let after = vp.buffers().view_rect();
        assert_eq!(after, before.offset_by(20, 0));
    }

    #[test]
    fn test_pan_past_buffer_edge_rerenders() {
        let mut vp = controller(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let canonical = vp.buffers().view_rect();

        // Larger than the one-client-size margin: forces a full render,
        // which re-centers the view rectangle.
        vp.pan(150, 0).unwrap();
        assert_eq!(vp.buffers().view_rect(), canonical);
        assert!((vp.extent().min_x - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_latches_original_extent() {
        let mut vp = ViewportController::new(
            OffscreenSurface::new(100, 100),
            EngineConfig {
                extend_buffer: false,
                ..Default::default()
            },
        );
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let original = *vp.extent();

        // Widen, then restore the original size: lossless reconciliation.
        vp.host().set_size(200, 100);
        vp.resize().unwrap();
        assert!((vp.extent().width() - 200.0).abs() < 1e-9);

        vp.host().set_size(100, 100);
        vp.resize().unwrap();
        assert!(vp.extent().approx_eq(&original));
        // None of it entered history.
        assert!(!vp.can_zoom_to_previous());
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut vp = unextended(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let before = *vp.extent();
        vp.resize().unwrap();
        assert!(vp.extent().approx_eq(&before));
    }

    #[test]
    fn test_first_layer_auto_fits() {
        let mut vp = unextended(100, 100);
        let layer = MapLayer::points(
            "cities",
            vec![PointFeature::new(0.0, 0.0), PointFeature::new(100.0, 100.0)],
        );
        vp.add_layer(layer, &PassthroughProjection, &mut SilentPrompt)
            .unwrap();
        let e = *vp.extent();
        assert!(e.width() > 100.0, "padded beyond the data extent");
        assert!(e.contains(cartoframe_core::GeoPoint::new(0.0, 0.0)));
        assert!(e.contains(cartoframe_core::GeoPoint::new(100.0, 100.0)));
        // The degenerate-to-fitted transition was not recorded.
        assert!(!vp.can_zoom_to_previous());
    }

    #[test]
    fn test_view_rect_changes_are_notified() {
        use cartoframe_core::{event_bus, EventFilter};
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Vec<(PixelRect, PixelRect)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = event_bus().subscribe(EventFilter::All, move |event| {
            if let AppEvent::Viewport(ViewportEvent::ViewChanged { old, new }) = event {
                sink.lock().unwrap().push((old, new));
            }
        });

        // Distinctive 64x48 client so notifications from concurrently
        // running tests cannot alias with the rectangles asserted below.
        let mut vp = controller(64, 48);
        vp.set_extent(Extent::new(0.0, 0.0, 64.0, 48.0)).unwrap();

        vp.pan(10, 0).unwrap();
        vp.refresh().unwrap();
        vp.host().set_size(80, 48);
        vp.resize().unwrap();
        vp.set_extend_buffer(false).unwrap();
        event_bus().unsubscribe(sub);

        let seen = seen.lock().unwrap();
        let canonical = PixelRect::new(64, 48, 64, 48);
        assert!(
            seen.contains(&(canonical, PixelRect::new(74, 48, 64, 48))),
            "cheap pan moves the view window"
        );
        assert!(
            seen.contains(&(PixelRect::new(74, 48, 64, 48), canonical)),
            "full repaint re-centers the view window"
        );
        assert!(
            seen.contains(&(canonical, PixelRect::new(80, 48, 80, 48))),
            "resize moves the canonical window"
        );
        assert!(
            seen.contains(&(PixelRect::new(80, 48, 80, 48), PixelRect::new(0, 0, 80, 48))),
            "disabling the extended buffer collapses the window"
        );
    }

    #[test]
    fn test_draw_to_requires_front_buffer() {
        let vp = unextended(100, 100);
        let mut dest = Pixmap::new(100, 100).unwrap();
        let err = vp.draw_to(&mut dest, None).unwrap_err();
        assert!(err.is_render_error());
    }

    #[test]
    fn test_draw_to_blits_view_window() {
        let mut vp = controller(100, 100);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        let mut dest = Pixmap::new(100, 100).unwrap();
        vp.draw_to(&mut dest, None).expect("front buffer exists");
        // Background is opaque white by default.
        let px = dest.pixel(50, 50).expect("in bounds");
        assert_eq!(px.alpha(), 255);
    }

    #[test]
    fn test_degenerate_extent_operations_are_noops() {
        let mut vp = unextended(100, 100);
        // Never navigated: everything is a quiet no-op.
        vp.pan(10, 10).unwrap();
        vp.zoom_in().unwrap();
        vp.zoom_out().unwrap();
        vp.zoom_to_previous().unwrap();
        assert!(vp.extent().is_point());
        assert!(vp.buffers().front().is_none());
    }

    #[test]
    fn test_zero_client_never_divides() {
        let mut vp = unextended(0, 0);
        vp.set_extent(Extent::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        vp.pan(5, 5).unwrap();
        vp.zoom_in().unwrap();
        assert_eq!(vp.buffers().client_size(), PixelSize::new(0, 0));
    }
}

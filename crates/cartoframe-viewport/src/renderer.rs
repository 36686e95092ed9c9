//! Clip-scoped, two-pass buffer compositor.
//!
//! A render pass paints the whole layer stack into a freshly allocated
//! back buffer, restricted to the invalidated regions by a clip mask, and
//! commits the result atomically. The pass order is fixed: background
//! fill, normal pass bottom to top, selected pass bottom to top, then the
//! label pass with a cleared placement registry. A failing layer is logged
//! and skipped so one bad layer cannot take down the frame; a cancelled
//! pass discards the back buffer uncommitted and the previous front stays
//! on screen.

use cartoframe_core::{
    emit, AppEvent, BufferEvent, Error, Extent, PixelRect, RenderError, Result, ViewportEvent,
};
use tiny_skia::{Color, FillRule, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Transform};
use tracing::{debug, warn};

use crate::buffer::BufferManager;
use crate::collection::LayerCollection;
use crate::layer::{
    DrawContext, DrawPass, LabelPainter, PlacardPainter, PlacedLabels, RenderObserver,
};
use crate::transform::CoordinateTransform;

/// Renders the layer stack into back buffers in interruptible chunks.
pub struct ChunkedRenderer {
    batch_size: usize,
    painter: Box<dyn LabelPainter>,
    placed: PlacedLabels,
}

impl std::fmt::Debug for ChunkedRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedRenderer")
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl ChunkedRenderer {
    /// Creates a renderer yielding every `batch_size` features, with the
    /// placard label painter installed.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            painter: Box::new(PlacardPainter),
            placed: PlacedLabels::new(),
        }
    }

    /// Replaces the label painter (hosts install their text stack here).
    pub fn set_label_painter(&mut self, painter: Box<dyn LabelPainter>) {
        self.painter = painter;
    }

    /// Feature count per batch before yielding to the observer.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Paints one full render pass and commits it.
    ///
    /// `buffer_extent` is the geographic extent covering the whole back
    /// buffer; `view_extent` is the part shown on screen (they coincide
    /// when the extended buffer is off). `regions` lists the invalidated
    /// geographic areas; an empty slice means everything is dirty.
    ///
    /// Returns the buffer-pixel rectangles that were repainted. A
    /// degenerate view extent, or regions that all fall outside the
    /// buffer, short-circuit to an empty result without touching the
    /// front buffer.
    pub fn render(
        &mut self,
        buffers: &mut BufferManager,
        layers: &LayerCollection,
        view_extent: &Extent,
        buffer_extent: &Extent,
        regions: &[Extent],
        background: Color,
        observer: &mut dyn RenderObserver,
    ) -> Result<Vec<PixelRect>> {
        if view_extent.has_zero_span() || buffer_extent.has_zero_span() {
            debug!("Skipping render of degenerate extent {:?}", view_extent);
            return Ok(Vec::new());
        }

        let (mut back, canonical_view) = buffers.create_buffer().map_err(Error::Buffer)?;
        let buffer_size = buffers.buffer_size();
        let to_px = CoordinateTransform::new(*buffer_extent, buffer_size);
        if to_px.is_degenerate() {
            return Ok(Vec::new());
        }

        let full = PixelRect::from_size(buffer_size);
        let touched = if regions.is_empty() {
            vec![full]
        } else {
            regions
                .iter()
                .map(|r| to_px.extent_to_rect(r))
                .filter_map(|r| r.intersect(&full))
                .collect()
        };
        if touched.is_empty() {
            debug!("All invalidated regions fall outside the buffer");
            return Ok(Vec::new());
        }

        // A partial repaint is scoped by a clip mask covering the union of
        // the touched rectangles; a full repaint skips the mask entirely.
        let full_repaint = touched.len() == 1 && touched[0] == full;
        let mask = if full_repaint {
            None
        } else {
            build_clip_mask(buffer_size.width, buffer_size.height, &touched)
        };

        // A partial repaint starts from the committed frame so untouched
        // regions carry over. After a cheap pan the committed pixels are
        // laid out around the shifted view rectangle while `buffer_extent`
        // assumes the canonical one, so the seed is offset by the delta to
        // keep the carried-over pixels geographically aligned.
        let view_before = buffers.view_rect();
        if !full_repaint {
            if let Some(front) = buffers.front() {
                if front.width() == buffer_size.width && front.height() == buffer_size.height {
                    back.draw_pixmap(
                        canonical_view.x - view_before.x,
                        canonical_view.y - view_before.y,
                        front.as_ref(),
                        &PixmapPaint::default(),
                        Transform::identity(),
                        None,
                    );
                }
            }
        }

        let mut paint = Paint::default();
        paint.set_color(background);
        for rect in &touched {
            if let Some(r) = Rect::from_xywh(
                rect.x as f32,
                rect.y as f32,
                rect.width as f32,
                rect.height as f32,
            ) {
                back.fill_rect(r, &paint, Transform::identity(), mask.as_ref());
            }
        }

        let sx = to_px.scale_x();
        let sy = to_px.scale_y();
        let world = Transform::from_scale(sx as f32, -(sy as f32)).post_translate(
            (-buffer_extent.min_x * sx) as f32,
            (buffer_extent.max_y * sy) as f32,
        );

        let mut ctx = DrawContext {
            pixmap: &mut back,
            mask: mask.as_ref(),
            world,
            to_px: &to_px,
            extent: view_extent,
            batch_size: self.batch_size,
            observer,
        };

        for pass in [DrawPass::Normal, DrawPass::Selected] {
            for layer in layers.iter() {
                if !layer.is_visible_at(view_extent) {
                    continue;
                }
                match layer.draw(&mut ctx, pass) {
                    Ok(()) => {}
                    Err(e @ RenderError::Cancelled) => {
                        debug!("Render cancelled during layer {}", layer.name);
                        return Err(Error::Render(e));
                    }
                    Err(e) => {
                        // One bad layer must not take down the frame.
                        warn!("Layer {} failed to draw: {}", layer.name, e);
                    }
                }
            }
        }

        // Labels never stack between passes.
        self.placed.clear();
        for layer in layers.iter() {
            if !layer.is_visible_at(view_extent) {
                continue;
            }
            match layer.draw_labels(&mut ctx, self.painter.as_mut(), &mut self.placed) {
                Ok(()) => {}
                Err(e @ RenderError::Cancelled) => return Err(Error::Render(e)),
                Err(e) => warn!("Layer {} failed to label: {}", layer.name, e),
            }
        }
        drop(ctx);

        buffers.promote(back);
        let view_after = buffers.view_rect();
        if view_after != view_before {
            // The commit re-centered the view window over the new buffer.
            let _ = emit!(AppEvent::Viewport(ViewportEvent::ViewChanged {
                old: view_before,
                new: view_after,
            }));
        }
        debug!("Committed render pass touching {} region(s)", touched.len());
        let _ = emit!(AppEvent::Buffer(BufferEvent::BufferChanged {
            touched: touched.clone(),
        }));
        Ok(touched)
    }
}

/// Builds a mask set over the union of the given rectangles.
pub(crate) fn build_clip_mask(width: u32, height: u32, rects: &[PixelRect]) -> Option<Mask> {
    let mut mask = Mask::new(width, height)?;
    let mut pb = PathBuilder::new();
    for rect in rects {
        if let Some(r) = Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) {
            pb.push_rect(r);
        }
    }
    let path = pb.finish()?;
    mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
    Some(mask)
}

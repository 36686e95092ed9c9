//! Front/back raster buffer ownership and sizing.
//!
//! Buffer allocation is the single most expensive operation in the engine,
//! so it happens only on construction, explicit resize, or extend-buffer
//! toggle, never per frame. The manager owns at most one front buffer at a
//! time; back buffers are created per render pass and handed back through
//! [`BufferManager::promote`], which swaps and releases in one move.

use cartoframe_core::constants::MIN_BUFFER_DIM;
use cartoframe_core::{BufferError, PixelRect, PixelSize};
use tiny_skia::Pixmap;
use tracing::debug;

/// Owns the displayed front buffer and the sizing policy for back buffers.
///
/// When the extended buffer is enabled, buffers are allocated at
/// `coefficient x client size` and the view rectangle is offset by one
/// client size so the visible window sits centered inside the larger
/// buffer (for the default coefficient of 3). Panning then moves the view
/// rectangle within the buffer instead of triggering a redraw.
#[derive(Debug)]
pub struct BufferManager {
    client: PixelSize,
    extend_buffer: bool,
    coefficient: u32,
    view_rect: PixelRect,
    front: Option<Pixmap>,
}

impl BufferManager {
    /// Creates a manager for the given client size. No buffer is allocated
    /// until the first render pass asks for one.
    pub fn new(client: PixelSize, extend_buffer: bool, coefficient: u32) -> Self {
        let (_, view_rect) = Self::layout(client, extend_buffer, coefficient);
        Self {
            client,
            extend_buffer,
            coefficient: coefficient.max(1),
            view_rect,
            front: None,
        }
    }

    /// Computes buffer size and view rectangle for a client size.
    fn layout(client: PixelSize, extend_buffer: bool, coefficient: u32) -> (PixelSize, PixelRect) {
        let coeff = if extend_buffer { coefficient.max(1) } else { 1 };
        let buffer = client.scaled(coeff).floored_at(MIN_BUFFER_DIM);
        let view_rect = if coeff > 1 {
            PixelRect::new(
                client.width as i32,
                client.height as i32,
                client.width,
                client.height,
            )
        } else {
            PixelRect::from_size(buffer)
        };
        (buffer, view_rect)
    }

    /// Allocates a fresh back buffer sized by the current policy, returning
    /// it together with the view rectangle mapped onto it.
    ///
    /// The first call of a render pass establishes the view rectangle; the
    /// caller paints into the returned buffer and commits it back through
    /// [`BufferManager::promote`].
    pub fn create_buffer(&self) -> Result<(Pixmap, PixelRect), BufferError> {
        let (size, view_rect) = Self::layout(self.client, self.extend_buffer, self.coefficient);
        if size.is_empty() {
            return Err(BufferError::DegenerateSize {
                width: size.width,
                height: size.height,
            });
        }
        let pixmap = Pixmap::new(size.width, size.height).ok_or(BufferError::AllocationFailed {
            width: size.width,
            height: size.height,
        })?;
        debug!(
            "Allocated {}x{} back buffer (view {}x{} at {},{})",
            size.width, size.height, view_rect.width, view_rect.height, view_rect.x, view_rect.y
        );
        Ok((pixmap, view_rect))
    }

    /// Promotes a fully rendered back buffer to front.
    ///
    /// The previous front buffer is released by the move; nothing external
    /// may hold a reference to it across this boundary. Until this call
    /// the previously committed front buffer stays valid, so a failed or
    /// abandoned render never corrupts what is on screen.
    pub fn promote(&mut self, new_front: Pixmap) {
        let (_, view_rect) = Self::layout(self.client, self.extend_buffer, self.coefficient);
        self.view_rect = view_rect;
        self.front = Some(new_front);
    }

    /// Adopts a new client size. Idempotent: repeated calls with the same
    /// size do nothing and report `false`.
    ///
    /// The current front buffer is kept on screen until the next commit
    /// replaces it; only the sizing policy changes here.
    pub fn resize(&mut self, client: PixelSize) -> bool {
        if client == self.client {
            return false;
        }
        debug!(
            "Buffer resize {}x{} -> {}x{}",
            self.client.width, self.client.height, client.width, client.height
        );
        self.client = client;
        let (_, view_rect) = Self::layout(client, self.extend_buffer, self.coefficient);
        self.view_rect = view_rect;
        true
    }

    /// Toggles buffer extension. Returns `true` when the policy changed
    /// (the next render reallocates).
    pub fn set_extend_buffer(&mut self, extend: bool) -> bool {
        if extend == self.extend_buffer {
            return false;
        }
        self.extend_buffer = extend;
        let (_, view_rect) = Self::layout(self.client, extend, self.coefficient);
        self.view_rect = view_rect;
        true
    }

    /// The committed front buffer, if a render has completed yet.
    pub fn front(&self) -> Option<&Pixmap> {
        self.front.as_ref()
    }

    /// Drops the front buffer. Used on dispose.
    pub fn clear(&mut self) {
        self.front = None;
    }

    /// Client (host window) size in pixels.
    pub fn client_size(&self) -> PixelSize {
        self.client
    }

    /// Full buffer size under the current sizing policy.
    pub fn buffer_size(&self) -> PixelSize {
        Self::layout(self.client, self.extend_buffer, self.coefficient).0
    }

    /// The view rectangle: the window into the buffer shown on screen.
    pub fn view_rect(&self) -> PixelRect {
        self.view_rect
    }

    /// Moves the view rectangle within the buffer (cheap pan). The caller
    /// guarantees the rectangle stays inside the buffer.
    pub fn set_view_rect(&mut self, view_rect: PixelRect) {
        self.view_rect = view_rect;
    }

    /// Whether buffer extension is currently enabled.
    pub fn is_extended(&self) -> bool {
        self.extend_buffer && self.coefficient > 1
    }
}

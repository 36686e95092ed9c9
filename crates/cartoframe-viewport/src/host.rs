//! Host surface abstraction.

use std::cell::Cell;

use cartoframe_core::PixelSize;

/// The window or widget the viewport draws into.
///
/// The engine pulls the client size from the host and signals it when the
/// committed front buffer has new content to present.
pub trait HostSurface {
    /// Current client area size in pixels.
    fn client_size(&self) -> PixelSize;

    /// Asks the host to repaint from the front buffer.
    fn request_redraw(&self) {}
}

/// Headless surface for tests and offscreen rendering.
///
/// The size is interiorly mutable so a test can simulate the host window
/// being resized and then call the engine's resize handler.
#[derive(Debug)]
pub struct OffscreenSurface {
    size: Cell<PixelSize>,
}

impl OffscreenSurface {
    /// Creates a surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new(PixelSize::new(width, height)),
        }
    }

    /// Simulates the host window changing size.
    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set(PixelSize::new(width, height));
    }
}

impl HostSurface for OffscreenSurface {
    fn client_size(&self) -> PixelSize {
        self.size.get()
    }
}

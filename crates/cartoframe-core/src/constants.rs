//! Engine-wide default constants and construction-time configuration.
//!
//! These values govern buffer sizing, history depth, and chunked drawing.
//! They are fixed once a viewport is constructed; runtime tuning goes
//! through `cartoframe-settings` before the engine is built.

use serde::{Deserialize, Serialize};

/// Multiplier applied to the client size when the extended buffer is enabled.
/// A coefficient of 3 centers the visible view inside a 3x3 grid of
/// client-sized tiles, absorbing pans up to a full client width/height
/// without a redraw.
pub const EXTEND_BUFFER_COEFF: u32 = 3;

/// Minimum buffer dimension in pixels. Collapsed or not-yet-laid-out host
/// windows report zero sizes; allocations are floored here instead.
pub const MIN_BUFFER_DIM: u32 = 5;

/// Maximum number of extents retained in each zoom-history stack.
pub const VIEW_HISTORY_CAPACITY: usize = 25;

/// Number of features a layer draws before yielding back to the host
/// between batches.
pub const DRAW_BATCH_SIZE: usize = 50_000;

/// Fraction by which `zoom_in` shrinks the extent span. `zoom_out` is the
/// exact inverse so that zoom-in followed by zoom-out restores the view.
pub const ZOOM_IN_FACTOR: f64 = 0.5;

/// Padding fraction applied around layer bounds when auto-fitting the view.
pub const AUTO_FIT_PADDING: f64 = 0.1;

/// Construction-time configuration for the viewport engine.
///
/// Produced from `cartoframe-settings` (validated and clamped there) or via
/// `Default` for the stock behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Over-allocate the back buffer beyond the client size.
    pub extend_buffer: bool,
    /// Buffer size multiplier when `extend_buffer` is on (>= 1).
    pub extend_coefficient: u32,
    /// Feature count per draw batch before yielding.
    pub draw_batch_size: usize,
    /// Capacity of each zoom-history stack.
    pub history_capacity: usize,
    /// Background color as RGBA bytes.
    pub background_color: [u8; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            extend_buffer: true,
            extend_coefficient: EXTEND_BUFFER_COEFF,
            draw_batch_size: DRAW_BATCH_SIZE,
            history_capacity: VIEW_HISTORY_CAPACITY,
            background_color: [255, 255, 255, 255],
        }
    }
}

impl EngineConfig {
    /// Effective coefficient: a coefficient of 1 is equivalent to disabling
    /// buffer extension entirely.
    pub fn effective_coefficient(&self) -> u32 {
        if self.extend_buffer {
            self.extend_coefficient.max(1)
        } else {
            1
        }
    }
}

//! Drawing surface sizing for high-DPI displays

use crate::core::particles::Bounds;

/// Logical size plus the device-pixel backing store size derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    logical: Bounds,
    pixel_ratio: f32,
    backing: (u32, u32),
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            logical: Bounds::default(),
            pixel_ratio: 1.0,
            backing: (800, 300),
        }
    }
}

impl Surface {
    /// Resize to `width` x `height` logical pixels at `pixel_ratio`.
    /// Returns the new logical bounds for the particle store.
    pub fn resize(&mut self, width: f32, height: f32, pixel_ratio: f32) -> Bounds {
        let sane = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        let (w, h) = (sane(width), sane(height));
        self.logical = Bounds::new(w, h);
        self.pixel_ratio = ratio;
        self.backing = ((w * ratio).ceil() as u32, (h * ratio).ceil() as u32);
        self.logical
    }

    pub fn logical(&self) -> Bounds {
        self.logical
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }
}

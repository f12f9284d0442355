//! Render target sizing
//!
//! Tracks the logical window size and the device pixel ratio, capped at a
//! configurable maximum so high-density displays do not render at full
//! physical resolution.

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    pixel_ratio: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(max_pixel_ratio: f64) -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            pixel_ratio: 1.0,
            max_pixel_ratio,
        }
    }

    /// Updates the logical size and pixel ratio
    ///
    /// Zero or negative sizes are ignored. Returns whether anything changed,
    /// so repeating the same resize is a no-op.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> bool {
        if !(width > 0.0 && height > 0.0 && device_pixel_ratio > 0.0) {
            return false;
        }

        let pixel_ratio = device_pixel_ratio.min(self.max_pixel_ratio);
        if self.width == width && self.height == height && self.pixel_ratio == pixel_ratio {
            return false;
        }

        self.width = width;
        self.height = height;
        self.pixel_ratio = pixel_ratio;
        debug!(
            "viewport: {}x{} @ {} -> {:?}",
            width,
            height,
            pixel_ratio,
            self.drawing_buffer_size()
        );
        true
    }

    /// Same as [`resize`](Self::resize) but from a physical size
    pub fn resize_physical(&mut self, width: u32, height: u32, scale_factor: f64) -> bool {
        if scale_factor <= 0.0 {
            return false;
        }
        self.resize(
            width as f64 / scale_factor,
            height as f64 / scale_factor,
            scale_factor,
        )
    }

    pub fn logical_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Size of the render target in pixels, never zero
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            ((self.width * self.pixel_ratio).round() as u32).max(1),
            ((self.height * self.pixel_ratio).round() as u32).max(1),
        )
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    /// Factor between window pixels and drawing buffer pixels, used to keep
    /// the UI's coordinates in step with the clamped buffer
    pub fn ui_scale(&self, scale_factor: f64) -> f64 {
        scale_factor / self.pixel_ratio
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ratio_is_clamped() {
        let mut viewport = Viewport::new(2.0);
        assert!(viewport.resize(800.0, 600.0, 3.0));
        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (1600, 1200));
        assert!((viewport.ui_scale(3.0) - 1.5).abs() < 1e-9);

        assert!(viewport.resize(800.0, 600.0, 1.0));
        assert_eq!(viewport.drawing_buffer_size(), (800, 600));
    }

    #[test]
    fn test_zero_sizes_are_ignored() {
        let mut viewport = Viewport::new(2.0);
        viewport.resize(1200.0, 800.0, 1.0);
        assert!(!viewport.resize(0.0, 800.0, 1.0));
        assert!(!viewport.resize(1200.0, 0.0, 1.0));
        assert!(!viewport.resize_physical(0, 0, 2.0));
        assert_eq!(viewport.logical_size(), (1200.0, 800.0));
        assert!((viewport.aspect() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut viewport = Viewport::new(2.0);
        assert!(viewport.resize_physical(2400, 1600, 2.0));
        assert!(!viewport.resize_physical(2400, 1600, 2.0));
        assert_eq!(viewport.logical_size(), (1200.0, 800.0));
        assert_eq!(viewport.drawing_buffer_size(), (2400, 1600));
    }
}

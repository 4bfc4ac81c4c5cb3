//! Logical window size, pixel ratio and drawing-buffer resolution.

/// Device pixel ratios above this are clamped; the extra fill cost is not worth it.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width: 1.0,
            height: 1.0,
            pixel_ratio: 1.0,
        };
        viewport.resize(width, height, device_pixel_ratio);
        viewport
    }

    /// Build from a physical window size and the window's scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(
            (width as f64 / scale) as f32,
            (height as f64 / scale) as f32,
            scale as f32,
        )
    }

    /// Store the new logical size and the clamped pixel ratio.
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.pixel_ratio = if device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(MAX_PIXEL_RATIO)
        } else {
            1.0
        };
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Drawing-buffer size in pixels: logical size times pixel ratio.
    pub fn resolution(&self) -> [f32; 2] {
        [
            self.width * self.pixel_ratio,
            self.height * self.pixel_ratio,
        ]
    }

    /// [`resolution`](Self::resolution) rounded to whole pixels, at least 1×1.
    pub fn surface_size(&self) -> (u32, u32) {
        let [w, h] = self.resolution();
        ((w.round() as u32).max(1), (h.round() as u32).max(1))
    }

    /// Map a pointer position in logical pixels to normalized device
    /// coordinates: `-1..1` on both axes, +y up.
    pub fn normalize_pointer(&self, x: f32, y: f32) -> [f32; 2] {
        let w = self.width.max(1.0);
        let h = self.height.max(1.0);
        [x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0]
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

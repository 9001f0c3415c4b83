//! Drawable-size bookkeeping shared by the GPU context and the scene.
//!
//! Hosts can report a zero-size container (minimized windows, Wayland before the
//! first configure). Surfaces and projections cannot, so every dimension is clamped
//! to [`MIN_SURFACE_DIMENSION`].

/// Minimum surface dimension.
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Physical pixel size of a drawable, never zero on either axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceExtent {
    width: u32,
    height: u32,
}

impl SurfaceExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(MIN_SURFACE_DIMENSION),
            height: height.max(MIN_SURFACE_DIMENSION),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width divided by height, always finite and positive.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Apply a new size. Returns the new extent if it differs from the old one.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<SurfaceExtent> {
        let next = SurfaceExtent::new(width, height);
        if next == *self {
            return None;
        }
        *self = next;
        Some(next)
    }
}

impl Default for SurfaceExtent {
    fn default() -> Self {
        Self::new(MIN_SURFACE_DIMENSION, MIN_SURFACE_DIMENSION)
    }
}

//! Map zoom level.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    min: f64,
    max: f64,
    step: f64,
}

impl Viewport {
    pub const DEFAULT_ZOOM: f64 = 1.0;

    #[must_use]
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self {
            zoom: Self::DEFAULT_ZOOM,
            min,
            max,
            step,
        }
    }

    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + self.step).min(self.max);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - self.step).max(self.min);
    }

    pub const fn reset(&mut self) {
        self.zoom = Self::DEFAULT_ZOOM;
    }
}

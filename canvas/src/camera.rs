#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point (or offset) in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`.
    #[must_use]
    pub fn minus(self, other: Point) -> Point {
        Point { x: self.x - other.x, y: self.y - other.y }
    }

    /// Component-wise `self + other`.
    #[must_use]
    pub fn plus(self, other: Point) -> Point {
        Point { x: self.x + other.x, y: self.y + other.y }
    }

    /// Whether both components are exactly zero.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Camera state for panning the canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels. World coordinates are the unpanned
/// canvas coordinates blocks are stored in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Camera {
    /// The pan offset as a point.
    #[must_use]
    pub fn pan(&self) -> Point {
        Point { x: self.pan_x, y: self.pan_y }
    }

    /// Replace the pan offset.
    pub fn set_pan(&mut self, pan: Point) {
        self.pan_x = pan.x;
        self.pan_y = pan.y;
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        screen.minus(self.pan())
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        world.plus(self.pan())
    }
}

//! World → pixel projection.
//!
//! A node's mesh lives in 3D world space; peers only understand screen space.
//! Projection runs the camera's view-projection matrix to normalized device
//! coordinates, remaps `[-1, 1]` to `[0, 1]` with Y flipped (NDC Y points up,
//! screen Y points down), then scales to the viewport's CSS-pixel extent.

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Viewport};

/// A point in screen space (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A whole-pixel position inside a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Project a world-space position to a pixel inside the viewport's canvas.
#[must_use]
pub fn project_to_pixel_space(world: DVec3, camera: &Camera, viewport: &Viewport) -> PixelPoint {
    let ndc = camera.view_projection(viewport.aspect()).project_point3(world);
    ndc_to_pixel(ndc, viewport)
}

/// Project the extent of an axis-aligned box spanning `min..max`.
///
/// The size vector `max - min` goes through the same pipeline as a position,
/// so the result is where that vector lands when treated as a point.
#[must_use]
pub fn project_bounding_box(min: DVec3, max: DVec3, camera: &Camera, viewport: &Viewport) -> PixelPoint {
    project_to_pixel_space(max - min, camera, viewport)
}

/// Physical screen position of something drawn at `canvas_px` inside a window
/// whose top-left corner is at `window_origin`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mesh_physical_position(window_origin: Point, canvas_px: PixelPoint) -> Point {
    Point::new(window_origin.x + canvas_px.x as f64, window_origin.y + canvas_px.y as f64)
}

#[allow(clippy::cast_possible_truncation)]
fn ndc_to_pixel(ndc: DVec3, viewport: &Viewport) -> PixelPoint {
    let normalized_x = 0.5 + ndc.x / 2.0;
    let normalized_y = 0.5 - ndc.y / 2.0;
    PixelPoint {
        x: round_half_up(normalized_x * viewport.css_width()) as i64,
        y: round_half_up(normalized_y * viewport.css_height()) as i64,
    }
}

// Half pixels round toward +∞ so every node agrees on the same pixel.
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

//! Window rectangles in screen space and the overlap test between them.

#[cfg(test)]
#[path = "rect_test.rs"]
mod rect_test;

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space. Y grows downward.
///
/// Valid rectangles have finite edges with `left <= right` and
/// `top <= bottom`. The constructors assert this in debug builds; release
/// builds collapse an invalid axis instead (see [`Rectangle::sanitized`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Rectangle {
    /// Build a rectangle from its four edges.
    #[must_use]
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        let rect = Self { left, right, top, bottom };
        debug_assert!(rect.is_valid(), "invalid rectangle geometry: {rect:?}");
        rect.sanitized()
    }

    /// Build the rectangle covered by a window at `(x, y)` of the given size.
    #[must_use]
    pub fn from_window(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, x + width, y, y + height)
    }

    /// True when every edge is finite and neither axis is inverted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .all(|v| v.is_finite())
            && self.left <= self.right
            && self.top <= self.bottom
    }

    /// Best-effort repair of invalid geometry.
    ///
    /// A non-finite start edge becomes `0.0`. An end edge that is non-finite
    /// or lies before its start collapses onto the start, leaving a
    /// zero-extent axis. Valid rectangles are returned unchanged.
    #[must_use]
    pub fn sanitized(self) -> Self {
        if self.is_valid() {
            return self;
        }
        let (left, right) = sanitize_axis(self.left, self.right);
        let (top, bottom) = sanitize_axis(self.top, self.bottom);
        Self { left, right, top, bottom }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

fn sanitize_axis(start: f64, end: f64) -> (f64, f64) {
    let start = if start.is_finite() { start } else { 0.0 };
    if end.is_finite() && end >= start { (start, end) } else { (start, start) }
}

/// True when `a` and `b` share interior area.
///
/// Strict comparisons: rectangles that only touch along an edge or at a
/// corner do not overlap. The test is symmetric in its arguments.
#[must_use]
pub fn rectangles_overlap(a: &Rectangle, b: &Rectangle) -> bool {
    a.left < b.right && a.right > b.left && a.top < b.bottom && a.bottom > b.top
}

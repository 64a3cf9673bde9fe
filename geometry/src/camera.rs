#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use glam::{DMat4, DVec3};

use crate::consts::{
    DEFAULT_CAMERA_POSITION, DEFAULT_DEVICE_PIXEL_RATIO, DEFAULT_FAR, DEFAULT_FOV_Y_DEGREES, DEFAULT_NEAR,
};

/// Camera projection type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection with a vertical field of view in radians.
    Perspective { fov_y_radians: f64 },
    /// Orthographic projection; `half_height` is half the visible world height.
    Orthographic { half_height: f64 },
}

/// Scene camera. Right-handed, looking from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub target: DVec3,
    pub up: DVec3,
    pub projection: Projection,
    pub near: f64,
    pub far: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec3::from_array(DEFAULT_CAMERA_POSITION),
            target: DVec3::ZERO,
            up: DVec3::Y,
            projection: Projection::Perspective { fov_y_radians: DEFAULT_FOV_Y_DEGREES.to_radians() },
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl Camera {
    /// Orthographic camera on the +Z axis looking at the origin.
    #[must_use]
    pub fn orthographic(distance: f64, half_height: f64) -> Self {
        Self {
            position: DVec3::new(0.0, 0.0, distance),
            projection: Projection::Orthographic { half_height },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn view(&self) -> DMat4 {
        DMat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection matrix for a surface with the given width/height ratio.
    ///
    /// Uses the GL clip-space convention (depth in `[-1, 1]`), matching the
    /// renderer the browser peers draw with.
    #[must_use]
    pub fn projection_matrix(&self, aspect: f64) -> DMat4 {
        match self.projection {
            Projection::Perspective { fov_y_radians } => {
                DMat4::perspective_rh_gl(fov_y_radians, aspect, self.near, self.far)
            }
            Projection::Orthographic { half_height } => {
                let half_width = half_height * aspect;
                DMat4::orthographic_rh_gl(-half_width, half_width, -half_height, half_height, self.near, self.far)
            }
        }
    }

    #[must_use]
    pub fn view_projection(&self, aspect: f64) -> DMat4 {
        self.projection_matrix(aspect) * self.view()
    }
}

/// The drawing surface a node renders into.
///
/// `width_px` / `height_px` are device pixels; CSS-pixel extents divide out
/// the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    /// Viewport with the default device pixel ratio.
    #[must_use]
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self { width_px, height_px, device_pixel_ratio: DEFAULT_DEVICE_PIXEL_RATIO }
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Width divided by height; `1.0` for an empty surface.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height_px > 0.0 { self.width_px / self.height_px } else { 1.0 }
    }

    #[must_use]
    pub fn css_width(&self) -> f64 {
        self.width_px / self.device_pixel_ratio
    }

    #[must_use]
    pub fn css_height(&self) -> f64 {
        self.height_px / self.device_pixel_ratio
    }
}

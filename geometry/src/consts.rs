//! Shared numeric constants for the geometry crate.

// ── Camera ──────────────────────────────────────────────────────

/// Vertical field of view of the default perspective camera, in degrees.
pub const DEFAULT_FOV_Y_DEGREES: f64 = 75.0;

/// Near clip plane of the default camera.
pub const DEFAULT_NEAR: f64 = 0.1;

/// Far clip plane of the default camera.
pub const DEFAULT_FAR: f64 = 1000.0;

/// Default camera eye position; the scene is viewed diagonally from above.
pub const DEFAULT_CAMERA_POSITION: [f64; 3] = [1.5, 1.5, 1.5];

// ── Viewport ────────────────────────────────────────────────────

/// Device pixel ratio assumed when the host does not report one.
pub const DEFAULT_DEVICE_PIXEL_RATIO: f64 = 1.0;

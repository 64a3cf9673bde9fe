//! Render boundary — what the core hands the drawing layer each frame, and
//! what it gets back.
//!
//! The drawing layer owns everything visual. The core only needs one thing in
//! return: where the node's own mesh landed on its canvas, so that position can
//! be republished in screen space for peers to aim at.

use geometry::{Camera, PixelPoint, Viewport, project_to_pixel_space};
use glam::DVec3;
use serde::Serialize;
use wire::NodeState;

use crate::overlap::PeerLayout;

/// Snapshot of everything a frame needs from the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub own: NodeState,
    pub is_overlapping: bool,
    /// Active peers in ascending id order with their offsets.
    pub peers: Vec<PeerLayout>,
}

pub trait RenderAdapter {
    /// Draw one frame. Returns the own mesh's canvas-relative pixel position,
    /// or `None` while there is no mesh yet.
    fn draw(&mut self, frame: &RenderFrame) -> Option<PixelPoint>;
}

/// Adapter that projects a fixed world anchor and remembers what it drew.
#[derive(Debug, Clone)]
pub struct ProjectedMesh {
    anchor: DVec3,
    camera: Camera,
    viewport: Viewport,
    frames_drawn: u64,
    last_frame: Option<RenderFrame>,
}

impl ProjectedMesh {
    #[must_use]
    pub fn new(anchor: DVec3, camera: Camera, viewport: Viewport) -> Self {
        Self { anchor, camera, viewport, frames_drawn: 0, last_frame: None }
    }

    /// Follow a canvas resize.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_anchor(&mut self, anchor: DVec3) {
        self.anchor = anchor;
    }

    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&RenderFrame> {
        self.last_frame.as_ref()
    }
}

impl RenderAdapter for ProjectedMesh {
    fn draw(&mut self, frame: &RenderFrame) -> Option<PixelPoint> {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        Some(project_to_pixel_space(self.anchor, &self.camera, &self.viewport))
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;

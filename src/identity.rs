//! Node identity — who this node is and how it looks, fixed at startup.
//!
//! DESIGN
//! ======
//! Built once, then passed by reference to everything that needs it. Nothing
//! about a node's identity changes after construction.

use rand::Rng;
use rand::seq::IndexedRandom;
use uuid::Uuid;
use wire::{NodeState, Shape};

/// A renderable model every node can pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDetails {
    pub id: &'static str,
    pub path: &'static str,
    pub color: &'static str,
}

pub const MODELS: [ModelDetails; 2] = [
    ModelDetails { id: "dragon", path: "/models/dragon/red_dragon.glb", color: "#ad3627" },
    ModelDetails { id: "dolphin", path: "/models/dolphin/scene.gltf", color: "#90accb" },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// UUID v4 string.
    pub id: String,
    /// Pastel color of the node's own particle visual.
    pub color: String,
    pub shape: Shape,
    pub model: ModelDetails,
}

impl NodeIdentity {
    /// Draw a fresh identity from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let id = uuid::Builder::from_random_bytes(rng.random()).into_uuid();
        Self {
            id: id.to_string(),
            color: pastel_color(rng),
            shape: *Shape::ALL.choose(rng).unwrap_or(&Shape::Box),
            model: *MODELS.choose(rng).unwrap_or(&MODELS[0]),
        }
    }

    /// Draw a fresh identity from the thread-local generator.
    #[must_use]
    pub fn random() -> Self {
        Self::generate(&mut rand::rng())
    }

    /// A fixed identity, for hosts that assign ids themselves.
    #[must_use]
    pub fn with_id(id: Uuid, shape: Shape, model: ModelDetails, color: impl Into<String>) -> Self {
        Self { id: id.to_string(), color: color.into(), shape, model }
    }

    /// The state this node publishes before any geometry is known.
    #[must_use]
    pub fn initial_state(&self) -> NodeState {
        NodeState {
            id: self.id.clone(),
            window_x: 0.0,
            window_y: 0.0,
            window_width: 0.0,
            window_height: 0.0,
            mesh_x: None,
            mesh_y: None,
            color: self.model.color.to_owned(),
            shape: self.shape,
            model_path: self.model.path.to_owned(),
            timestamp: 0,
        }
    }
}

/// Random RGB mixed halfway with white, as lowercase `#rrggbb`.
pub fn pastel_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let [r, g, b]: [u8; 3] = rng.random();
    format!("#{:02x}{:02x}{:02x}", mix_with_white(r), mix_with_white(g), mix_with_white(b))
}

#[must_use]
pub fn mix_with_white(channel: u8) -> u8 {
    u8::try_from((u16::from(channel) + 255) / 2).unwrap_or(u8::MAX)
}

#[cfg(test)]
#[path = "identity_test.rs"]
mod tests;

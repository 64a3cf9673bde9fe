//! Fixtures shared by the sidecar test modules.

use std::sync::Arc;

use uuid::Uuid;
use wire::{NodeState, Shape};

use crate::channel::MemoryChannel;
use crate::config::SyncConfig;
use crate::identity::{MODELS, NodeIdentity};
use crate::liveness::ManualClock;
use crate::node::SyncNode;

/// A 100×100 peer window at the screen origin.
pub(crate) fn peer_state(id: &str, timestamp: i64) -> NodeState {
    peer_at(id, 0.0, 0.0, 100.0, 100.0, timestamp)
}

/// A peer window with explicit geometry.
pub(crate) fn peer_at(id: &str, x: f64, y: f64, width: f64, height: f64, timestamp: i64) -> NodeState {
    NodeState {
        id: id.to_owned(),
        window_x: x,
        window_y: y,
        window_width: width,
        window_height: height,
        mesh_x: None,
        mesh_y: None,
        color: "#90accb".to_owned(),
        shape: Shape::Box,
        model_path: "/models/dolphin/scene.gltf".to_owned(),
        timestamp,
    }
}

/// A node with a fixed id on `channel`, reading time from `clock`.
pub(crate) fn test_node(channel: &MemoryChannel, clock: &ManualClock, n: u128) -> SyncNode {
    let identity = NodeIdentity::with_id(Uuid::from_u128(n), Shape::Sphere, MODELS[1], "#c0c0c0");
    SyncNode::new(identity, SyncConfig::default(), Arc::new(channel.connect()), Arc::new(clock.clone()))
        .expect("default config is valid")
}

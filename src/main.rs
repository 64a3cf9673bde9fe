//! Demo: three windows on one in-process channel.
//!
//! The middle window slides right across its neighbours while every node
//! renders through a projected mesh. Then the left window closes cleanly and
//! the right one stops without a word, and the middle window is left to notice
//! the silence.

use std::sync::Arc;
use std::time::Duration;

use geometry::{Camera, Viewport};
use glam::DVec3;
use tabsync::{
    Clock, MemoryChannel, NodeIdentity, ProjectedMesh, SyncConfig, SyncError, SyncNode, SystemClock, WindowGeometry,
    spawn_geometry_poller, spawn_heartbeat,
};
use tracing::info;

const WINDOW_WIDTH: f64 = 300.0;
const WINDOW_HEIGHT: f64 = 200.0;
const FRAMES: usize = 120;
const SLIDE_PER_POLL: f64 = 3.0;
const SLIDE_LIMIT: f64 = 360.0;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), SyncError> {
    tracing_subscriber::fmt::init();

    let config = SyncConfig::from_env()?;
    let channel = MemoryChannel::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut nodes = Vec::new();
    for (x, y) in [(0.0, 0.0), (250.0, 80.0), (500.0, 0.0)] {
        let node =
            SyncNode::new(NodeIdentity::random(), config.clone(), Arc::new(channel.connect()), Arc::clone(&clock))?;
        node.start()?;
        node.update_own_geometry(WindowGeometry::new(x, y, WINDOW_WIDTH, WINDOW_HEIGHT))?;
        info!(node_id = %node.id(), x, y, shape = node.identity().shape.as_str(), "window opened");
        nodes.push(Arc::new(node));
    }

    let mut heartbeats: Vec<_> =
        nodes.iter().map(|node| spawn_heartbeat(Arc::clone(node), config.heartbeat_interval())).collect();

    let mut slide = 0.0;
    let poller = spawn_geometry_poller(Arc::clone(&nodes[1]), config.geometry_poll_interval(), move || {
        slide = f64::min(slide + SLIDE_PER_POLL, SLIDE_LIMIT);
        WindowGeometry::new(250.0 + slide, 80.0, WINDOW_WIDTH, WINDOW_HEIGHT)
    });

    let mut renderers: Vec<ProjectedMesh> = nodes
        .iter()
        .map(|_| ProjectedMesh::new(DVec3::ZERO, Camera::default(), Viewport::new(WINDOW_WIDTH, WINDOW_HEIGHT)))
        .collect();

    for frame_no in 0..FRAMES {
        for (node, renderer) in nodes.iter().zip(renderers.iter_mut()) {
            let frame = node.render(renderer)?;
            if frame_no % 30 == 0 {
                info!(
                    node_id = %node.id(),
                    frame = frame_no,
                    overlapping = frame.is_overlapping,
                    active = frame.peers.len(),
                    mesh = ?frame.own.mesh_position(),
                    "frame"
                );
            }
        }
        tokio::time::sleep(config.geometry_poll_interval()).await;
    }
    poller.cancel();

    let middle = Arc::clone(&nodes[1]);
    nodes[0].shutdown();
    info!(node_id = %middle.id(), peers = middle.peer_count(), "left window closed");

    // Stop the right window's heartbeat without removing its key.
    drop(heartbeats.pop());
    let wait = Duration::from_millis(config.stale_threshold_ms + config.heartbeat_interval_ms + 100);
    info!(wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX), "right window went silent");
    tokio::time::sleep(wait).await;
    info!(node_id = %middle.id(), peers = middle.peer_count(), overlapping = middle.is_overlapping(), "after staleness");

    for node in &nodes {
        node.shutdown();
    }
    drop(heartbeats);
    Ok(())
}

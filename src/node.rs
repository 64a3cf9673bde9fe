//! Sync node — one window's view of the mesh of peers.
//!
//! DESIGN
//! ======
//! A `SyncNode` owns its identity, its own published state and a peer table
//! fed by the broadcast adapter. Every operation is synchronous and returns
//! quickly; timers live in [`crate::runtime`] and only call into this type.
//!
//! Own state sits behind a single mutex held for the whole
//! read-modify-publish sequence, so two concurrent updates can never publish
//! timestamps out of order. `shutdown` takes the same mutex, so a publish
//! either lands before the teardown or fails with `ShutDown`. The peer table has its own mutex, taken by the
//! channel listener; nothing ever holds it while publishing.
//!
//! Timestamps are `max(now, previous + 1)`: strictly increasing even if the
//! wall clock steps backwards.
//!
//! ERROR HANDLING
//! ==============
//! Publishing operations return [`SyncError`]. After [`SyncNode::shutdown`]
//! they fail with [`SyncError::ShutDown`] instead of resurrecting the key.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use geometry::{Point, Rectangle, mesh_physical_position};
use tracing::{debug, info};
use wire::NodeState;

use crate::adapter::{BroadcastAdapter, PeerEvent};
use crate::channel::{SharedChannel, Subscription};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::identity::NodeIdentity;
use crate::liveness::Clock;
use crate::overlap::{compute_active_peers, layout_active_peers, peer_rect};
use crate::peers::PeerTable;
use crate::render::{RenderAdapter, RenderFrame};

/// Window position and size in screen space, as read from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WindowGeometry {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Finite coordinates and non-negative finite extents.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Non-finite coordinates become `0.0`; bad extents become zero.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let coord = |v: f64| if v.is_finite() { v } else { 0.0 };
        let extent = |v: f64| if v.is_finite() && v >= 0.0 { v } else { 0.0 };
        Self { x: coord(self.x), y: coord(self.y), width: extent(self.width), height: extent(self.height) }
    }

    #[must_use]
    pub fn rect(&self) -> Rectangle {
        Rectangle::from_window(self.x, self.y, self.width, self.height)
    }

    fn of(state: &NodeState) -> Self {
        Self::new(state.window_x, state.window_y, state.window_width, state.window_height)
    }
}

pub struct SyncNode {
    identity: NodeIdentity,
    config: SyncConfig,
    clock: Arc<dyn Clock>,
    adapter: BroadcastAdapter,
    own: Mutex<NodeState>,
    peers: Arc<Mutex<PeerTable>>,
    subscription: Mutex<Option<Subscription>>,
    shut_down: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SyncNode {
    /// Build a node with an empty peer table and start listening for peers.
    ///
    /// Nothing is published until [`SyncNode::start`].
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] when `config` fails validation.
    pub fn new(
        identity: NodeIdentity,
        config: SyncConfig,
        channel: Arc<dyn SharedChannel>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        let adapter = BroadcastAdapter::new(channel, config.channel_prefix.clone(), &identity);
        let peers = Arc::new(Mutex::new(PeerTable::new(identity.id.clone())));

        let table = Arc::clone(&peers);
        let subscription = adapter.subscribe(move |event| {
            let mut table = lock(&table);
            match event {
                PeerEvent::Updated(state) => {
                    table.upsert(state);
                }
                PeerEvent::Departed(id) => {
                    table.remove(&id);
                }
            }
        });

        Ok(Self {
            own: Mutex::new(identity.initial_state()),
            identity,
            config,
            clock,
            adapter,
            peers,
            subscription: Mutex::new(Some(subscription)),
            shut_down: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    #[must_use]
    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Copy of the state this node last published.
    #[must_use]
    pub fn own_state(&self) -> NodeState {
        lock(&self.own).clone()
    }

    /// Held peer entries, stale ones included.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        lock(&self.peers).len()
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Learn peers already in the channel, then announce this node.
    ///
    /// # Errors
    ///
    /// Fails when the node is shut down or the channel refuses the write.
    pub fn start(&self) -> Result<(), SyncError> {
        self.ensure_running()?;
        let existing = self.adapter.snapshot();
        {
            let mut table = lock(&self.peers);
            for state in existing {
                table.upsert(state);
            }
        }
        self.heartbeat()?;
        info!(node_id = %self.identity.id, peers = self.peer_count(), "node started");
        Ok(())
    }

    /// Record new window geometry, publishing only if it changed.
    ///
    /// Returns whether a publication happened. Invalid geometry is a caller
    /// bug: it asserts in debug builds and is clamped otherwise.
    ///
    /// # Errors
    ///
    /// Fails when the node is shut down or the channel refuses the write.
    pub fn update_own_geometry(&self, geometry: WindowGeometry) -> Result<bool, SyncError> {
        debug_assert!(geometry.is_valid(), "invalid window geometry: {geometry:?}");
        let geometry = geometry.sanitized();

        let mut own = lock(&self.own);
        self.ensure_running()?;
        if WindowGeometry::of(&own) == geometry {
            return Ok(false);
        }
        own.window_x = geometry.x;
        own.window_y = geometry.y;
        own.window_width = geometry.width;
        own.window_height = geometry.height;
        self.publish_locked(&mut own)?;
        debug!(node_id = %own.id, x = geometry.x, y = geometry.y, "window geometry changed");
        Ok(true)
    }

    /// Record where the own mesh appears in screen space, publishing only if
    /// it moved.
    ///
    /// # Errors
    ///
    /// Fails when the node is shut down or the channel refuses the write.
    pub fn report_own_mesh_position(&self, position: Point) -> Result<bool, SyncError> {
        let mut own = lock(&self.own);
        self.ensure_running()?;
        if own.mesh_position() == Some((position.x, position.y)) {
            return Ok(false);
        }
        own.mesh_x = Some(position.x);
        own.mesh_y = Some(position.y);
        self.publish_locked(&mut own)?;
        Ok(true)
    }

    /// Republish own state with a fresh timestamp.
    ///
    /// # Errors
    ///
    /// Fails when the node is shut down or the channel refuses the write.
    pub fn heartbeat(&self) -> Result<(), SyncError> {
        let mut own = lock(&self.own);
        self.publish_locked(&mut own)
    }

    /// Drop every peer whose last publication is older than the threshold.
    pub fn evict_stale(&self) -> usize {
        let now = self.clock.now_ms();
        lock(&self.peers).evict_stale(now, self.config.stale_threshold_ms)
    }

    /// Live peers overlapping this node's window, ascending by id.
    #[must_use]
    pub fn active_peers(&self) -> Vec<NodeState> {
        let own = peer_rect(&lock(&self.own));
        self.active_peers_for(&own)
    }

    #[must_use]
    pub fn is_overlapping(&self) -> bool {
        !self.active_peers().is_empty()
    }

    #[must_use]
    pub fn render_frame(&self) -> RenderFrame {
        let own = self.own_state();
        let rect = peer_rect(&own);
        let active = self.active_peers_for(&rect);
        RenderFrame { is_overlapping: !active.is_empty(), peers: layout_active_peers(&rect, active), own }
    }

    /// Draw one frame and republish the mesh position the adapter reports.
    ///
    /// # Errors
    ///
    /// Fails when the position changed but could not be published.
    pub fn render(&self, adapter: &mut dyn RenderAdapter) -> Result<RenderFrame, SyncError> {
        let frame = self.render_frame();
        if let Some(canvas_px) = adapter.draw(&frame) {
            let origin = Point::new(frame.own.window_x, frame.own.window_y);
            self.report_own_mesh_position(mesh_physical_position(origin, canvas_px))?;
        }
        Ok(frame)
    }

    /// Stop listening and remove the own key so peers forget this node now.
    /// Calling it again does nothing.
    pub fn shutdown(&self) {
        // Held across the flag and the teardown so no publish can land after.
        let _own = lock(&self.own);
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(subscription) = lock(&self.subscription).take() {
            subscription.cancel();
        }
        self.adapter.teardown();
        info!(node_id = %self.identity.id, "node shut down");
    }

    fn active_peers_for(&self, own: &Rectangle) -> Vec<NodeState> {
        let now = self.clock.now_ms();
        compute_active_peers(own, &lock(&self.peers), now, self.config.stale_threshold_ms)
    }

    fn ensure_running(&self) -> Result<(), SyncError> {
        if self.is_shut_down() { Err(SyncError::ShutDown) } else { Ok(()) }
    }

    /// Caller holds the `own` lock, which `shutdown` also takes, so the
    /// running check and the write cannot straddle a teardown.
    fn publish_locked(&self, own: &mut NodeState) -> Result<(), SyncError> {
        self.ensure_running()?;
        own.timestamp = self.clock.now_ms().max(own.timestamp.saturating_add(1));
        self.adapter.publish(own)
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod tests;

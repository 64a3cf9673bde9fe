//! Timers — the periodic work that keeps a node visible and current.
//!
//! DESIGN
//! ======
//! Two background tasks per node: a heartbeat that republishes own state and
//! evicts stale peers, and a geometry poller that feeds window moves into
//! [`SyncNode::update_own_geometry`]. Both use `MissedTickBehavior::Skip`, so a
//! stalled runtime catches up with one tick rather than a burst.
//!
//! Each task ends on its own once the node shuts down. [`TimerHandle`] stops
//! it sooner: cancelling or dropping the handle aborts the task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::{ErrorCode, SyncError};
use crate::node::{SyncNode, WindowGeometry};

/// Owner of a spawned timer task. Dropping it aborts the task.
#[must_use = "dropping a TimerHandle cancels the timer"]
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Republish own state every `period` and evict peers that went quiet.
///
/// The first tick fires one period after spawning; [`SyncNode::start`] has
/// already published by then.
pub fn spawn_heartbeat(node: Arc<SyncNode>, period: Duration) -> TimerHandle {
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = node.heartbeat() {
                if stops_timer(&e) {
                    break;
                }
                continue;
            }
            let evicted = node.evict_stale();
            if evicted > 0 {
                debug!(node_id = %node.id(), evicted, "evicted stale peers");
            }
        }
        debug!(node_id = %node.id(), "heartbeat stopped");
    });
    TimerHandle { task }
}

/// Read window geometry through `poll` every `period` and publish changes.
pub fn spawn_geometry_poller<F>(node: Arc<SyncNode>, period: Duration, mut poll: F) -> TimerHandle
where
    F: FnMut() -> WindowGeometry + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = node.update_own_geometry(poll()) {
                if stops_timer(&e) {
                    break;
                }
            }
        }
        debug!(node_id = %node.id(), "geometry poller stopped");
    });
    TimerHandle { task }
}

/// Shutdown ends a timer; anything else is logged and retried next tick.
fn stops_timer(e: &SyncError) -> bool {
    if matches!(e, SyncError::ShutDown) {
        return true;
    }
    warn!(error = %e, code = e.error_code(), "timer publish failed");
    false
}

#[cfg(test)]
#[path = "runtime_test.rs"]
mod tests;

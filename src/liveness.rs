//! Liveness — is a peer's last publication recent enough to count?
//!
//! DESIGN
//! ======
//! Liveness is purely time-based: a peer that stops publishing goes stale
//! once its last timestamp is older than the threshold, whether or not any
//! further message arrives. Time comes from a [`Clock`] so tests can move it
//! explicitly.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use wire::NodeState;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The process wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
            return 0;
        };
        i64::try_from(dur.as_millis()).unwrap_or(0)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start_ms: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(start_ms)) }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Milliseconds since `state` was published. Negative when the publisher's
/// clock runs ahead of ours.
#[must_use]
pub fn age_ms(state: &NodeState, now_ms: i64) -> i64 {
    now_ms.saturating_sub(state.timestamp)
}

/// True while `now - state.timestamp <= threshold_ms`.
#[must_use]
pub fn is_live(state: &NodeState, now_ms: i64, threshold_ms: u64) -> bool {
    age_ms(state, now_ms) <= i64::try_from(threshold_ms).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "liveness_test.rs"]
mod tests;

//! Peer table — last known state of every other node.
//!
//! DESIGN
//! ======
//! Entries are keyed by node id in a `BTreeMap`, so iteration is always in
//! ascending id order and every derived list (active peers, layouts) is
//! stable across evaluations with unchanged input.
//!
//! Each id has a single writer, which publishes with strictly increasing
//! timestamps. The table therefore only ever replaces an entry with a newer
//! one; duplicates and out-of-order deliveries are discarded.
//!
//! Stale entries stay in the table (they are filtered at read time) until an
//! explicit [`PeerTable::evict_stale`] pass or a departure removes them.
//!
//! A departure leaves a tombstone holding the last timestamp seen for that id,
//! so a late or replayed older message cannot bring the peer back. Tombstones
//! are dropped by `evict_stale` once they are past the staleness threshold:
//! anything at least that old would be stale on arrival anyway.

use std::collections::BTreeMap;

use tracing::{debug, info};
use wire::NodeState;

use crate::liveness::is_live;

/// What [`PeerTable::upsert`] did with a received state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First state seen for this id.
    Inserted,
    /// Replaced an older entry.
    Updated,
    /// Discarded: not newer than the entry already held.
    Outdated,
    /// Discarded: the state is this node's own.
    SelfIgnored,
}

#[derive(Debug, Clone)]
pub struct PeerTable {
    self_id: String,
    peers: BTreeMap<String, NodeState>,
    /// Last timestamp of each departed peer.
    departed: BTreeMap<String, i64>,
}

impl PeerTable {
    #[must_use]
    pub fn new(self_id: impl Into<String>) -> Self {
        Self { self_id: self_id.into(), peers: BTreeMap::new(), departed: BTreeMap::new() }
    }

    /// Insert or replace a peer's state if it is newer than what is held.
    pub fn upsert(&mut self, state: NodeState) -> UpsertOutcome {
        if state.id == self.self_id {
            return UpsertOutcome::SelfIgnored;
        }
        if let Some(&departed_at) = self.departed.get(&state.id) {
            if state.timestamp <= departed_at {
                debug!(
                    peer = %state.id,
                    departed_at,
                    received = state.timestamp,
                    "discarding state older than peer's departure"
                );
                return UpsertOutcome::Outdated;
            }
            self.departed.remove(&state.id);
        }
        match self.peers.get_mut(&state.id) {
            Some(existing) if state.timestamp <= existing.timestamp => {
                debug!(
                    peer = %state.id,
                    held = existing.timestamp,
                    received = state.timestamp,
                    "discarding outdated peer state"
                );
                UpsertOutcome::Outdated
            }
            Some(existing) => {
                *existing = state;
                UpsertOutcome::Updated
            }
            None => {
                info!(peer = %state.id, "discovered peer");
                self.peers.insert(state.id.clone(), state);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Forget a peer that announced its departure. Only states newer than
    /// the last one held are accepted for `id` from now on.
    pub fn remove(&mut self, id: &str) -> Option<NodeState> {
        let removed = self.peers.remove(id);
        if let Some(state) = &removed {
            self.departed.insert(state.id.clone(), state.timestamp);
            info!(peer = %id, remaining = self.peers.len(), "peer departed");
        }
        removed
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NodeState> {
        self.peers.get(id)
    }

    #[must_use]
    pub fn self_id(&self) -> &str {
        &self.self_id
    }

    /// Number of held entries, stale ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// All held entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeState> {
        self.peers.values()
    }

    /// Entries still live at `now_ms`, in ascending id order.
    pub fn live(&self, now_ms: i64, threshold_ms: u64) -> impl Iterator<Item = &NodeState> {
        self.peers.values().filter(move |p| is_live(p, now_ms, threshold_ms))
    }

    /// Physically remove every stale entry and every expired tombstone.
    /// Returns how many entries were removed.
    pub fn evict_stale(&mut self, now_ms: i64, threshold_ms: u64) -> usize {
        let threshold = i64::try_from(threshold_ms).unwrap_or(i64::MAX);
        self.departed.retain(|_, departed_at| now_ms.saturating_sub(*departed_at) <= threshold);
        let before = self.peers.len();
        self.peers.retain(|id, peer| {
            let alive = is_live(peer, now_ms, threshold_ms);
            if !alive {
                info!(peer = %id, last_seen = peer.timestamp, "peer timed out, removing");
            }
            alive
        });
        before - self.peers.len()
    }
}

#[cfg(test)]
#[path = "peers_test.rs"]
mod tests;

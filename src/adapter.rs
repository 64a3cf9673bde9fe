//! Broadcast adapter — publishes this node's state and hears everyone else's.
//!
//! DESIGN
//! ======
//! Every node owns exactly one channel key, `"<prefix>:<node-id>"`, and only
//! ever writes that key. Subscribers see changes to other keys as
//! [`PeerEvent`]s: a key that gains a value is an update, a key that loses
//! its value is a departure.
//!
//! ERROR HANDLING
//! ==============
//! Peer payloads that fail to decode, or whose id does not match the key
//! they were written under, are logged and dropped here. They never reach
//! the subscriber, so a misbehaving peer just fails to appear.

use std::sync::Arc;

use tracing::{debug, warn};
use wire::{NodeState, channel_key, decode, encode_string, parse_channel_key};

use crate::channel::{ChannelEvent, SharedChannel, Subscription};
use crate::error::SyncError;
use crate::identity::NodeIdentity;

/// A change to some other node's published state.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Updated(NodeState),
    /// The peer removed its key (graceful shutdown).
    Departed(String),
}

impl PeerEvent {
    #[must_use]
    pub fn peer_id(&self) -> &str {
        match self {
            Self::Updated(state) => &state.id,
            Self::Departed(id) => id,
        }
    }
}

pub struct BroadcastAdapter {
    channel: Arc<dyn SharedChannel>,
    prefix: String,
    own_id: String,
    own_key: String,
}

impl BroadcastAdapter {
    #[must_use]
    pub fn new(channel: Arc<dyn SharedChannel>, prefix: impl Into<String>, identity: &NodeIdentity) -> Self {
        let prefix = prefix.into();
        let own_key = channel_key(&prefix, &identity.id);
        Self { channel, prefix, own_id: identity.id.clone(), own_key }
    }

    #[must_use]
    pub fn own_key(&self) -> &str {
        &self.own_key
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Upsert this node's state under its own key.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ForeignId`] for a state that is not this node's,
    /// and [`SyncError::Channel`] when the channel refuses the write.
    pub fn publish(&self, state: &NodeState) -> Result<(), SyncError> {
        if state.id != self.own_id {
            return Err(SyncError::ForeignId { expected: self.own_id.clone(), found: state.id.clone() });
        }
        self.channel.set_item(&self.own_key, &encode_string(state))?;
        debug!(key = %self.own_key, timestamp = state.timestamp, "published own state");
        Ok(())
    }

    /// Deliver every change to another node's key to `callback`.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(PeerEvent) + Send + Sync + 'static,
    {
        let prefix = self.prefix.clone();
        let own_key = self.own_key.clone();
        self.channel.subscribe(Arc::new(move |event: &ChannelEvent| {
            if let Some(peer_event) = interpret(&prefix, &own_key, event) {
                callback(peer_event);
            }
        }))
    }

    /// Every peer state currently in the channel, in ascending key order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<NodeState> {
        self.channel
            .keys()
            .into_iter()
            .filter(|key| *key != self.own_key)
            .filter_map(|key| {
                let id = parse_channel_key(&self.prefix, &key)?;
                let value = self.channel.get_item(&key)?;
                decode_peer(&key, id, &value)
            })
            .collect()
    }

    /// Remove this node's key so peers drop it without waiting for staleness.
    pub fn teardown(&self) {
        self.channel.remove_item(&self.own_key);
        debug!(key = %self.own_key, "removed own state");
    }
}

/// Map a raw channel change onto a peer event, if it concerns a peer.
fn interpret(prefix: &str, own_key: &str, event: &ChannelEvent) -> Option<PeerEvent> {
    if event.key == own_key {
        return None;
    }
    let id = parse_channel_key(prefix, &event.key)?;
    match &event.new_value {
        None => Some(PeerEvent::Departed(id.to_owned())),
        Some(value) => decode_peer(&event.key, id, value).map(PeerEvent::Updated),
    }
}

fn decode_peer(key: &str, id: &str, value: &str) -> Option<NodeState> {
    match decode(value.as_bytes()) {
        Ok(state) if state.id == id => Some(state),
        Ok(state) => {
            warn!(%key, claimed = %state.id, "dropping peer state written under another node's key");
            None
        }
        Err(e) => {
            warn!(%key, error = %e, "dropping malformed peer payload");
            None
        }
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;

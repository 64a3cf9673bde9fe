//! Shared channel — the local key/value medium every node reads and writes.
//!
//! DESIGN
//! ======
//! The channel behaves like browser `localStorage` shared between tabs: a
//! flat string→string map where every write or removal notifies the *other*
//! connected handles, never the writer itself. Writes that leave a value
//! unchanged notify nobody.
//!
//! [`SharedChannel`] is the seam; [`MemoryChannel`] is the same-process
//! implementation. Each [`MemoryChannel::connect`] call yields a handle with
//! its own writer identity (one per node), all backed by the same map.
//!
//! Listeners run on the writer's call stack after the channel lock has been
//! released, so a listener may freely read the channel.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ErrorCode;

/// Notification that a key changed in another handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    pub key: String,
    pub old_value: Option<String>,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
}

pub type Listener = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The write would push the channel past its storage quota.
    #[error("channel quota exceeded writing {key}: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { key: String, needed: usize, quota: usize },
}

impl ErrorCode for ChannelError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "E_CHANNEL_QUOTA",
        }
    }
}

/// A local, multi-writer/multi-reader key/value channel with change
/// notifications.
pub trait SharedChannel: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError`] when the backing store refuses the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), ChannelError>;

    /// Delete `key`. Removing an absent key is a no-op.
    fn remove_item(&self, key: &str);

    fn get_item(&self, key: &str) -> Option<String>;

    /// Every key currently stored, in ascending order.
    fn keys(&self) -> Vec<String>;

    /// Register a listener for changes made through other handles.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Cancellation handle for a channel listener or timer.
///
/// Dropping the handle cancels, as does calling [`Subscription::cancel`].
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}

// =============================================================================
// MEMORY CHANNEL
// =============================================================================

struct Hub {
    state: Mutex<HubState>,
    next_writer: AtomicU64,
}

struct HubState {
    items: BTreeMap<String, String>,
    listeners: Vec<Registered>,
    next_listener: u64,
    quota: Option<usize>,
}

struct Registered {
    id: u64,
    writer: u64,
    listener: Listener,
}

impl Hub {
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HubState {
    fn stored_bytes(&self) -> usize {
        self.items.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Listeners that should hear about a change made by `writer`.
    fn audience(&self, writer: u64) -> Vec<Listener> {
        self.listeners
            .iter()
            .filter(|r| r.writer != writer)
            .map(|r| Arc::clone(&r.listener))
            .collect()
    }
}

/// In-process [`SharedChannel`].
///
/// Clones are the same handle (same writer identity); use
/// [`MemoryChannel::connect`] for a handle that acts as a separate node.
#[derive(Clone)]
pub struct MemoryChannel {
    hub: Arc<Hub>,
    writer: u64,
}

impl MemoryChannel {
    #[must_use]
    pub fn new() -> Self {
        Self::with_quota_option(None)
    }

    /// Channel that refuses writes once keys plus values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self::with_quota_option(Some(bytes))
    }

    fn with_quota_option(quota: Option<usize>) -> Self {
        let hub = Hub {
            state: Mutex::new(HubState { items: BTreeMap::new(), listeners: Vec::new(), next_listener: 0, quota }),
            next_writer: AtomicU64::new(1),
        };
        Self { hub: Arc::new(hub), writer: 0 }
    }

    /// A new handle on the same channel with its own writer identity.
    #[must_use]
    pub fn connect(&self) -> Self {
        let writer = self.hub.next_writer.fetch_add(1, Ordering::Relaxed);
        Self { hub: Arc::clone(&self.hub), writer }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hub.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hub.lock().items.is_empty()
    }

    fn notify(listeners: Vec<Listener>, event: &ChannelEvent) {
        for listener in listeners {
            listener(event);
        }
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedChannel for MemoryChannel {
    fn set_item(&self, key: &str, value: &str) -> Result<(), ChannelError> {
        let (listeners, event) = {
            let mut state = self.hub.lock();
            if state.items.get(key).is_some_and(|old| old == value) {
                return Ok(());
            }
            if let Some(quota) = state.quota {
                let replaced = state.items.get(key).map_or(0, |old| key.len() + old.len());
                let needed = state.stored_bytes() - replaced + key.len() + value.len();
                if needed > quota {
                    return Err(ChannelError::QuotaExceeded { key: key.to_owned(), needed, quota });
                }
            }
            let old_value = state.items.insert(key.to_owned(), value.to_owned());
            let event = ChannelEvent { key: key.to_owned(), old_value, new_value: Some(value.to_owned()) };
            (state.audience(self.writer), event)
        };
        Self::notify(listeners, &event);
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let (listeners, event) = {
            let mut state = self.hub.lock();
            let Some(old_value) = state.items.remove(key) else {
                return;
            };
            let event = ChannelEvent { key: key.to_owned(), old_value: Some(old_value), new_value: None };
            (state.audience(self.writer), event)
        };
        Self::notify(listeners, &event);
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.hub.lock().items.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.hub.lock().items.keys().cloned().collect()
    }

    fn subscribe(&self, listener: Listener) -> Subscription {
        let id = {
            let mut state = self.hub.lock();
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.push(Registered { id, writer: self.writer, listener });
            id
        };
        let hub = Arc::downgrade(&self.hub);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.lock().listeners.retain(|r| r.id != id);
            }
        })
    }
}

#[cfg(test)]
#[path = "channel_test.rs"]
mod tests;

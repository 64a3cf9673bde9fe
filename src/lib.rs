//! Peer synchronization for multi-window nodes.
//!
//! Each window runs a [`SyncNode`]. Nodes publish their window geometry to a
//! shared local key/value channel, discover one another from it, and work out
//! which peers' windows overlap their own. The drawing layer sits
//! behind [`RenderAdapter`] and reports back where its mesh landed, which the
//! node republishes in screen space.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`identity`] | Node id, color, shape and model, fixed at startup |
//! | [`config`] | `SyncConfig` and its environment overrides |
//! | [`liveness`] | Clocks and the staleness rule |
//! | [`peers`] | Last known state per peer, newest timestamp wins |
//! | [`channel`] | `SharedChannel` seam and the in-process `MemoryChannel` |
//! | [`adapter`] | Own-key publication and peer events over a channel |
//! | [`overlap`] | Active peers and their layout offsets |
//! | [`render`] | Frame handed to the drawing layer |
//! | [`node`] | `SyncNode`, tying the above together |
//! | [`runtime`] | Heartbeat and geometry-poll timers |
//! | [`error`] | `SyncError` and stable error codes |

pub mod adapter;
pub mod channel;
pub mod config;
pub mod error;
pub mod identity;
pub mod liveness;
pub mod node;
pub mod overlap;
pub mod peers;
pub mod render;
pub mod runtime;

#[cfg(test)]
mod test_helpers;

pub use adapter::{BroadcastAdapter, PeerEvent};
pub use channel::{ChannelError, ChannelEvent, MemoryChannel, SharedChannel, Subscription};
pub use config::{ConfigError, SyncConfig};
pub use error::{ErrorCode, SyncError};
pub use identity::{MODELS, ModelDetails, NodeIdentity};
pub use liveness::{Clock, ManualClock, SystemClock, is_live};
pub use node::{SyncNode, WindowGeometry};
pub use overlap::{LayoutOffset, PeerLayout, compute_active_peers, layout_active_peers, layout_offset_for};
pub use peers::{PeerTable, UpsertOutcome};
pub use render::{ProjectedMesh, RenderAdapter, RenderFrame};
pub use runtime::{TimerHandle, spawn_geometry_poller, spawn_heartbeat};

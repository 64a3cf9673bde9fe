//! Overlap engine — which live peers share screen area with this node.
//!
//! DESIGN
//! ======
//! Everything here is a pure function of the own rectangle, the peer table and
//! the current time. Results follow the table's ascending-id order, so a
//! peer's index (and therefore its layout offset) only changes when the set of
//! active peers changes.

use geometry::{Rectangle, rectangles_overlap};
use serde::Serialize;
use tracing::debug;
use wire::NodeState;

use crate::liveness::{age_ms, is_live};
use crate::peers::PeerTable;

/// Offset unit between successive active peers.
pub const LAYOUT_STEP: f64 = 0.5;
/// Horizontal offsets are this many times the vertical ones.
pub const HORIZONTAL_SPREAD: f64 = 2.0;

/// The screen rectangle a peer's published geometry covers.
///
/// Peer geometry arrives over the wire, so it is repaired rather than asserted.
#[must_use]
pub fn peer_rect(state: &NodeState) -> Rectangle {
    Rectangle {
        left: state.window_x,
        right: state.window_x + state.window_width,
        top: state.window_y,
        bottom: state.window_y + state.window_height,
    }
    .sanitized()
}

/// Live peers whose window overlaps `own`, in ascending id order.
#[must_use]
pub fn compute_active_peers(own: &Rectangle, peers: &PeerTable, now_ms: i64, threshold_ms: u64) -> Vec<NodeState> {
    peers
        .iter()
        .filter(|peer| {
            if is_live(peer, now_ms, threshold_ms) {
                return true;
            }
            debug!(peer = %peer.id, age_ms = age_ms(peer, now_ms), "excluding stale peer");
            false
        })
        .filter(|peer| rectangles_overlap(own, &peer_rect(peer)))
        .cloned()
        .collect()
}

/// Where a peer sits relative to this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Vertical {
    Above,
    Below,
}

/// Displacement, in world units, for the visual linking this node to a peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutOffset {
    pub dx: f64,
    pub dy: f64,
}

fn horizontal_side(own: &Rectangle, peer: &NodeState) -> Horizontal {
    if peer.window_x <= own.left { Horizontal::Left } else { Horizontal::Right }
}

fn vertical_side(own: &Rectangle, peer: &NodeState) -> Vertical {
    if peer.window_y <= own.top { Vertical::Above } else { Vertical::Below }
}

/// Offset for the `index`-th active peer.
///
/// Magnitudes grow with the index so no two active peers share one; the sign
/// points toward the side of `own` the peer's window sits on.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn layout_offset_for(own: &Rectangle, peer: &NodeState, index: usize) -> LayoutOffset {
    let base = LAYOUT_STEP * (index as f64 + 1.0);
    let dx = HORIZONTAL_SPREAD * base;
    LayoutOffset {
        dx: match horizontal_side(own, peer) {
            Horizontal::Left => -dx,
            Horizontal::Right => dx,
        },
        dy: match vertical_side(own, peer) {
            Vertical::Above => -base,
            Vertical::Below => base,
        },
    }
}

/// An active peer together with where to draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerLayout {
    pub peer: NodeState,
    pub index: usize,
    pub offset: LayoutOffset,
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

/// Lay out `active` (already in ascending id order) around `own`.
#[must_use]
pub fn layout_active_peers(own: &Rectangle, active: Vec<NodeState>) -> Vec<PeerLayout> {
    active
        .into_iter()
        .enumerate()
        .map(|(index, peer)| PeerLayout {
            offset: layout_offset_for(own, &peer, index),
            horizontal: horizontal_side(own, &peer),
            vertical: vertical_side(own, &peer),
            index,
            peer,
        })
        .collect()
}

#[cfg(test)]
#[path = "overlap_test.rs"]
mod tests;

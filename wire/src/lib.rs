//! Shared node-state model and JSON codec for the local broadcast channel.
//!
//! This crate owns the wire representation every node writes under its own
//! channel key and every peer reads back. Payloads are JSON text so they can
//! live in a plain string-valued key/value store, with the same camelCase field
//! names the browser experiment used.

use serde::{Deserialize, Serialize};

/// Separator between the shared prefix and the node id in a channel key.
pub const KEY_SEPARATOR: char = ':';

/// Error returned by [`decode`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes are not a JSON object with every required field of the right type.
    #[error("failed to decode node state: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload decoded but carries an empty node id.
    #[error("node state has an empty id")]
    EmptyId,
    /// A window extent is negative, which no real window can have.
    #[error("node state has a negative {field}: {value}")]
    NegativeExtent { field: &'static str, value: f64 },
}

/// Base geometry a node renders with. Chosen once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Particles sampled from a cube.
    Box,
    /// Particles sampled from a sphere.
    Sphere,
}

impl Shape {
    /// Every shape, in wire order.
    pub const ALL: [Shape; 2] = [Shape::Box, Shape::Sphere];

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
        }
    }
}

/// The state a node advertises to its peers.
///
/// One writer per `id`: only the owning node ever publishes a value under its
/// key, and every publish carries a strictly larger `timestamp`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    /// Node instance id (UUID string), fixed for the process lifetime.
    pub id: String,
    /// Screen-space x of the window's top-left corner.
    pub window_x: f64,
    /// Screen-space y of the window's top-left corner.
    pub window_y: f64,
    /// Window width in CSS pixels.
    pub window_width: f64,
    /// Window height in CSS pixels.
    pub window_height: f64,
    /// Physical screen x of the node's mesh anchor, once reported.
    #[serde(rename = "meshPhysicalPositionX", default, skip_serializing_if = "Option::is_none")]
    pub mesh_x: Option<f64>,
    /// Physical screen y of the node's mesh anchor, once reported.
    #[serde(rename = "meshPhysicalPositionY", default, skip_serializing_if = "Option::is_none")]
    pub mesh_y: Option<f64>,
    /// CSS color string for the node's visual.
    pub color: String,
    /// Base geometry of the node's visual.
    pub shape: Shape,
    /// Asset path of the node's model.
    pub model_path: String,
    /// Milliseconds since the Unix epoch of the publication.
    pub timestamp: i64,
}

impl NodeState {
    /// Mesh anchor in physical screen pixels, when both coordinates are known.
    #[must_use]
    pub fn mesh_position(&self) -> Option<(f64, f64)> {
        self.mesh_x.zip(self.mesh_y)
    }

    fn validate(&self) -> Result<(), DecodeError> {
        if self.id.is_empty() {
            return Err(DecodeError::EmptyId);
        }
        if self.window_width < 0.0 {
            return Err(DecodeError::NegativeExtent { field: "windowWidth", value: self.window_width });
        }
        if self.window_height < 0.0 {
            return Err(DecodeError::NegativeExtent { field: "windowHeight", value: self.window_height });
        }
        Ok(())
    }
}

/// Encode a node state into JSON bytes.
#[must_use]
pub fn encode(state: &NodeState) -> Vec<u8> {
    encode_string(state).into_bytes()
}

/// Encode a node state into a JSON string, the value stored under a channel key.
#[must_use]
pub fn encode_string(state: &NodeState) -> String {
    // NodeState has only string keys and plain scalars, so serialization
    // cannot fail; a non-finite float is written as `null` and rejected by
    // `decode` instead.
    let encoded = serde_json::to_string(state);
    debug_assert!(encoded.is_ok(), "node state failed to serialize: {encoded:?}");
    encoded.unwrap_or_default()
}

/// Decode JSON bytes into a node state.
///
/// # Errors
///
/// Returns [`DecodeError::Json`] for bytes that are not a complete, well-typed
/// payload, [`DecodeError::EmptyId`] for a blank id, and
/// [`DecodeError::NegativeExtent`] for impossible window geometry.
pub fn decode(bytes: &[u8]) -> Result<NodeState, DecodeError> {
    let state: NodeState = serde_json::from_slice(bytes)?;
    state.validate()?;
    Ok(state)
}

/// Build the channel key a node publishes under: `"<prefix>:<id>"`.
#[must_use]
pub fn channel_key(prefix: &str, id: &str) -> String {
    format!("{prefix}{KEY_SEPARATOR}{id}")
}

/// Extract the node id from a channel key, if the key belongs to `prefix`.
///
/// Keys from unrelated concerns, keys with a different prefix that merely
/// starts with the same characters, and keys with an empty id all yield `None`.
#[must_use]
pub fn parse_channel_key<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    let id = key.strip_prefix(prefix)?.strip_prefix(KEY_SEPARATOR)?;
    if id.is_empty() { None } else { Some(id) }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

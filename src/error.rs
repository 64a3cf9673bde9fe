//! Error taxonomy for the sync engine.
//!
//! DESIGN
//! ======
//! Each concern owns its error enum (`ConfigError`, `ChannelError`, and
//! `wire::DecodeError`); `SyncError` is what node operations return. Decode
//! failures never appear here: a malformed peer payload is dropped inside the
//! broadcast adapter and only logged.

use crate::channel::ChannelError;
use crate::config::ConfigError;

/// Stable machine-readable code for an error, for logs and host bindings.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    /// A node may only publish under its own id.
    #[error("refusing to publish state of node {found} from node {expected}")]
    ForeignId { expected: String, found: String },
    #[error("node has shut down")]
    ShutDown,
}

impl ErrorCode for SyncError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Channel(e) => e.error_code(),
            Self::ForeignId { .. } => "E_FOREIGN_ID",
            Self::ShutDown => "E_SHUT_DOWN",
        }
    }
}

use thiserror::Error;

use netstate_serde::SerdeErr;

/// Errors that can occur while receiving an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The incoming frame could not be decoded; nothing was applied
    #[error("malformed update frame: {0}")]
    MalformedFrame(#[from] SerdeErr),
}

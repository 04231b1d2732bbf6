//! Transport error types.

use thiserror::Error;

/// Errors surfaced by [`Transport`](crate::Transport) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Send attempted while the link is down.
    #[error("Not connected.")]
    NotConnected,

    /// The link refused the operation.
    #[error("link error: {reason}")]
    Link {
        /// Description of the refusal.
        reason: String,
    },
}

impl TransportError {
    /// Returns true if reconnecting could make the same call succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NotConnected => true,
            Self::Link { .. } => false,
        }
    }
}

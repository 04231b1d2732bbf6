//! Exchange error types.

use courier_core::TransportError;
use courier_harness::WaitError;
use thiserror::Error;

/// Errors that abort a simulated exchange.
#[derive(Debug, Error)]
pub enum SimError {
    /// A transport operation failed for a reason other than a dropped link.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A waitpoint could not be registered or was rejected.
    #[error("wait error: {0}")]
    Wait(#[from] WaitError),

    /// An endpoint's inbox closed mid-exchange.
    #[error("inbox closed on {endpoint}")]
    InboxClosed {
        /// Endpoint whose inbox closed.
        endpoint: &'static str,
    },
}

//! Operations for model-based testing.
//!
//! Operations represent everything a test can do to a set of endpoints. They
//! are generated randomly by proptest (or the fuzzer) and applied to both the
//! model and the real endpoints.

use arbitrary::Arbitrary;

/// Endpoint identifier (0-indexed).
pub type EndpointId = u8;

/// Operations that can be applied to a network of endpoints.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Endpoint sends a message to all its peers.
    Send {
        /// Sending endpoint.
        from: EndpointId,
        /// Message content.
        content: SmallMessage,
    },

    /// A message is injected directly into an endpoint's receive path.
    Inject {
        /// Receiving endpoint.
        to: EndpointId,
        /// Message content.
        content: SmallMessage,
    },

    /// Endpoint connects.
    Connect {
        /// Target endpoint.
        endpoint: EndpointId,
    },

    /// Endpoint disconnects.
    Disconnect {
        /// Target endpoint.
        endpoint: EndpointId,
    },

    /// Link state is forced, bypassing connect/disconnect.
    SetConnected {
        /// Target endpoint.
        endpoint: EndpointId,
        /// New link state.
        connected: bool,
    },

    /// Register a send waiter.
    WaitSent {
        /// Target endpoint.
        endpoint: EndpointId,
    },

    /// Register a receive waiter.
    WaitReceived {
        /// Target endpoint.
        endpoint: EndpointId,
    },

    /// Invoke the send-wait timeout handler.
    ExpireSendWait {
        /// Target endpoint.
        endpoint: EndpointId,
    },

    /// Invoke the receive-wait timeout handler.
    ExpireReceiveWait {
        /// Target endpoint.
        endpoint: EndpointId,
    },
}

impl Operation {
    /// Endpoint the operation acts on.
    pub fn endpoint(&self) -> EndpointId {
        match self {
            Self::Send { from, .. } => *from,
            Self::Inject { to, .. } => *to,
            Self::Connect { endpoint }
            | Self::Disconnect { endpoint }
            | Self::SetConnected { endpoint, .. }
            | Self::WaitSent { endpoint }
            | Self::WaitReceived { endpoint }
            | Self::ExpireSendWait { endpoint }
            | Self::ExpireReceiveWait { endpoint } => *endpoint,
        }
    }

    /// Same operation retargeted to `endpoint % num_endpoints`.
    #[must_use]
    pub fn clamped(self, num_endpoints: usize) -> Self {
        let n = u8::try_from(num_endpoints).unwrap_or(u8::MAX).max(1);
        match self {
            Self::Send { from, content } => Self::Send { from: from % n, content },
            Self::Inject { to, content } => Self::Inject { to: to % n, content },
            Self::Connect { endpoint } => Self::Connect { endpoint: endpoint % n },
            Self::Disconnect { endpoint } => Self::Disconnect { endpoint: endpoint % n },
            Self::SetConnected { endpoint, connected } => {
                Self::SetConnected { endpoint: endpoint % n, connected }
            },
            Self::WaitSent { endpoint } => Self::WaitSent { endpoint: endpoint % n },
            Self::WaitReceived { endpoint } => Self::WaitReceived { endpoint: endpoint % n },
            Self::ExpireSendWait { endpoint } => Self::ExpireSendWait { endpoint: endpoint % n },
            Self::ExpireReceiveWait { endpoint } => {
                Self::ExpireReceiveWait { endpoint: endpoint % n }
            },
        }
    }
}

/// Small message content for testing.
///
/// Compact so generated cases stay small; expanded deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallMessage {
    /// Content seed.
    pub seed: u8,
    /// Length hint (taken modulo 16).
    pub len: u8,
}

impl SmallMessage {
    /// Expand to message text.
    pub fn to_text(&self) -> String {
        (0..self.len % 16).map(|i| char::from(b'a' + self.seed.wrapping_add(i) % 26)).collect()
    }
}

/// Result of applying an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// Operation failed with an expected error.
    Error(OperationError),
}

/// Expected errors that can occur during operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Send on a disconnected endpoint.
    NotConnected,

    /// A waiter of that kind is already registered.
    AlreadyWaiting,

    /// Timeout handler invoked with no waiter registered.
    NoPendingWait,

    /// Endpoint ID out of range.
    InvalidEndpoint,

    /// The link strategy failed for a reason other than the link being down.
    Link,
}

impl OperationResult {
    /// Check if operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Check if operation failed.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

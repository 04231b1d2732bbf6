//! Wait primitive errors.

use thiserror::Error;

use crate::wait::WaitKind;

/// Errors from registering or awaiting a [`Waiter`](crate::Waiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    /// A live waiter of the same kind is already registered on the endpoint.
    #[error("Already waiting for {0}.")]
    AlreadyWaiting(WaitKind),

    /// The timeout handler fired before the awaited event.
    #[error("Timed out waiting for {0}.")]
    TimedOut(WaitKind),

    /// The endpoint was dropped while the waiter was pending.
    #[error("Endpoint dropped while waiting for {0}.")]
    Abandoned(WaitKind),
}

impl WaitError {
    /// Which wait primitive the error belongs to.
    pub fn kind(&self) -> WaitKind {
        match self {
            Self::AlreadyWaiting(kind) | Self::TimedOut(kind) | Self::Abandoned(kind) => *kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            WaitError::AlreadyWaiting(WaitKind::Send).to_string(),
            "Already waiting for send."
        );
        assert_eq!(
            WaitError::AlreadyWaiting(WaitKind::Receive).to_string(),
            "Already waiting for receive."
        );
        assert_eq!(WaitError::TimedOut(WaitKind::Send).to_string(), "Timed out waiting for send.");
        assert_eq!(
            WaitError::TimedOut(WaitKind::Receive).to_string(),
            "Timed out waiting for receive."
        );
    }

    #[test]
    fn kind_is_preserved() {
        assert_eq!(WaitError::Abandoned(WaitKind::Receive).kind(), WaitKind::Receive);
    }
}

//! Pluggable link behavior for simulated endpoints.
//!
//! The endpoint owns fan-out, wait signaling and logging. Whether a connect
//! succeeds, and whether a given message may leave the endpoint, is decided
//! by a [`LinkStrategy`] injected at construction. Tests that need a
//! misbehaving link supply their own strategy instead of subclassing the
//! endpoint.

use courier_core::TransportError;

/// Link state visible to a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkState {
    /// Whether the link is up.
    pub connected: bool,
}

impl Default for LinkState {
    fn default() -> Self {
        Self { connected: true }
    }
}

/// Decides the outcome of connect, disconnect and send on an endpoint.
///
/// Every method has a default that matches [`DirectLink`], so a strategy only
/// overrides what it wants to change.
pub trait LinkStrategy: Send + Sync + 'static {
    /// Brings the link up.
    fn connect(&self, link: &mut LinkState) -> Result<(), TransportError> {
        link.connected = true;
        Ok(())
    }

    /// Takes the link down.
    fn disconnect(&self, link: &mut LinkState) -> Result<(), TransportError> {
        link.connected = false;
        Ok(())
    }

    /// Admits an outbound message, returning the payload peers will receive.
    ///
    /// An error here fails the send. The send-wait is still satisfied.
    fn outbound(&self, link: &LinkState, message: String) -> Result<String, TransportError> {
        if link.connected { Ok(message) } else { Err(TransportError::NotConnected) }
    }
}

/// Reliable link: connect and disconnect always succeed, and messages pass
/// unchanged while connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectLink;

impl LinkStrategy for DirectLink {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_link_starts_connected() {
        assert!(LinkState::default().connected);
    }

    #[test]
    fn direct_link_toggles_state() {
        let mut link = LinkState::default();

        DirectLink.disconnect(&mut link).unwrap();
        assert!(!link.connected);

        DirectLink.connect(&mut link).unwrap();
        assert!(link.connected);
    }

    #[test]
    fn direct_link_rejects_outbound_when_down() {
        let link = LinkState { connected: false };
        let result = DirectLink.outbound(&link, "x".to_string());
        assert_eq!(result, Err(TransportError::NotConnected));
    }

    #[test]
    fn direct_link_passes_payload_through() {
        let link = LinkState::default();
        assert_eq!(DirectLink.outbound(&link, "ping".to_string()).unwrap(), "ping");
    }
}

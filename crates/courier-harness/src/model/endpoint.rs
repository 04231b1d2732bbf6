//! Model endpoint state.
//!
//! Tracks the logical state of one endpoint with no scheduling at all:
//! delivery is instant and waiters are plain flags.

/// Model endpoint.
#[derive(Debug, Clone)]
pub struct ModelEndpoint {
    connected: bool,
    inbox: Vec<String>,
    waiting_send: bool,
    waiting_receive: bool,
    waits_resolved: usize,
    waits_expired: usize,
}

impl Default for ModelEndpoint {
    fn default() -> Self {
        Self {
            connected: true,
            inbox: Vec::new(),
            waiting_send: false,
            waiting_receive: false,
            waits_resolved: 0,
            waits_expired: 0,
        }
    }
}

impl ModelEndpoint {
    /// Create a connected endpoint with an empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link state.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Messages received, in order.
    pub fn inbox(&self) -> &[String] {
        &self.inbox
    }

    /// Waiters that resolved successfully.
    pub fn waits_resolved(&self) -> usize {
        self.waits_resolved
    }

    /// Waiters rejected by a timeout.
    pub fn waits_expired(&self) -> usize {
        self.waits_expired
    }

    pub(super) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Returns false if a send waiter was already registered.
    pub(super) fn wait_sent(&mut self) -> bool {
        !std::mem::replace(&mut self.waiting_send, true)
    }

    /// Returns false if a receive waiter was already registered.
    pub(super) fn wait_received(&mut self) -> bool {
        !std::mem::replace(&mut self.waiting_receive, true)
    }

    pub(super) fn send_happened(&mut self) {
        if std::mem::take(&mut self.waiting_send) {
            self.waits_resolved += 1;
        }
    }

    pub(super) fn receive(&mut self, message: String) {
        self.inbox.push(message);
        if std::mem::take(&mut self.waiting_receive) {
            self.waits_resolved += 1;
        }
    }

    /// Returns false if no send waiter was registered.
    pub(super) fn expire_send(&mut self) -> bool {
        let expired = std::mem::take(&mut self.waiting_send);
        self.waits_expired += usize::from(expired);
        expired
    }

    /// Returns false if no receive waiter was registered.
    pub(super) fn expire_receive(&mut self) -> bool {
        let expired = std::mem::take(&mut self.waiting_receive);
        self.waits_expired += usize::from(expired);
        expired
    }
}

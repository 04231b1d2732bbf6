//! Transport abstraction for message-oriented links.
//!
//! A transport carries discrete text messages between two endpoints. Protocol
//! code holds a `Transport` and never learns whether it is talking to a real
//! socket or an in-process simulation.
//!
//! # Inbound messages
//!
//! Inbound messages are delivered to observers obtained from
//! [`Transport::subscribe`]. Each subscription is an independent queue: every
//! live subscription sees every message received after it was created, in
//! arrival order.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::TransportError;

/// Message-oriented, connection-aware transport.
///
/// # Guarantees
///
/// - Ordering: messages sent from one endpoint arrive in send order
/// - Failure: a send on a disconnected link returns an error and delivers
///   nothing
/// - Asynchrony: no inbound message is observable before the sending call has
///   yielded to the scheduler
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Short identifier of the wire protocol, e.g. `"WSS"`.
    fn protocol(&self) -> &'static str;

    /// Establishes the link.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Tears down the link.
    async fn disconnect(&self) -> Result<(), TransportError>;

    /// Current link state. Never blocks.
    fn is_connected(&self) -> bool;

    /// Sends one message.
    ///
    /// # Errors
    ///
    /// - [`TransportError::NotConnected`] if the link is down
    /// - [`TransportError::Link`] if the implementation refuses the message
    async fn send(&self, message: &str) -> Result<(), TransportError>;

    /// Registers a new observer of inbound messages.
    fn subscribe(&self) -> Subscription;
}

/// Handle onto a stream of inbound messages.
///
/// Dropping the subscription unregisters it; the transport prunes closed
/// subscriptions the next time it publishes.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<String>,
}

impl Subscription {
    /// Creates a connected sender/subscription pair.
    ///
    /// Transports keep the sender and publish into it.
    pub fn channel() -> (mpsc::UnboundedSender<String>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }

    /// Waits for the next message.
    ///
    /// Returns `None` once the transport has been dropped and every queued
    /// message has been drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Takes the next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<String> {
        self.receiver.try_recv().ok()
    }

    /// Drains every message that is already queued.
    pub fn drain(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

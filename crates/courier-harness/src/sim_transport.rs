//! In-process simulated transport endpoint.

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use courier_core::{Logger, Subscription, Transport, TransportConfig, TransportError};
use tokio::sync::mpsc;

use crate::{
    WaitError,
    link::{DirectLink, LinkState, LinkStrategy},
    wait::{WaitKind, WaitSlot, WaitTicket, Waiter},
};

/// Protocol identifier reported by [`SimTransport`].
pub const PROTOCOL: &str = "FAKE";

/// Counters kept by each endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Sends that were admitted and fanned out to peers.
    pub sent: u64,
    /// Sends that failed (link down or refused by the strategy).
    pub failed: u64,
    /// Messages received, from peers or injected.
    pub received: u64,
}

/// Simulated transport endpoint with deterministic waitpoints.
///
/// This transport provides:
///
/// - **Direct delivery**: messages go straight to every registered peer, in
///   the order peers were added. No loss, latency or reordering.
/// - **Deferred effects**: `send` decides and logs when first polled, then
///   yields to the scheduler before delivering or failing. Each peer receives
///   on its own spawned task, so no peer observes the message inline.
/// - **Waitpoints**: [`wait_sent`](Self::wait_sent) and
///   [`wait_received`](Self::wait_received) let a test await "the next send"
///   or "the next receive" instead of polling.
///
/// `SimTransport` is a handle; clones share one endpoint. An endpoint keeps
/// its peers alive, so a peer keeps receiving after the test drops its last
/// handle. Endpoints wired to each other form a cycle and live until the
/// process exits.
///
/// # Runtime
///
/// Sends must run inside a tokio runtime. Delivery order is only fully
/// deterministic on a current-thread runtime (the `#[tokio::test]` default).
///
/// # Example
///
/// ```rust,ignore
/// let a = SimTransport::new(NullLogger, TransportConfig::default());
/// let b = SimTransport::new(NullLogger, TransportConfig::default());
/// a.add_peer(&b);
///
/// let mut inbox = b.subscribe();
/// let received = b.wait_received()?;
///
/// a.send("ping").await?;
/// received.await?;
/// assert_eq!(inbox.try_recv().as_deref(), Some("ping"));
/// ```
#[derive(Clone)]
pub struct SimTransport {
    pub(crate) shared: Arc<Shared>,
}

pub(crate) struct Shared {
    logger: Box<dyn Logger>,
    link: Box<dyn LinkStrategy>,
    config: TransportConfig,
    state: Mutex<State>,
    /// Serializes sends on this endpoint (tokio's mutex is FIFO).
    send_order: tokio::sync::Mutex<()>,
    in_flight: AtomicUsize,
}

struct State {
    identity: Option<String>,
    link: LinkState,
    peers: Vec<Arc<Shared>>,
    subscribers: Vec<mpsc::UnboundedSender<String>>,
    sent: WaitSlot,
    received: WaitSlot,
    stats: LinkStats,
}

impl State {
    fn slot(&mut self, kind: WaitKind) -> &mut WaitSlot {
        match kind {
            WaitKind::Send => &mut self.sent,
            WaitKind::Receive => &mut self.received,
        }
    }

    fn prefix(&self) -> String {
        self.identity.as_deref().map(|id| format!("{id} ")).unwrap_or_default()
    }
}

impl SimTransport {
    /// Creates a connected endpoint with a [`DirectLink`].
    ///
    /// `config` is retained but never consulted.
    pub fn new(logger: impl Logger, config: TransportConfig) -> Self {
        Self::with_link(logger, config, DirectLink)
    }

    /// Creates a connected endpoint whose link behavior is decided by `link`.
    pub fn with_link(logger: impl Logger, config: TransportConfig, link: impl LinkStrategy) -> Self {
        let state = State {
            identity: None,
            link: LinkState::default(),
            peers: Vec::new(),
            subscribers: Vec::new(),
            sent: WaitSlot::new(WaitKind::Send),
            received: WaitSlot::new(WaitKind::Receive),
            stats: LinkStats::default(),
        };

        Self {
            shared: Arc::new(Shared {
                logger: Box::new(logger),
                link: Box::new(link),
                config,
                state: Mutex::new(state),
                send_order: tokio::sync::Mutex::new(()),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Sets the label prefixed to this endpoint's diagnostic lines.
    pub fn set_id(&self, id: impl Into<String>) {
        self.shared.state().identity = Some(id.into());
    }

    /// Current diagnostic label.
    pub fn id(&self) -> Option<String> {
        self.shared.state().identity.clone()
    }

    /// Construction options, as passed in.
    pub fn config(&self) -> &TransportConfig {
        &self.shared.config
    }

    /// Brings the link up through the link strategy.
    pub async fn connect(&self) -> Result<(), TransportError> {
        let result = {
            let mut state = self.shared.state();
            self.shared.link.connect(&mut state.link)
        };
        tracing::debug!(id = ?self.id(), ok = result.is_ok(), "connect");

        tokio::task::yield_now().await;
        result
    }

    /// Takes the link down through the link strategy.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        let result = {
            let mut state = self.shared.state();
            self.shared.link.disconnect(&mut state.link)
        };
        tracing::debug!(id = ?self.id(), ok = result.is_ok(), "disconnect");

        tokio::task::yield_now().await;
        result
    }

    /// Current link state.
    pub fn is_connected(&self) -> bool {
        self.shared.state().link.connected
    }

    /// Overrides the link state directly, bypassing the link strategy.
    ///
    /// Simulates the link dropping (or recovering) underneath the protocol.
    pub fn set_connected(&self, connected: bool) {
        self.shared.state().link.connected = connected;
    }

    /// Appends `peer` to the delivery list.
    ///
    /// No reverse edge is added. Adding the same peer twice delivers twice.
    pub fn add_peer(&self, peer: &Self) {
        self.shared.state().peers.push(Arc::clone(&peer.shared));
    }

    /// Number of registered peers.
    pub fn peer_count(&self) -> usize {
        self.shared.state().peers.len()
    }

    /// Sends `message` to every peer.
    ///
    /// The link strategy's verdict is taken, and an admitted message logged,
    /// on the first poll. The call then yields once before acting on it, so
    /// a link change made after the send was issued does not affect it.
    ///
    /// If the strategy refused the message (by default: the link is down)
    /// the send-wait is satisfied and the error is returned. Otherwise one
    /// delivery task is spawned per peer, the send-wait is satisfied, and the
    /// call succeeds without waiting for the deliveries to run.
    pub async fn send(&self, message: &str) -> Result<(), TransportError> {
        let (verdict, prefix) = {
            let state = self.shared.state();
            (self.shared.link.outbound(&state.link, message.to_owned()), state.prefix())
        };
        if let Ok(payload) = &verdict {
            self.shared.logger.log(&format!("{prefix}Sending...\n{payload}"));
        }

        let _order = self.shared.send_order.lock().await;
        tokio::task::yield_now().await;

        let payload = match verdict {
            Ok(payload) => payload,
            Err(err) => {
                let mut state = self.shared.state();
                state.stats.failed += 1;
                state.sent.fire();
                drop(state);

                tracing::debug!(id = ?self.id(), %err, "send refused");
                return Err(err);
            },
        };

        let peers = self.shared.state().peers.clone();
        for peer in peers {
            Shared::deliver(peer, payload.clone());
        }

        let mut state = self.shared.state();
        state.stats.sent += 1;
        state.sent.fire();

        Ok(())
    }

    /// Handles one inbound message immediately.
    ///
    /// Publishes to subscribers, logs, then satisfies the receive-wait. Peers
    /// reach this through a deferred task; tests may call it directly to
    /// inject a message.
    pub fn receive(&self, message: &str) {
        self.shared.receive(message);
    }

    /// Registers an observer of inbound messages.
    pub fn subscribe(&self) -> Subscription {
        let (sender, subscription) = Subscription::channel();
        self.shared.state().subscribers.push(sender);
        subscription
    }

    /// Returns a waiter that resolves when the next `send` completes, whether
    /// it succeeds or fails.
    ///
    /// # Errors
    ///
    /// [`WaitError::AlreadyWaiting`] if a live send waiter exists.
    pub fn wait_sent(&self) -> Result<Waiter, WaitError> {
        self.shared.state().sent.register()
    }

    /// Returns a waiter that resolves on the next `receive`.
    ///
    /// # Errors
    ///
    /// [`WaitError::AlreadyWaiting`] if a live receive waiter exists.
    pub fn wait_received(&self) -> Result<Waiter, WaitError> {
        self.shared.state().received.register()
    }

    /// Timeout handler for the send waiter. Returns true if one was pending.
    pub fn expire_send_wait(&self) -> bool {
        self.shared.expire(WaitKind::Send, None)
    }

    /// Timeout handler for the receive waiter. Returns true if one was
    /// pending.
    pub fn expire_receive_wait(&self) -> bool {
        self.shared.expire(WaitKind::Receive, None)
    }

    /// Expires the waiter of `kind` only if it is still the registration
    /// identified by `ticket`.
    pub fn expire_wait(&self, kind: WaitKind, ticket: WaitTicket) -> bool {
        self.shared.expire(kind, Some(ticket))
    }

    /// Returns true if a live waiter of `kind` is registered.
    pub fn is_waiting(&self, kind: WaitKind) -> bool {
        self.shared.state().slot(kind).is_pending()
    }

    /// Snapshot of this endpoint's counters.
    pub fn stats(&self) -> LinkStats {
        self.shared.state().stats
    }

    /// Deliveries scheduled towards this endpoint that have not run yet.
    pub fn pending_deliveries(&self) -> usize {
        self.shared.in_flight.load(Ordering::SeqCst)
    }

    /// Yields until no deliveries towards this endpoint are in flight.
    pub async fn settle(&self) {
        while self.pending_deliveries() > 0 {
            tokio::task::yield_now().await;
        }
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(self: Arc<Self>, message: String) {
        let delivery = InFlight::new(self);
        tokio::spawn(async move {
            delivery.0.receive(&message);
        });
    }

    fn receive(&self, message: &str) {
        let prefix = {
            let mut state = self.state();
            state.subscribers.retain(|sub| sub.send(message.to_owned()).is_ok());
            state.prefix()
        };

        self.logger.log(&format!("{prefix}Receiving...\n{message}"));

        let mut state = self.state();
        state.stats.received += 1;
        state.received.fire();
    }

    fn expire(&self, kind: WaitKind, ticket: Option<WaitTicket>) -> bool {
        let expired = self.state().slot(kind).expire(ticket);
        if expired {
            tracing::debug!(%kind, "wait timed out");
        }
        expired
    }
}

/// Counts one scheduled delivery until dropped, whether the task ran, was
/// aborted, or unwound.
struct InFlight(Arc<Shared>);

impl InFlight {
    fn new(target: Arc<Shared>) -> Self {
        target.in_flight.fetch_add(1, Ordering::SeqCst);
        Self(target)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl fmt::Debug for SimTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state();
        f.debug_struct("SimTransport")
            .field("id", &state.identity)
            .field("connected", &state.link.connected)
            .field("peers", &state.peers.len())
            .field("stats", &state.stats)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for SimTransport {
    fn protocol(&self) -> &'static str {
        PROTOCOL
    }

    async fn connect(&self) -> Result<(), TransportError> {
        Self::connect(self).await
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Self::disconnect(self).await
    }

    fn is_connected(&self) -> bool {
        Self::is_connected(self)
    }

    async fn send(&self, message: &str) -> Result<(), TransportError> {
        Self::send(self, message).await
    }

    fn subscribe(&self) -> Subscription {
        Self::subscribe(self)
    }
}

/// Adds each endpoint as a peer of the other.
pub fn link_bidirectional(a: &SimTransport, b: &SimTransport) {
    a.add_peer(b);
    b.add_peer(a);
}

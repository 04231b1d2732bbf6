//! Real endpoints driven by model operations.

use courier_core::{NullLogger, Subscription, TransportConfig, TransportError};

use crate::{
    SimTransport, WaitError, Waiter,
    model::{EndpointId, ObservableState, Operation, OperationError, OperationResult},
};

struct Node {
    transport: SimTransport,
    inbox: Subscription,
    received: Vec<String>,
    waiters: Vec<Waiter>,
    waits_resolved: usize,
    waits_expired: usize,
}

impl Node {
    /// Moves settled waiters into the tallies.
    fn reap_waiters(&mut self) {
        let mut pending = Vec::with_capacity(self.waiters.len());
        for mut waiter in self.waiters.drain(..) {
            match waiter.try_outcome() {
                None => pending.push(waiter),
                Some(Ok(())) => self.waits_resolved += 1,
                Some(Err(WaitError::TimedOut(_))) => self.waits_expired += 1,
                Some(Err(err)) => tracing::warn!(%err, "unexpected waiter outcome"),
            }
        }
        self.waiters = pending;
    }
}

/// A set of real [`SimTransport`]s wired over a fixed topology.
///
/// Mirrors [`ModelNetwork`](crate::ModelNetwork): same constructor arguments,
/// same operations, same observable state. Every operation is followed by a
/// settle, so in-flight deliveries never straddle two operations.
///
/// Must be driven from a tokio runtime.
pub struct SimWorld {
    nodes: Vec<Node>,
}

impl SimWorld {
    /// Create `num_endpoints` endpoints and add peers for each `(from, to)`
    /// edge, in order. Edges referring to unknown endpoints are ignored.
    pub fn new(num_endpoints: usize, edges: &[(EndpointId, EndpointId)]) -> Self {
        let nodes: Vec<Node> = (0..num_endpoints)
            .map(|i| {
                let transport = SimTransport::new(NullLogger, TransportConfig::default());
                transport.set_id(format!("endpoint-{i}"));
                let inbox = transport.subscribe();
                Node {
                    transport,
                    inbox,
                    received: Vec::new(),
                    waiters: Vec::new(),
                    waits_resolved: 0,
                    waits_expired: 0,
                }
            })
            .collect();

        for &(from, to) in edges {
            if let (Some(a), Some(b)) = (nodes.get(usize::from(from)), nodes.get(usize::from(to)))
            {
                a.transport.add_peer(&b.transport);
            }
        }

        Self { nodes }
    }

    /// Number of endpoints.
    pub fn num_endpoints(&self) -> usize {
        self.nodes.len()
    }

    /// Get an endpoint by ID.
    pub fn transport(&self, id: EndpointId) -> Option<&SimTransport> {
        self.nodes.get(usize::from(id)).map(|n| &n.transport)
    }

    /// Apply an operation, then settle.
    pub async fn apply(&mut self, op: &Operation) -> OperationResult {
        let Some(node) = self.nodes.get_mut(usize::from(op.endpoint())) else {
            return OperationResult::Error(OperationError::InvalidEndpoint);
        };
        let transport = &node.transport;

        let result = match op {
            Operation::Send { content, .. } => {
                link_result(transport.send(&content.to_text()).await)
            },
            Operation::Inject { content, .. } => {
                transport.receive(&content.to_text());
                OperationResult::Ok
            },
            Operation::Connect { .. } => link_result(transport.connect().await),
            Operation::Disconnect { .. } => link_result(transport.disconnect().await),
            Operation::SetConnected { connected, .. } => {
                transport.set_connected(*connected);
                OperationResult::Ok
            },
            Operation::WaitSent { .. } => registered(transport.wait_sent(), &mut node.waiters),
            Operation::WaitReceived { .. } => {
                registered(transport.wait_received(), &mut node.waiters)
            },
            Operation::ExpireSendWait { .. } => expired(transport.expire_send_wait()),
            Operation::ExpireReceiveWait { .. } => expired(transport.expire_receive_wait()),
        };

        self.settle().await;
        result
    }

    /// Yields until no delivery is in flight anywhere in the world.
    pub async fn settle(&self) {
        while self.nodes.iter().any(|n| n.transport.pending_deliveries() > 0) {
            tokio::task::yield_now().await;
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&mut self) -> ObservableState {
        for node in &mut self.nodes {
            let drained = node.inbox.drain();
            node.received.extend(drained);
            node.reap_waiters();
        }

        ObservableState {
            inboxes: self.nodes.iter().map(|n| n.received.clone()).collect(),
            connected: self.nodes.iter().map(|n| n.transport.is_connected()).collect(),
            waits_resolved: self.nodes.iter().map(|n| n.waits_resolved).collect(),
            waits_expired: self.nodes.iter().map(|n| n.waits_expired).collect(),
        }
    }
}

fn link_result(result: Result<(), TransportError>) -> OperationResult {
    match result {
        Ok(()) => OperationResult::Ok,
        Err(TransportError::NotConnected) => OperationResult::Error(OperationError::NotConnected),
        Err(err) => {
            tracing::warn!(%err, "link strategy failure");
            OperationResult::Error(OperationError::Link)
        },
    }
}

fn registered(result: Result<Waiter, WaitError>, waiters: &mut Vec<Waiter>) -> OperationResult {
    match result {
        Ok(waiter) => {
            waiters.push(waiter);
            OperationResult::Ok
        },
        Err(_) => OperationResult::Error(OperationError::AlreadyWaiting),
    }
}

fn expired(was_pending: bool) -> OperationResult {
    if was_pending {
        OperationResult::Ok
    } else {
        OperationResult::Error(OperationError::NoPendingWait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_failures_are_not_reported_as_disconnects() {
        assert_eq!(link_result(Ok(())), OperationResult::Ok);
        assert_eq!(
            link_result(Err(TransportError::NotConnected)),
            OperationResult::Error(OperationError::NotConnected)
        );
        assert_eq!(
            link_result(Err(TransportError::Link { reason: "quota".to_string() })),
            OperationResult::Error(OperationError::Link)
        );
    }
}

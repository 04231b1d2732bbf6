//! Model network - orchestrates endpoints over a fixed topology.
//!
//! The network is the reference against which [`SimWorld`](crate::SimWorld)
//! is verified.

use super::{
    endpoint::ModelEndpoint,
    operation::{EndpointId, Operation, OperationError, OperationResult},
};

/// Observable state for oracle comparison.
///
/// The subset of endpoint state that can be read back from real endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Per-endpoint received messages, in arrival order.
    pub inboxes: Vec<Vec<String>>,
    /// Per-endpoint link state.
    pub connected: Vec<bool>,
    /// Per-endpoint count of waiters that resolved successfully.
    pub waits_resolved: Vec<usize>,
    /// Per-endpoint count of waiters rejected by a timeout.
    pub waits_expired: Vec<usize>,
}

/// Model network - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelNetwork {
    endpoints: Vec<ModelEndpoint>,
    /// Directed peer edges `(from, to)`, in insertion order.
    edges: Vec<(EndpointId, EndpointId)>,
}

impl ModelNetwork {
    /// Create a network of `num_endpoints` endpoints wired by `edges`.
    ///
    /// Edges referring to unknown endpoints are ignored.
    pub fn new(num_endpoints: usize, edges: &[(EndpointId, EndpointId)]) -> Self {
        let endpoints = (0..num_endpoints).map(|_| ModelEndpoint::new()).collect();
        let edges = edges
            .iter()
            .copied()
            .filter(|&(from, to)| usize::from(from.max(to)) < num_endpoints)
            .collect();

        Self { endpoints, edges }
    }

    /// Number of endpoints.
    pub fn num_endpoints(&self) -> usize {
        self.endpoints.len()
    }

    /// Get an endpoint by ID.
    pub fn endpoint(&self, id: EndpointId) -> Option<&ModelEndpoint> {
        self.endpoints.get(usize::from(id))
    }

    /// Peers of `from`, in delivery order.
    pub fn peers(&self, from: EndpointId) -> impl Iterator<Item = EndpointId> + '_ {
        self.edges.iter().filter(move |(f, _)| *f == from).map(|(_, to)| *to)
    }

    /// Apply an operation and return the result.
    ///
    /// Delivery is instant, so the state after each operation is what the
    /// real endpoints show once settled.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let id = op.endpoint();
        let Some(endpoint) = self.endpoints.get_mut(usize::from(id)) else {
            return OperationResult::Error(OperationError::InvalidEndpoint);
        };

        match op {
            Operation::Send { content, .. } => {
                endpoint.send_happened();
                if !endpoint.is_connected() {
                    return OperationResult::Error(OperationError::NotConnected);
                }

                let text = content.to_text();
                let peers: Vec<_> = self.peers(id).collect();
                for peer in peers {
                    self.endpoints[usize::from(peer)].receive(text.clone());
                }
                OperationResult::Ok
            },
            Operation::Inject { content, .. } => {
                endpoint.receive(content.to_text());
                OperationResult::Ok
            },
            Operation::Connect { .. } => {
                endpoint.set_connected(true);
                OperationResult::Ok
            },
            Operation::Disconnect { .. } => {
                endpoint.set_connected(false);
                OperationResult::Ok
            },
            Operation::SetConnected { connected, .. } => {
                endpoint.set_connected(*connected);
                OperationResult::Ok
            },
            Operation::WaitSent { .. } => check(endpoint.wait_sent(), OperationError::AlreadyWaiting),
            Operation::WaitReceived { .. } => {
                check(endpoint.wait_received(), OperationError::AlreadyWaiting)
            },
            Operation::ExpireSendWait { .. } => {
                check(endpoint.expire_send(), OperationError::NoPendingWait)
            },
            Operation::ExpireReceiveWait { .. } => {
                check(endpoint.expire_receive(), OperationError::NoPendingWait)
            },
        }
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            inboxes: self.endpoints.iter().map(|e| e.inbox().to_vec()).collect(),
            connected: self.endpoints.iter().map(ModelEndpoint::is_connected).collect(),
            waits_resolved: self.endpoints.iter().map(ModelEndpoint::waits_resolved).collect(),
            waits_expired: self.endpoints.iter().map(ModelEndpoint::waits_expired).collect(),
        }
    }
}

fn check(ok: bool, err: OperationError) -> OperationResult {
    if ok { OperationResult::Ok } else { OperationResult::Error(err) }
}

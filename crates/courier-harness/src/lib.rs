//! Deterministic simulation harness for Courier transport testing.
//!
//! This crate provides [`SimTransport`], an in-process implementation of the
//! `Transport` trait that delivers messages directly to registered peers on
//! the test's tokio runtime, plus the hooks a test needs to make assertions
//! without polling.
//!
//! # Why an in-process transport?
//!
//! Protocol logic above the transport cares about ordering, failure on a
//! dropped link, and inbound notification. It does not care about sockets.
//! Replacing the socket with direct delivery gives:
//!
//! - **Reproducibility**: on a current-thread runtime every run delivers in
//!   the same order
//! - **Waitpoints**: `wait_sent()` / `wait_received()` resolve on the next
//!   matching event, which a real transport cannot offer
//! - **Link control**: `set_connected()` and pluggable [`LinkStrategy`]s
//!   simulate drops and refusals
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference network with instant delivery.
//! [`SimWorld`] applies the same [`Operation`]s to real endpoints, and the two
//! observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod link;
pub mod model;
mod recording_logger;
mod sim_transport;
mod timer;
pub mod wait;
mod world;

pub use error::WaitError;
pub use link::{DirectLink, LinkState, LinkStrategy};
pub use model::{
    EndpointId, ModelEndpoint, ModelNetwork, ObservableState, Operation, OperationError,
    OperationResult, SmallMessage,
};
pub use recording_logger::RecordingLogger;
pub use sim_transport::{LinkStats, PROTOCOL, SimTransport, link_bidirectional};
pub use timer::spawn_wait_timeout;
pub use wait::{WaitKind, WaitTicket, Waiter};
pub use world::SimWorld;

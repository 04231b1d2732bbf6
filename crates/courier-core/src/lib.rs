//! Transport contract for Courier.
//!
//! This crate defines the seams that protocol code is written against:
//!
//! - [`Transport`]: connect, disconnect, send, and inbound message
//!   subscriptions
//! - [`Logger`]: fire-and-forget diagnostic sink handed to transports at
//!   construction
//! - [`TransportConfig`]: free-form construction options
//!
//! It contains no I/O. Implementations live elsewhere (the simulated endpoint
//! is in `courier-harness`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod log;
pub mod transport;

pub use config::TransportConfig;
pub use error::TransportError;
pub use log::{Logger, NullLogger, TracingLogger};
pub use transport::{Subscription, Transport};

//! Reference model for model-based testing.
//!
//! The model is a simplified network with instant delivery and no scheduler.
//! It serves as the oracle against which real endpoints are verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Observable only: Captures what a test can see, not how it happens
//! - Deterministic: Same inputs produce same outputs

mod endpoint;
mod network;
pub mod operation;

pub use endpoint::ModelEndpoint;
pub use network::{ModelNetwork, ObservableState};
pub use operation::{EndpointId, Operation, OperationError, OperationResult, SmallMessage};

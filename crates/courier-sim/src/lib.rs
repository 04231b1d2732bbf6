//! Ping/pong exchange between two simulated endpoints.
//!
//! `alice` sends a ping per round, `bob` answers each ping with a pong. Both
//! sides use waitpoints rather than polling, so a run is fully deterministic.
//! Alice's link can be dropped part-way to watch sends fail.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;

use courier_core::{TracingLogger, TransportConfig, TransportError};
use courier_harness::{LinkStats, SimTransport, link_bidirectional};
pub use error::SimError;

/// Exchange parameters.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Number of ping rounds.
    pub rounds: u32,
    /// Ping payload; the round number is appended.
    pub message: String,
    /// Round at which alice's link drops, if any.
    pub drop_after: Option<u32>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self { rounds: 3, message: "ping".to_string(), drop_after: None }
    }
}

/// Outcome of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeReport {
    /// Rounds where the pong made it back.
    pub completed: u32,
    /// Rounds where alice's ping was refused.
    pub failed: u32,
    /// Pongs alice received, in order.
    pub replies: Vec<String>,
    /// Alice's counters.
    pub alice: LinkStats,
    /// Bob's counters.
    pub bob: LinkStats,
}

/// Runs the exchange on the current tokio runtime.
pub async fn run_exchange(config: &ExchangeConfig) -> Result<ExchangeReport, SimError> {
    let alice = SimTransport::new(TracingLogger, TransportConfig::default());
    let bob = SimTransport::new(TracingLogger, TransportConfig::default());
    alice.set_id("alice");
    bob.set_id("bob");
    link_bidirectional(&alice, &bob);

    let mut alice_inbox = alice.subscribe();
    let mut bob_inbox = bob.subscribe();

    let mut completed = 0;
    let mut failed = 0;
    let mut replies = Vec::new();

    for round in 0..config.rounds {
        if config.drop_after == Some(round) {
            tracing::warn!(round, "dropping alice's link");
            alice.set_connected(false);
        }

        let received = bob.wait_received()?;
        match alice.send(&format!("{} #{round}", config.message)).await {
            Ok(()) => {},
            Err(TransportError::NotConnected) => {
                tracing::debug!(round, "ping refused");
                failed += 1;
                continue;
            },
            Err(err) => return Err(err.into()),
        }
        received.await?;

        let ping = bob_inbox.recv().await.ok_or(SimError::InboxClosed { endpoint: "bob" })?;

        let replied = alice.wait_received()?;
        bob.send(&format!("pong ({ping})")).await?;
        replied.await?;

        let pong = alice_inbox.recv().await.ok_or(SimError::InboxClosed { endpoint: "alice" })?;
        tracing::info!(round, %pong, "round complete");

        replies.push(pong);
        completed += 1;
    }

    Ok(ExchangeReport { completed, failed, replies, alice: alice.stats(), bob: bob.stats() })
}

//! Fuzz target for [`SimWorld`] operation sequences
//!
//! Real endpoints must never drift from the reference model, whatever the
//! topology and whatever the test does to them.
//!
//! # Strategy
//!
//! - Topology: Arbitrary directed edges, including self-loops and duplicates
//! - Link churn: Connect, disconnect and forced link state in any order
//! - Waitpoints: Registrations, double registrations and timeouts
//!   interleaved with traffic
//!
//! # Invariants
//!
//! - Every operation returns the same result as the model
//! - Inboxes, link state and waiter tallies match the model after each step
//! - A send on a down link never reaches a peer
//! - NEVER panic on any operation sequence

#![no_main]

use arbitrary::Arbitrary;
use courier_harness::{EndpointId, ModelNetwork, Operation, SimWorld};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    num_endpoints: u8,
    edges: Vec<(EndpointId, EndpointId)>,
    ops: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let num_endpoints = usize::from(input.num_endpoints % 4) + 1;
    let edges: Vec<_> = input.edges.into_iter().take(16).collect();

    let mut model = ModelNetwork::new(num_endpoints, &edges);
    let mut real = SimWorld::new(num_endpoints, &edges);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");

    runtime.block_on(async {
        for op in input.ops.into_iter().take(256) {
            let op = op.clamped(num_endpoints);

            let model_result = model.apply(&op);
            let real_result = real.apply(&op).await;
            assert_eq!(model_result, real_result, "result diverged on {op:?}");

            assert_eq!(
                model.observable_state(),
                real.observable_state(),
                "state diverged after {op:?}"
            );
        }
    });
});

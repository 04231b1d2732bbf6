//! External timer for wait primitives.
//!
//! Endpoints never time out a waiter on their own. A test that wants a bound
//! arms a timer here; when it fires it calls the endpoint's timeout handler
//! for exactly the registration it was armed for.

use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;

use crate::{SimTransport, Waiter};

/// Spawns a task that expires `waiter` on `transport` after `after`.
///
/// The task holds the endpoint weakly. It resolves to `true` if it expired
/// the waiter, and to `false` if the waiter had already settled, was
/// replaced, or the endpoint was dropped. Uses tokio time, so a paused test
/// clock drives it.
pub fn spawn_wait_timeout(
    transport: &SimTransport,
    waiter: &Waiter,
    after: Duration,
) -> JoinHandle<bool> {
    let endpoint = Arc::downgrade(&transport.shared);
    let kind = waiter.kind();
    let ticket = waiter.ticket();

    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        endpoint
            .upgrade()
            .is_some_and(|shared| SimTransport::from_shared(shared).expire_wait(kind, ticket))
    })
}

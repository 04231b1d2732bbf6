//! End-to-end scenarios for the simulated transport.
//!
//! These tests validate:
//! - Delivery to peers, in send order and peer order
//! - Failure of sends on a dropped link, decided when the send is issued
//! - Wait primitives resolving once per event
//! - Direct injection through the receive path

use std::{
    pin::pin,
    task::{Context, Poll, Waker},
};

use courier_core::{NullLogger, Transport, TransportConfig, TransportError};
use courier_harness::{
    LinkStats, RecordingLogger, SimTransport, WaitError, WaitKind, link_bidirectional,
};

fn endpoint(id: &str) -> SimTransport {
    let transport = SimTransport::new(NullLogger, TransportConfig::default());
    transport.set_id(id);
    transport
}

#[tokio::test]
async fn ping_reaches_peer_and_resolves_both_waiters() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);

    let mut inbox = b.subscribe();
    let sent = a.wait_sent().unwrap();
    let received = b.wait_received().unwrap();

    a.send("ping").await.unwrap();

    sent.await.unwrap();
    received.await.unwrap();
    assert_eq!(inbox.try_recv().as_deref(), Some("ping"));
    assert_eq!(inbox.try_recv(), None);
}

#[tokio::test]
async fn disconnected_send_fails_and_delivers_nothing() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut inbox = b.subscribe();

    a.disconnect().await.unwrap();
    assert!(!a.is_connected());

    let err = a.send("x").await.unwrap_err();
    assert_eq!(err, TransportError::NotConnected);
    assert_eq!(err.to_string(), "Not connected.");

    b.settle().await;
    assert_eq!(b.pending_deliveries(), 0);
    assert_eq!(inbox.try_recv(), None);
    assert_eq!(b.stats().received, 0);
}

#[tokio::test]
async fn wait_sent_resolves_on_failed_send() {
    let a = endpoint("a");
    a.set_connected(false);

    let sent = a.wait_sent().unwrap();
    let (result, waited) = tokio::join!(a.send("x"), sent);

    assert_eq!(result, Err(TransportError::NotConnected));
    assert_eq!(waited, Ok(()));
    assert!(!a.is_waiting(WaitKind::Send));
}

#[tokio::test]
async fn second_wait_sent_is_rejected_immediately() {
    let a = endpoint("a");

    let _first = a.wait_sent().unwrap();
    let err = a.wait_sent().unwrap_err();

    assert_eq!(err, WaitError::AlreadyWaiting(WaitKind::Send));
    assert_eq!(err.to_string(), "Already waiting for send.");
}

#[tokio::test]
async fn second_wait_received_is_rejected_immediately() {
    let a = endpoint("a");

    let _first = a.wait_received().unwrap();
    let err = a.wait_received().unwrap_err();

    assert_eq!(err.to_string(), "Already waiting for receive.");
}

#[tokio::test]
async fn wait_sent_is_single_shot() {
    let a = endpoint("a");

    let first = a.wait_sent().unwrap();
    a.send("one").await.unwrap();
    first.await.unwrap();

    // A fresh registration waits for the next send, not the previous one
    let mut second = a.wait_sent().unwrap();
    tokio::task::yield_now().await;
    assert_eq!(second.try_outcome(), None);

    a.send("two").await.unwrap();
    assert_eq!(second.try_outcome(), Some(Ok(())));
}

#[tokio::test]
async fn send_without_waiter_leaves_slot_free() {
    let a = endpoint("a");
    a.send("unobserved").await.unwrap();

    let mut waiter = a.wait_sent().unwrap();
    assert_eq!(waiter.try_outcome(), None);
}

#[tokio::test]
async fn injected_receive_resolves_waiter() {
    let b = endpoint("b");
    let mut inbox = b.subscribe();
    let received = b.wait_received().unwrap();

    b.receive("external");

    received.await.unwrap();
    assert_eq!(inbox.try_recv().as_deref(), Some("external"));
    assert_eq!(b.stats().received, 1);
}

#[tokio::test]
async fn link_drop_and_recovery() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut inbox = b.subscribe();

    a.set_connected(false);
    assert!(a.send("lost").await.is_err());

    a.set_connected(true);
    a.send("kept").await.unwrap();
    b.settle().await;

    assert_eq!(inbox.drain(), vec!["kept"]);
    assert_eq!(a.stats(), LinkStats { sent: 1, failed: 1, received: 0 });
}

#[tokio::test]
async fn reconnect_restores_delivery() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut inbox = b.subscribe();

    a.disconnect().await.unwrap();
    a.connect().await.unwrap();
    a.send("back").await.unwrap();
    b.settle().await;

    assert_eq!(inbox.drain(), vec!["back"]);
}

#[tokio::test]
async fn sends_arrive_in_order() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut inbox = b.subscribe();

    let (r1, r2, r3) = tokio::join!(a.send("1"), a.send("2"), a.send("3"));
    assert!(r1.is_ok() && r2.is_ok() && r3.is_ok());
    b.settle().await;

    assert_eq!(inbox.drain(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn peers_receive_in_insertion_order() {
    let logger = RecordingLogger::new();
    let a = endpoint("a");
    let b = SimTransport::new(logger.clone(), TransportConfig::default());
    let c = SimTransport::new(logger.clone(), TransportConfig::default());
    b.set_id("b");
    c.set_id("c");
    a.add_peer(&c);
    a.add_peer(&b);

    a.send("hi").await.unwrap();
    b.settle().await;
    c.settle().await;

    assert_eq!(logger.lines(), vec!["c Receiving...\nhi", "b Receiving...\nhi"]);
}

#[tokio::test]
async fn add_peer_is_one_directional() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut a_inbox = a.subscribe();

    b.send("reply").await.unwrap();
    tokio::task::yield_now().await;

    assert_eq!(a.pending_deliveries(), 0);
    assert_eq!(a_inbox.try_recv(), None);
    assert_eq!(b.peer_count(), 0);
}

#[tokio::test]
async fn bidirectional_link_round_trip() {
    let a = endpoint("a");
    let b = endpoint("b");
    link_bidirectional(&a, &b);

    let mut a_inbox = a.subscribe();
    let mut b_inbox = b.subscribe();

    let received = b.wait_received().unwrap();
    a.send("ping").await.unwrap();
    received.await.unwrap();
    assert_eq!(b_inbox.try_recv().as_deref(), Some("ping"));

    let received = a.wait_received().unwrap();
    b.send("pong").await.unwrap();
    received.await.unwrap();
    assert_eq!(a_inbox.try_recv().as_deref(), Some("pong"));
}

#[tokio::test]
async fn every_subscription_sees_every_message() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut first = b.subscribe();
    let mut second = b.subscribe();

    a.send("m").await.unwrap();

    assert_eq!(first.recv().await.as_deref(), Some("m"));
    assert_eq!(second.recv().await.as_deref(), Some("m"));
}

#[tokio::test]
async fn duplicate_peer_receives_twice() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    a.add_peer(&b);
    let mut inbox = b.subscribe();

    a.send("dup").await.unwrap();
    b.settle().await;

    assert_eq!(inbox.drain(), vec!["dup", "dup"]);
}

#[tokio::test]
async fn usable_through_transport_trait() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);

    let transport: Box<dyn Transport> = Box::new(a.clone());
    let mut inbox = Transport::subscribe(&b);

    assert_eq!(transport.protocol(), "FAKE");
    assert!(transport.is_connected());

    transport.send("via trait").await.unwrap();
    assert_eq!(inbox.recv().await.as_deref(), Some("via trait"));

    transport.disconnect().await.unwrap();
    assert!(!a.is_connected());
    assert_eq!(transport.send("nope").await, Err(TransportError::NotConnected));
}

#[tokio::test]
async fn disconnected_send_still_yields_before_failing() {
    let a = endpoint("a");
    a.set_connected(false);
    let sent = a.wait_sent().unwrap();

    let mut send = pin!(a.send("x"));
    let mut cx = Context::from_waker(Waker::noop());
    assert_eq!(send.as_mut().poll(&mut cx), Poll::Pending);
    assert_eq!(a.stats().failed, 0);
    assert!(a.is_waiting(WaitKind::Send));

    assert_eq!(send.await, Err(TransportError::NotConnected));
    sent.await.unwrap();
}

#[tokio::test]
async fn link_drop_after_issue_does_not_fail_send() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut inbox = b.subscribe();

    let (result, ()) = tokio::join!(a.send("x"), async { a.set_connected(false) });

    assert_eq!(result, Ok(()));
    assert!(!a.is_connected());
    b.settle().await;
    assert_eq!(inbox.try_recv().as_deref(), Some("x"));
}

#[tokio::test]
async fn link_recovery_after_issue_does_not_rescue_send() {
    let a = endpoint("a");
    a.set_connected(false);

    let (result, ()) = tokio::join!(a.send("x"), async { a.set_connected(true) });

    assert_eq!(result, Err(TransportError::NotConnected));
    assert_eq!(a.stats(), LinkStats { sent: 0, failed: 1, received: 0 });
}

#[tokio::test]
async fn send_wait_fires_before_peer_receives() {
    let a = endpoint("a");
    let b = endpoint("b");
    a.add_peer(&b);
    let mut inbox = b.subscribe();
    let mut sent = a.wait_sent().unwrap();
    let mut received = b.wait_received().unwrap();

    a.send("ping").await.unwrap();

    assert_eq!(sent.try_outcome(), Some(Ok(())));
    assert_eq!(received.try_outcome(), None);
    assert_eq!(inbox.try_recv(), None);

    received.await.unwrap();
    assert_eq!(inbox.try_recv().as_deref(), Some("ping"));
}

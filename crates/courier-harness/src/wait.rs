//! Single-shot wait primitives.
//!
//! A [`Waiter`] resolves the next time its endpoint performs the matching
//! event. Each endpoint holds one slot per [`WaitKind`]; a slot holds at most
//! one live registration.
//!
//! # Invariants
//!
//! - Registration never overwrites a live waiter
//! - A registration is cleared exactly once: fired, expired, or abandoned
//! - A waiter whose handle has been dropped no longer occupies its slot

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::WaitError;

/// Event a waiter is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitKind {
    /// Completion of the next `send()` attempt.
    Send,
    /// The next `receive()`.
    Receive,
}

impl fmt::Display for WaitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send"),
            Self::Receive => write!(f, "receive"),
        }
    }
}

/// Identifies one registration within a slot.
///
/// Timers hold a ticket so a late timeout cannot expire a newer waiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitTicket(u64);

type Outcome = Result<(), WaitError>;

/// Future returned by `wait_sent()` / `wait_received()`.
///
/// Resolves to `Ok(())` when the event happens, or to
/// [`WaitError::TimedOut`] / [`WaitError::Abandoned`].
#[derive(Debug)]
#[must_use = "dropping a waiter unregisters it"]
pub struct Waiter {
    kind: WaitKind,
    ticket: WaitTicket,
    receiver: oneshot::Receiver<Outcome>,
}

impl Waiter {
    /// Event this waiter is tied to.
    pub fn kind(&self) -> WaitKind {
        self.kind
    }

    /// Ticket of this registration.
    pub fn ticket(&self) -> WaitTicket {
        self.ticket
    }

    /// Returns the outcome if the waiter has already settled.
    ///
    /// Once this returns `Some`, the waiter is spent and must not be awaited.
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(WaitError::Abandoned(self.kind))),
        }
    }
}

impl Future for Waiter {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let kind = self.kind;
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(WaitError::Abandoned(kind))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(Debug)]
struct Registration {
    ticket: WaitTicket,
    resolve: oneshot::Sender<Outcome>,
}

/// Per-endpoint slot for one kind of waiter.
#[derive(Debug)]
pub(crate) struct WaitSlot {
    kind: WaitKind,
    next_ticket: u64,
    pending: Option<Registration>,
}

impl WaitSlot {
    pub(crate) fn new(kind: WaitKind) -> Self {
        Self { kind, next_ticket: 0, pending: None }
    }

    /// Returns true if a live waiter occupies the slot.
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|r| !r.resolve.is_closed())
    }

    pub(crate) fn register(&mut self) -> Result<Waiter, WaitError> {
        if self.is_pending() {
            return Err(WaitError::AlreadyWaiting(self.kind));
        }

        let ticket = WaitTicket(self.next_ticket);
        self.next_ticket += 1;

        let (resolve, receiver) = oneshot::channel();
        self.pending = Some(Registration { ticket, resolve });

        Ok(Waiter { kind: self.kind, ticket, receiver })
    }

    /// Resolves the live waiter, if any. Returns true if one was resolved.
    pub(crate) fn fire(&mut self) -> bool {
        self.settle(None, Ok(()))
    }

    /// Rejects the live waiter with a timeout.
    ///
    /// With `Some(ticket)`, only that registration is expired.
    pub(crate) fn expire(&mut self, ticket: Option<WaitTicket>) -> bool {
        let kind = self.kind;
        self.settle(ticket, Err(WaitError::TimedOut(kind)))
    }

    fn settle(&mut self, ticket: Option<WaitTicket>, outcome: Outcome) -> bool {
        let matches = match (&self.pending, ticket) {
            (Some(reg), Some(ticket)) => reg.ticket == ticket,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !matches {
            return false;
        }

        self.pending.take().is_some_and(|reg| reg.resolve.send(outcome).is_ok())
    }
}

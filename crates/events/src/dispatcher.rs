//! Event dispatch abstraction (mechanics only).
//!
//! The dispatcher is the seam between the order-creation core and downstream
//! consumers (payment, inventory, projections). The core guarantees only that
//! events exist and arrive in the order they were raised (creation events
//! before transition events); delivery guarantees are the dispatcher's
//! responsibility. Consumers must tolerate at-least-once delivery.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to a dispatched event stream.
///
/// Each subscription gets a copy of every dispatched event (broadcast
/// semantics). Subscriptions are designed for single-threaded consumption;
/// events arrive in dispatch order per publisher.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next event is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for an event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic post-commit event dispatcher (pub/sub abstraction).
///
/// Transport-agnostic: works with in-memory channels, a mediator, or a
/// message broker. `dispatch()` failures are surfaced to the caller; since
/// the aggregate state is already persisted by the time events are
/// dispatched, retrying dispatch is safe (at-least-once).
pub trait EventDispatcher<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn dispatch(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, D> EventDispatcher<M> for Arc<D>
where
    D: EventDispatcher<M> + ?Sized,
{
    type Error = D::Error;

    fn dispatch(&self, message: M) -> Result<(), Self::Error> {
        (**self).dispatch(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}

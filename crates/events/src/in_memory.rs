//! In-memory event dispatcher for tests/dev.

use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::dispatcher::{EventDispatcher, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryDispatchError {
    /// Dispatch failed due to internal lock poisoning.
    #[error("dispatcher lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub dispatcher.
///
/// - No IO / no async
/// - Best-effort fan-out
/// - At-least-once acceptable (subscribers must be idempotent)
#[derive(Debug)]
pub struct InMemoryDispatcher<M> {
    subscribers: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryDispatcher<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for InMemoryDispatcher<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventDispatcher<M> for InMemoryDispatcher<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryDispatchError;

    fn dispatch(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryDispatchError::Poisoned)?;

        // Drop any dead subscribers while dispatching.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive events until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_fans_out_to_all_subscribers() {
        let dispatcher: InMemoryDispatcher<u32> = InMemoryDispatcher::new();
        let sub_a = dispatcher.subscribe();
        let sub_b = dispatcher.subscribe();

        dispatcher.dispatch(7).unwrap();

        assert_eq!(sub_a.try_recv().unwrap(), 7);
        assert_eq!(sub_b.try_recv().unwrap(), 7);
    }

    #[test]
    fn dispatch_preserves_order_per_subscriber() {
        let dispatcher: InMemoryDispatcher<u32> = InMemoryDispatcher::new();
        let sub = dispatcher.subscribe();

        for n in 0..5 {
            dispatcher.dispatch(n).unwrap();
        }

        for n in 0..5 {
            assert_eq!(sub.try_recv().unwrap(), n);
        }
    }

    #[test]
    fn recv_returns_buffered_events() {
        let dispatcher: InMemoryDispatcher<u32> = InMemoryDispatcher::new();
        let sub = dispatcher.subscribe();

        dispatcher.dispatch(42).unwrap();

        assert_eq!(sub.recv().unwrap(), 42);
    }

    #[test]
    fn recv_timeout_elapses_on_an_empty_subscription() {
        let dispatcher: InMemoryDispatcher<u32> = InMemoryDispatcher::new();
        let sub = dispatcher.subscribe();

        dispatcher.dispatch(42).unwrap();
        assert_eq!(sub.recv_timeout(std::time::Duration::from_secs(1)).unwrap(), 42);

        let err = sub.recv_timeout(std::time::Duration::from_millis(10));
        assert!(err.is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let dispatcher: InMemoryDispatcher<u32> = InMemoryDispatcher::new();
        let sub = dispatcher.subscribe();
        drop(sub);

        // Dispatch succeeds even with no live subscribers.
        dispatcher.dispatch(1).unwrap();
    }
}

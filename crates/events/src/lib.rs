//! Domain events and their post-commit dispatch contract.
//!
//! Aggregates queue events while mutating in memory; after the unit of work
//! commits, the application layer drains the queues and hands the events to a
//! dispatcher. This crate defines the event contract, the dispatcher
//! abstraction, and an in-memory dispatcher for tests/dev.

pub mod dispatcher;
pub mod event;
pub mod in_memory;

pub use dispatcher::{EventDispatcher, Subscription};
pub use event::Event;
pub use in_memory::{InMemoryDispatchError, InMemoryDispatcher};

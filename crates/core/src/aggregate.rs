//! Aggregate root trait for state-based domain models with deferred events.

/// Aggregate root marker + minimal interface.
///
/// Aggregates here are **state-based**: operations on the root mutate state
/// in memory and append domain events describing what happened. The events
/// stay queued on the aggregate until the surrounding transaction commits,
/// at which point the application layer drains them for dispatch (outbox-style
/// ordering: nothing is published for state that was never persisted).
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Domain event type raised by this aggregate.
    type Event: Clone + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Incremented once per raised domain event; storage uses it for
    /// optimistic concurrency checks.
    fn version(&self) -> u64;

    /// Events raised since the last drain, in the order they were raised.
    fn pending_events(&self) -> &[Self::Event];

    /// Take ownership of the pending events, leaving the queue empty.
    ///
    /// Call only after the unit of work has committed.
    fn drain_events(&mut self) -> Vec<Self::Event>;
}

/// Optimistic concurrency expectation for an aggregate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (useful for idempotent writes, migrations, etc.).
    Any,
    /// Require the aggregate to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}

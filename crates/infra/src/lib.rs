//! Infrastructure implementations of the order-creation ports.
//!
//! In-memory persistence with unit-of-work commit semantics (tests/dev) and
//! a static identity service. A SQL-backed store would implement the same
//! `orderflow-app` traits.

pub mod identity;
pub mod in_memory;

mod integration_tests;

pub use identity::StaticIdentity;
pub use in_memory::InMemoryOrderingStore;

//! Orders domain module (order header, items, status state machine).
//!
//! This crate contains business rules for orders, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod order;

pub use order::{
    Address, Order, OrderCancelled, OrderError, OrderEvent, OrderItem, OrderStarted, OrderStatus,
    OrderStatusChanged,
};

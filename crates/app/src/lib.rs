//! Order-creation application layer.
//!
//! Orchestrates the Buyer and Order aggregates for a single creation request:
//! validate the candidate card, resolve or create the buyer's stored payment
//! method, construct the order, persist everything in one unit of work, and
//! dispatch the raised domain events after the commit.

pub mod card;
pub mod command;
pub mod events;
pub mod handler;
pub mod ports;

pub use card::CardError;
pub use command::CreateOrderCommand;
pub use events::OrderingEvent;
pub use handler::{CreateOrderError, CreateOrderHandler};
pub use ports::{BuyerRepository, IdentityService, OrderRepository, StoreError, UnitOfWork};

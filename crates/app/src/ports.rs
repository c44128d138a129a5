//! Capability ports the handler depends on.
//!
//! Persistence, identity resolution and event dispatch are external
//! collaborators; the handler sees them only through these traits so tests
//! can inject doubles and infra can swap implementations.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use orderflow_buyers::Buyer;
use orderflow_core::OrderId;
use orderflow_orders::Order;

/// Infrastructure-level persistence failure.
///
/// A different family from caller-input errors: conflicts and storage faults
/// carry operation context and are never collapsed into validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A conflicting concurrent write was detected at commit time.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The storage engine failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Resolves the current caller's identity (external identity provider).
pub trait IdentityService: Send + Sync {
    /// The caller's identity token, or `None` when unauthenticated.
    fn user_identity(&self) -> Option<String>;
}

/// Transactional boundary collecting staged changes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Commit all staged changes atomically.
    ///
    /// Returns the number of affected rows; 0 means nothing was persisted.
    async fn save_changes(&self) -> Result<u64, StoreError>;
}

/// Load/stage Order aggregates.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Stage the order for insert; nothing is persisted until the unit of
    /// work commits.
    async fn add(&self, order: Order) -> Result<(), StoreError>;

    /// The unit of work spanning this repository's staged changes.
    fn unit_of_work(&self) -> Arc<dyn UnitOfWork>;
}

/// Load/stage Buyer aggregates.
///
/// Shares the order repository's unit of work: buyer mutation and order
/// creation commit together or not at all.
#[async_trait]
pub trait BuyerRepository: Send + Sync {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Buyer>, StoreError>;

    async fn add(&self, buyer: Buyer) -> Result<(), StoreError>;

    async fn update(&self, buyer: Buyer) -> Result<(), StoreError>;
}

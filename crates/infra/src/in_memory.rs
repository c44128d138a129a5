//! In-memory persistence with unit-of-work commit semantics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use orderflow_app::{BuyerRepository, OrderRepository, StoreError, UnitOfWork};
use orderflow_buyers::Buyer;
use orderflow_core::{AggregateRoot, BuyerId, ExpectedVersion, OrderId};
use orderflow_orders::Order;

#[derive(Debug, Clone)]
enum StagedChange {
    InsertBuyer(Buyer),
    UpdateBuyer(Buyer),
    InsertOrder(Order),
}

#[derive(Debug, Default)]
struct StoreState {
    buyers: HashMap<BuyerId, Buyer>,
    orders: HashMap<OrderId, Order>,
    staged: Vec<StagedChange>,
}

/// In-memory store backing both repositories and their shared unit of work.
///
/// `add`/`update` only stage changes; nothing is visible to readers until
/// `save_changes` commits the whole batch (read-committed). Commits are
/// all-or-nothing: any conflict aborts the batch and discards it, so a
/// conflicting concurrent write surfaces as a commit failure instead of a
/// silent lost update.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderingStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryOrderingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed_order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn committed_buyer_count(&self) -> usize {
        self.lock().buyers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        // Lock poisoning means a writer panicked mid-operation; the staged
        // queue is the only partial state and it is discarded on commit.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stage(&self, change: StagedChange) {
        self.lock().staged.push(change);
    }

    /// Version the staged aggregate was loaded at: its current version minus
    /// the events raised (and not yet committed) since the load.
    fn loaded_version<A: AggregateRoot>(aggregate: &A) -> ExpectedVersion {
        ExpectedVersion::Exact(aggregate.version() - aggregate.pending_events().len() as u64)
    }

    fn check_conflicts(state: &StoreState, staged: &[StagedChange]) -> Result<(), StoreError> {
        for change in staged {
            match change {
                StagedChange::InsertBuyer(buyer) => {
                    if state.buyers.contains_key(&buyer.id_typed()) {
                        return Err(StoreError::Conflict(format!(
                            "buyer {} already exists",
                            buyer.id_typed()
                        )));
                    }
                    if state
                        .buyers
                        .values()
                        .any(|existing| existing.identity() == buyer.identity())
                    {
                        return Err(StoreError::Conflict(format!(
                            "buyer for identity {:?} already exists",
                            buyer.identity()
                        )));
                    }
                }
                StagedChange::UpdateBuyer(buyer) => {
                    let current = state.buyers.get(&buyer.id_typed()).ok_or_else(|| {
                        StoreError::Storage(format!("unknown buyer {}", buyer.id_typed()))
                    })?;
                    if !Self::loaded_version(buyer).matches(current.version()) {
                        return Err(StoreError::Conflict(format!(
                            "buyer {} was modified concurrently",
                            buyer.id_typed()
                        )));
                    }
                }
                StagedChange::InsertOrder(order) => {
                    if state.orders.contains_key(&order.id_typed()) {
                        return Err(StoreError::Conflict(format!(
                            "order {} already exists",
                            order.id_typed()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn apply(state: &mut StoreState, staged: Vec<StagedChange>) -> u64 {
        let mut affected = 0;
        for change in staged {
            match change {
                StagedChange::InsertBuyer(mut buyer) | StagedChange::UpdateBuyer(mut buyer) => {
                    // Committed rows never carry pending events; dispatch is
                    // the caller's concern.
                    buyer.drain_events();
                    state.buyers.insert(buyer.id_typed(), buyer);
                }
                StagedChange::InsertOrder(mut order) => {
                    order.drain_events();
                    state.orders.insert(order.id_typed(), order);
                }
            }
            affected += 1;
        }
        affected
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderingStore {
    async fn get(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.lock().orders.get(&order_id).cloned())
    }

    async fn add(&self, order: Order) -> Result<(), StoreError> {
        self.stage(StagedChange::InsertOrder(order));
        Ok(())
    }

    fn unit_of_work(&self) -> Arc<dyn UnitOfWork> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl BuyerRepository for InMemoryOrderingStore {
    async fn find_by_identity(&self, identity: &str) -> Result<Option<Buyer>, StoreError> {
        Ok(self
            .lock()
            .buyers
            .values()
            .find(|buyer| buyer.identity() == identity)
            .cloned())
    }

    async fn add(&self, buyer: Buyer) -> Result<(), StoreError> {
        self.stage(StagedChange::InsertBuyer(buyer));
        Ok(())
    }

    async fn update(&self, buyer: Buyer) -> Result<(), StoreError> {
        self.stage(StagedChange::UpdateBuyer(buyer));
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryOrderingStore {
    async fn save_changes(&self) -> Result<u64, StoreError> {
        let mut state = self.lock();
        let staged = std::mem::take(&mut state.staged);

        Self::check_conflicts(&state, &staged)?;

        let affected = Self::apply(&mut state, staged);
        tracing::debug!(affected, "unit of work committed");
        Ok(affected)
    }
}

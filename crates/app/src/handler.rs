//! Create-order command handler.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use orderflow_buyers::{Buyer, BuyerError};
use orderflow_core::{AggregateRoot, BuyerId, OrderId};
use orderflow_events::EventDispatcher;
use orderflow_orders::{Address, Order, OrderError};

use crate::card::{self, CardError};
use crate::command::CreateOrderCommand;
use crate::events::OrderingEvent;
use crate::ports::{BuyerRepository, IdentityService, OrderRepository, StoreError};

/// Alias stamped on payment methods created during order creation.
const ORDER_CREATION_ALIAS: &str = "payment method added on order creation";

/// Create-order failure.
///
/// Caller-input errors (`MissingIdentity`, card/buyer/order validation) are
/// surfaced verbatim; persistence failures carry operation context. A commit
/// that affects zero rows is not an error: `handle` returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum CreateOrderError {
    /// No caller identity could be resolved.
    #[error("missing buyer identity")]
    MissingIdentity,

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Buyer(#[from] BuyerError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates a single order-creation request.
///
/// One unit-of-work boundary spans the buyer mutation and the order insert,
/// so a card-validation pass is never observed with a half-persisted order.
/// Domain events raised along the way are dispatched only after the commit
/// reports at least one affected row.
pub struct CreateOrderHandler<D> {
    orders: Arc<dyn OrderRepository>,
    buyers: Arc<dyn BuyerRepository>,
    identity: Arc<dyn IdentityService>,
    dispatcher: D,
}

impl<D> CreateOrderHandler<D>
where
    D: EventDispatcher<OrderingEvent>,
{
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        buyers: Arc<dyn BuyerRepository>,
        identity: Arc<dyn IdentityService>,
        dispatcher: D,
    ) -> Self {
        Self {
            orders,
            buyers,
            identity,
            dispatcher,
        }
    }

    /// Handle one creation request.
    ///
    /// Returns `Ok(true)` when the order was persisted, `Ok(false)` when the
    /// commit reported zero affected rows.
    pub async fn handle(&self, command: CreateOrderCommand) -> Result<bool, CreateOrderError> {
        let identity = self
            .identity
            .user_identity()
            .filter(|token| !token.trim().is_empty())
            .ok_or(CreateOrderError::MissingIdentity)?;

        let now = Utc::now();
        card::validate(
            &command.card_number,
            command.card_expiration,
            &command.card_security_number,
            &command.card_holder_name,
            now,
        )?;

        let address = Address::new(
            &command.street,
            &command.city,
            &command.state,
            &command.country,
            &command.zip_code,
        )?;

        let existing = self.buyers.find_by_identity(&identity).await?;
        let is_new_buyer = existing.is_none();
        let mut buyer = match existing {
            Some(buyer) => buyer,
            None => Buyer::new(BuyerId::new(), identity.as_str())?,
        };

        let order_id = OrderId::new();
        let payment_method_id = buyer.verify_or_add_payment_method(
            order_id,
            ORDER_CREATION_ALIAS,
            &command.card_number,
            &command.card_security_number,
            &command.card_holder_name,
            command.card_expiration,
            command.card_type_id,
            now,
        );

        let mut order = Order::new(
            order_id,
            address,
            buyer.id_typed(),
            payment_method_id,
            command.card_type_id,
            &command.card_number,
            &command.card_holder_name,
            command.card_expiration,
            now,
        );

        if is_new_buyer {
            self.buyers.add(buyer.clone()).await?;
        } else {
            self.buyers.update(buyer.clone()).await?;
        }
        self.orders.add(order.clone()).await?;

        let affected = self.orders.unit_of_work().save_changes().await?;
        if affected == 0 {
            tracing::warn!(order_id = %order_id, "order creation committed zero rows");
            return Ok(false);
        }

        tracing::info!(
            order_id = %order_id,
            buyer_id = %buyer.id_typed(),
            affected,
            new_buyer = is_new_buyer,
            "order created"
        );

        // Creation events before transition events: the buyer verification
        // happened first, then the order start.
        for event in buyer.drain_events() {
            self.dispatch(event.into());
        }
        for event in order.drain_events() {
            self.dispatch(event.into());
        }

        Ok(true)
    }

    fn dispatch(&self, event: OrderingEvent) {
        // State is already persisted; delivery guarantees are the
        // dispatcher's responsibility.
        if let Err(err) = self.dispatcher.dispatch(event) {
            tracing::warn!(?err, "post-commit event dispatch failed");
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderflow_core::{AggregateRoot, BuyerId, CardTypeId, OrderId, PaymentMethodId, ValueObject};
use orderflow_events::Event;

/// Order domain error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// An address field was empty.
    #[error("invalid address: {field} cannot be empty")]
    InvalidAddress { field: &'static str },

    /// An order with no items cannot enter validated states.
    #[error("order has no items")]
    EmptyOrder,

    /// The requested status transition is not a permitted edge.
    ///
    /// Duplicate transition attempts land here too; they signal a caller bug
    /// or a race and must surface rather than being silently ignored.
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}

/// Shipping address (value object, all fields required).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    city: String,
    state: String,
    country: String,
    zip_code: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Result<Self, OrderError> {
        let address = Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            country: country.into(),
            zip_code: zip_code.into(),
        };

        for (field, value) in [
            ("street", &address.street),
            ("city", &address.city),
            ("state", &address.state),
            ("country", &address.country),
            ("zip_code", &address.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(OrderError::InvalidAddress { field });
            }
        }

        Ok(address)
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

impl ValueObject for Address {}

/// Order line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    pub units: u32,
}

impl ValueObject for OrderItem {}

/// Order status lifecycle.
///
/// `Submitted` is the initial state; `Shipped`, `Cancelled` and
/// `RefundRequested` are terminal (the fulfilment flow ends there, though a
/// shipped order may still enter `RefundRequested`). Permitted edges are
/// encoded in [`OrderStatus::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    AwaitingStockValidation,
    StockConfirmed,
    Paid,
    Shipped,
    Cancelled,
    RefundRequested,
}

impl OrderStatus {
    /// Pure transition function: the new status, or the offending edge.
    pub fn transition(self, target: OrderStatus) -> Result<OrderStatus, OrderError> {
        use OrderStatus::*;

        let allowed = match target {
            AwaitingStockValidation => matches!(self, Submitted),
            StockConfirmed => matches!(self, AwaitingStockValidation),
            Paid => matches!(self, StockConfirmed),
            Shipped => matches!(self, Paid),
            Cancelled => matches!(self, Submitted | AwaitingStockValidation | StockConfirmed | Paid),
            RefundRequested => matches!(self, Paid | Shipped),
            Submitted => false,
        };

        if allowed {
            Ok(target)
        } else {
            Err(OrderError::InvalidStatusTransition {
                from: self,
                to: target,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Shipped | OrderStatus::Cancelled | OrderStatus::RefundRequested
        )
    }
}

/// Event: OrderStarted.
///
/// Carries the buyer and card references downstream consumers need to react
/// to a new order. The card security number is deliberately absent: it is
/// write-once and never leaves the creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStarted {
    pub order_id: OrderId,
    pub buyer_id: BuyerId,
    pub payment_method_id: PaymentMethodId,
    pub card_type_id: CardTypeId,
    pub card_number: String,
    pub card_holder_name: String,
    pub card_expiration: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderStarted(OrderStarted),
    OrderStatusChanged(OrderStatusChanged),
    OrderCancelled(OrderCancelled),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderStarted(_) => "orders.order.started",
            OrderEvent::OrderStatusChanged(_) => "orders.order.status_changed",
            OrderEvent::OrderCancelled(_) => "orders.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderStarted(e) => e.occurred_at,
            OrderEvent::OrderStatusChanged(e) => e.occurred_at,
            OrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: Order.
///
/// Status only moves along the edges encoded in [`OrderStatus::transition`],
/// and only through the named transition operations below. Orders are never
/// physically deleted; cancellation and refund are terminal statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    buyer_id: BuyerId,
    payment_method_id: PaymentMethodId,
    address: Address,
    ordered_on: DateTime<Utc>,
    status: OrderStatus,
    description: Option<String>,
    items: Vec<OrderItem>,
    pending_events: Vec<OrderEvent>,
    version: u64,
}

impl Order {
    /// Create an order in `Submitted` status and raise `OrderStarted`.
    ///
    /// Performs no card validation; that is the caller's responsibility,
    /// enforced before construction.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        address: Address,
        buyer_id: BuyerId,
        payment_method_id: PaymentMethodId,
        card_type_id: CardTypeId,
        card_number: &str,
        card_holder_name: &str,
        card_expiration: DateTime<Utc>,
        ordered_on: DateTime<Utc>,
    ) -> Self {
        let mut order = Self {
            id,
            buyer_id,
            payment_method_id,
            address,
            ordered_on,
            status: OrderStatus::Submitted,
            description: None,
            items: Vec::new(),
            pending_events: Vec::new(),
            version: 0,
        };

        order.raise(OrderEvent::OrderStarted(OrderStarted {
            order_id: id,
            buyer_id,
            payment_method_id,
            card_type_id,
            card_number: card_number.to_string(),
            card_holder_name: card_holder_name.to_string(),
            card_expiration,
            occurred_at: ordered_on,
        }));

        order
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn buyer_id(&self) -> BuyerId {
        self.buyer_id
    }

    pub fn payment_method_id(&self) -> PaymentMethodId {
        self.payment_method_id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn ordered_on(&self) -> DateTime<Utc> {
        self.ordered_on
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn add_item(&mut self, item: OrderItem) {
        self.items.push(item);
    }

    /// Submitted -> AwaitingStockValidation.
    ///
    /// An order with no items cannot enter validated states.
    pub fn set_awaiting_validation(&mut self, occurred_at: DateTime<Utc>) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        self.apply_transition(OrderStatus::AwaitingStockValidation, occurred_at)
    }

    /// AwaitingStockValidation -> StockConfirmed.
    pub fn set_stock_confirmed(&mut self, occurred_at: DateTime<Utc>) -> Result<(), OrderError> {
        self.apply_transition(OrderStatus::StockConfirmed, occurred_at)
    }

    /// StockConfirmed -> Paid.
    pub fn set_paid(&mut self, occurred_at: DateTime<Utc>) -> Result<(), OrderError> {
        self.apply_transition(OrderStatus::Paid, occurred_at)
    }

    /// Paid -> Shipped (terminal success).
    pub fn set_shipped(&mut self, occurred_at: DateTime<Utc>) -> Result<(), OrderError> {
        self.apply_transition(OrderStatus::Shipped, occurred_at)
    }

    /// Any non-terminal state except Shipped -> Cancelled.
    pub fn set_cancelled(
        &mut self,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.apply_transition(OrderStatus::Cancelled, occurred_at)?;

        let reason = reason.into();
        self.description = Some(reason.clone());
        self.raise(OrderEvent::OrderCancelled(OrderCancelled {
            order_id: self.id,
            reason,
            occurred_at,
        }));

        Ok(())
    }

    /// Paid or Shipped -> RefundRequested.
    pub fn set_refund_requested(
        &mut self,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        self.apply_transition(OrderStatus::RefundRequested, occurred_at)?;
        self.description = Some(reason.into());
        Ok(())
    }

    fn apply_transition(
        &mut self,
        target: OrderStatus,
        occurred_at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        let from = self.status;
        self.status = from.transition(target)?;
        self.raise(OrderEvent::OrderStatusChanged(OrderStatusChanged {
            order_id: self.id,
            from,
            to: target,
            occurred_at,
        }));
        Ok(())
    }

    fn raise(&mut self, event: OrderEvent) {
        self.pending_events.push(event);
        self.version += 1;
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;
    type Event = OrderEvent;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn pending_events(&self) -> &[Self::Event] {
        &self.pending_events
    }

    fn drain_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.pending_events)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_buyers::BuyerEvent;
use orderflow_events::Event;
use orderflow_orders::OrderEvent;

/// Union of the domain events this workflow dispatches post-commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderingEvent {
    Buyer(BuyerEvent),
    Order(OrderEvent),
}

impl From<BuyerEvent> for OrderingEvent {
    fn from(event: BuyerEvent) -> Self {
        OrderingEvent::Buyer(event)
    }
}

impl From<OrderEvent> for OrderingEvent {
    fn from(event: OrderEvent) -> Self {
        OrderingEvent::Order(event)
    }
}

impl Event for OrderingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderingEvent::Buyer(e) => e.event_type(),
            OrderingEvent::Order(e) => e.event_type(),
        }
    }

    fn version(&self) -> u32 {
        match self {
            OrderingEvent::Buyer(e) => e.version(),
            OrderingEvent::Order(e) => e.version(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderingEvent::Buyer(e) => e.occurred_at(),
            OrderingEvent::Order(e) => e.occurred_at(),
        }
    }
}

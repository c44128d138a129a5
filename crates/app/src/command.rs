use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::CardTypeId;

/// Command: CreateOrder.
///
/// Carries the shipping address and the candidate payment card for a single
/// creation request. The buyer is resolved from the caller's identity, not
/// from the command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderCommand {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,

    pub card_number: String,
    pub card_expiration: DateTime<Utc>,
    pub card_security_number: String,
    pub card_holder_name: String,
    pub card_type_id: CardTypeId,
}

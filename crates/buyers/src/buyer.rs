use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderflow_core::{AggregateRoot, BuyerId, CardTypeId, Entity, OrderId, PaymentMethodId};
use orderflow_events::Event;

/// Buyer domain error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuyerError {
    /// The identity-provider subject token was empty or whitespace-only.
    #[error("buyer identity token cannot be empty")]
    EmptyIdentity,
}

/// Derived digest over a payment method's content.
///
/// Two methods with the same (card number, holder name, expiration, card
/// type) share a fingerprint. Comparing fingerprints instead of raw fields
/// keeps the de-duplication check away from sensitive data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardFingerprint(u64);

impl CardFingerprint {
    pub fn compute(
        card_number: &str,
        holder_name: &str,
        expiration: DateTime<Utc>,
        card_type_id: CardTypeId,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        card_number.hash(&mut hasher);
        holder_name.hash(&mut hasher);
        expiration.timestamp_millis().hash(&mut hasher);
        card_type_id.value().hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// A stored payment method owned by exactly one buyer.
///
/// The security code is write-once and never persisted: it is excluded from
/// serialization and from the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    id: PaymentMethodId,
    alias: String,
    card_number: String,
    #[serde(skip)]
    security_number: String,
    holder_name: String,
    expiration: DateTime<Utc>,
    card_type_id: CardTypeId,
}

impl PaymentMethod {
    fn new(
        id: PaymentMethodId,
        alias: impl Into<String>,
        card_number: impl Into<String>,
        security_number: impl Into<String>,
        holder_name: impl Into<String>,
        expiration: DateTime<Utc>,
        card_type_id: CardTypeId,
    ) -> Self {
        Self {
            id,
            alias: alias.into(),
            card_number: card_number.into(),
            security_number: security_number.into(),
            holder_name: holder_name.into(),
            expiration,
            card_type_id,
        }
    }

    pub fn id_typed(&self) -> PaymentMethodId {
        self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn card_type_id(&self) -> CardTypeId {
        self.card_type_id
    }

    pub fn fingerprint(&self) -> CardFingerprint {
        CardFingerprint::compute(
            &self.card_number,
            &self.holder_name,
            self.expiration,
            self.card_type_id,
        )
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

impl Entity for PaymentMethod {
    type Id = PaymentMethodId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Event: PaymentMethodVerified.
///
/// Raised every time `verify_or_add_payment_method` runs, on both the reuse
/// and the append path: downstream consumers care that the method was
/// verified for this order, not that it is new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodVerified {
    pub buyer_id: BuyerId,
    pub payment_method_id: PaymentMethodId,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuyerEvent {
    PaymentMethodVerified(PaymentMethodVerified),
}

impl Event for BuyerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BuyerEvent::PaymentMethodVerified(_) => "buyers.payment_method.verified",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BuyerEvent::PaymentMethodVerified(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: Buyer.
///
/// Owns the set of stored payment methods for one external identity. Created
/// on a new identity's first order; never deleted by this core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buyer {
    id: BuyerId,
    identity: String,
    payment_methods: Vec<PaymentMethod>,
    pending_events: Vec<BuyerEvent>,
    version: u64,
}

impl Buyer {
    /// Create a buyer for an identity-provider subject token.
    ///
    /// Fails when the token is empty or whitespace-only.
    pub fn new(id: BuyerId, identity: impl Into<String>) -> Result<Self, BuyerError> {
        let identity = identity.into();
        if identity.trim().is_empty() {
            return Err(BuyerError::EmptyIdentity);
        }

        Ok(Self {
            id,
            identity,
            payment_methods: Vec::new(),
            pending_events: Vec::new(),
            version: 0,
        })
    }

    pub fn id_typed(&self) -> BuyerId {
        self.id
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Resolve the stored payment method matching the given card, appending a
    /// new one when no existing method shares the fingerprint.
    ///
    /// Idempotent: repeating the call with identical card fields returns the
    /// same method instead of accumulating duplicates. Card legality is the
    /// card validator's job and is checked upstream; this operation never
    /// fails. Raises `PaymentMethodVerified` either way.
    #[allow(clippy::too_many_arguments)]
    pub fn verify_or_add_payment_method(
        &mut self,
        order_id: OrderId,
        alias: &str,
        card_number: &str,
        security_number: &str,
        holder_name: &str,
        expiration: DateTime<Utc>,
        card_type_id: CardTypeId,
        occurred_at: DateTime<Utc>,
    ) -> PaymentMethodId {
        let fingerprint =
            CardFingerprint::compute(card_number, holder_name, expiration, card_type_id);

        let payment_method_id = match self
            .payment_methods
            .iter()
            .find(|method| method.fingerprint() == fingerprint)
        {
            Some(existing) => existing.id_typed(),
            None => {
                let method = PaymentMethod::new(
                    PaymentMethodId::new(),
                    alias,
                    card_number,
                    security_number,
                    holder_name,
                    expiration,
                    card_type_id,
                );
                let id = method.id_typed();
                self.payment_methods.push(method);
                id
            }
        };

        self.raise(BuyerEvent::PaymentMethodVerified(PaymentMethodVerified {
            buyer_id: self.id,
            payment_method_id,
            order_id,
            occurred_at,
        }));

        payment_method_id
    }

    fn raise(&mut self, event: BuyerEvent) {
        self.pending_events.push(event);
        self.version += 1;
    }
}

impl AggregateRoot for Buyer {
    type Id = BuyerId;
    type Event = BuyerEvent;

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

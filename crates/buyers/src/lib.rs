//! Buyers domain module (buyer identity + stored payment methods).
//!
//! This crate contains business rules for buyers, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod buyer;

pub use buyer::{
    Buyer, BuyerError, BuyerEvent, CardFingerprint, PaymentMethod, PaymentMethodVerified,
};

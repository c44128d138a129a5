//! Pure validation of payment-card fields.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Card validation failure, naming the first offending field.
///
/// Each failure is a distinct kind so callers and tests can tell them apart
/// without parsing message text.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    #[error("card holder name cannot be empty")]
    InvalidHolderName,

    #[error("card security number cannot be empty")]
    InvalidSecurityNumber,

    #[error("card number cannot be empty")]
    InvalidCardNumber,

    #[error("card is expired")]
    ExpiredCard,
}

/// Validate candidate card fields.
///
/// Checks run in a fixed order and report the first offending field:
/// holder name, security number, card number, then expiration (which must be
/// strictly in the future). Pure and deterministic given a fixed `now`.
pub fn validate(
    card_number: &str,
    expiration: DateTime<Utc>,
    security_number: &str,
    holder_name: &str,
    now: DateTime<Utc>,
) -> Result<(), CardError> {
    if holder_name.trim().is_empty() {
        return Err(CardError::InvalidHolderName);
    }
    if security_number.trim().is_empty() {
        return Err(CardError::InvalidSecurityNumber);
    }
    if card_number.trim().is_empty() {
        return Err(CardError::InvalidCardNumber);
    }
    if expiration <= now {
        return Err(CardError::ExpiredCard);
    }
    Ok(())
}

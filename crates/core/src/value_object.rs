//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// with the same attribute values are the same value. Contrast with entities,
/// which are identified by id regardless of attribute values.
///
/// To "modify" a value object, construct a new one. This keeps values safe to
/// share and predictable to compare (an `Address` behaves like a primitive).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

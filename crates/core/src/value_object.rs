//! Value objects: compared by their attributes, never by identity.

/// Two `Money { amount: "10.00", currency_code: "MXN" }` are the same price.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

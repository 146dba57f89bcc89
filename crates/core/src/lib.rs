//! `galeria-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers issued by the remote commerce platform, local identifiers, money
//! and the shared domain error model.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::DomainError;
pub use id::{
    InventoryItemId, LocationId, MirrorRecordId, PublicationId, RemoteId, VariantId,
};
pub use money::Money;
pub use value_object::ValueObject;

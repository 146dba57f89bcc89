//! Catalog domain module.
//!
//! Products (artworks) and events are the same remote catalog entity with a
//! different detail schema. This crate contains the entity, the tag rule engine
//! that derives part of its state, and the validation step that turns a remote
//! payload into a typed entity. It is deterministic domain logic: no IO, no
//! HTTP, no storage.

pub mod description;
pub mod details;
pub mod entity;
pub mod input;
pub mod model;
pub mod payload;
pub mod tags;

pub use details::{ArtworkDetails, DetailSchema, EventDetails};
pub use entity::{CatalogEntity, EntityChanges, Event, NewEntity, Product};
pub use input::{
    BaseInput, InputMode, InventoryItemInput, InventoryQuantityInput, MetafieldInput, RemoteInput,
    VariantInput, METAFIELD_TYPE,
};
pub use model::{
    EntityKind, Image, InventoryManagement, InventoryPolicy, ProductStatus, Variant,
};
pub use payload::{parse_payload, EntityPayload, MetafieldEntry, ParseError};
pub use tags::{FormatThreshold, StructuralPattern, TagRules};

//! Value types shared by products and events.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use galeria_core::{Money, VariantId};

/// Which catalog surface an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Product,
    Event,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Event => "event",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog status lifecycle, as named by the remote platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Active,
    Draft,
    Archived,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Draft => "DRAFT",
            ProductStatus::Archived => "ARCHIVED",
        }
    }

    /// Label shown to gallery staff.
    pub fn label(self) -> &'static str {
        match self {
            ProductStatus::Active => "Activo",
            ProductStatus::Draft => "Borrador",
            ProductStatus::Archived => "Archivado",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ProductStatus::Active),
            "DRAFT" => Ok(ProductStatus::Draft),
            "ARCHIVED" => Ok(ProductStatus::Archived),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: Option<String>,
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryManagement {
    /// Quantities are tracked by the remote platform.
    Tracked,
    NotManaged,
}

/// Whether a variant may be sold once its tracked stock reaches zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryPolicy {
    #[default]
    Deny,
    Continue,
}

/// A purchasable configuration of a catalog entity.
///
/// Only the first ("primary") variant is ever mutated by this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: VariantId,
    pub title: String,
    pub available_for_sale: bool,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub sku: Option<String>,
    pub inventory_quantity: Option<i64>,
    pub inventory_management: InventoryManagement,
    pub inventory_policy: InventoryPolicy,
}

impl Variant {
    pub fn is_tracked(&self) -> bool {
        self.inventory_management == InventoryManagement::Tracked
    }
}

//! Projection of an entity into the inputs the remote platform accepts.

use serde::Serialize;

use crate::details::DetailSchema;
use crate::entity::CatalogEntity;
use crate::model::{InventoryPolicy, ProductStatus};

/// Metafield value type used for every detail field.
pub const METAFIELD_TYPE: &str = "single_line_text_field";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// No ids anywhere: the platform assigns them.
    Create,
    Update,
}

/// Core fields written by the base write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description_html: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemInput {
    pub tracked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuantityInput {
    pub available_quantity: i64,
    pub location_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub inventory_item: InventoryItemInput,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inventory_quantities: Vec<InventoryQuantityInput>,
    pub inventory_policy: InventoryPolicy,
}

/// Everything needed to write an entity remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInput {
    pub base: BaseInput,
    pub metafields: Vec<MetafieldInput>,
    pub variants: Vec<VariantInput>,
}

impl<D: DetailSchema> CatalogEntity<D> {
    /// Build the remote inputs for this entity.
    ///
    /// Blank detail fields are not sent. Variants are tracked at the entity's
    /// location; without a location no quantities are attached.
    pub fn to_remote_input(&self, mode: InputMode) -> RemoteInput {
        let id = match mode {
            InputMode::Create => None,
            InputMode::Update => Some(self.remote_id().to_string()),
        };

        let base = BaseInput {
            id: id.clone(),
            title: self.title().to_string(),
            description_html: self.description_html().to_string(),
            vendor: self.vendor().to_string(),
            product_type: self.product_type().to_string(),
            tags: self.tags().to_vec(),
            status: self.status(),
        };

        let metafields = self
            .details()
            .present_fields()
            .into_iter()
            .map(|(key, value)| MetafieldInput {
                owner_id: id.clone(),
                namespace: D::NAMESPACE.to_string(),
                key: key.to_string(),
                value: value.to_string(),
                value_type: METAFIELD_TYPE.to_string(),
            })
            .collect();

        let variants = self
            .variants()
            .iter()
            .map(|variant| VariantInput {
                id: match mode {
                    InputMode::Create => None,
                    InputMode::Update => Some(variant.id.to_string()),
                },
                price: variant.price.amount.clone(),
                sku: variant.sku.clone(),
                inventory_item: InventoryItemInput { tracked: true },
                inventory_quantities: self
                    .location_id()
                    .map(|location| InventoryQuantityInput {
                        available_quantity: variant.inventory_quantity.unwrap_or(0),
                        location_id: location.to_string(),
                    })
                    .into_iter()
                    .collect(),
                inventory_policy: variant.inventory_policy,
            })
            .collect();

        RemoteInput {
            base,
            metafields,
            variants,
        }
    }
}

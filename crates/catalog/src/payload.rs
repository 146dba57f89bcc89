//! Remote payload schema and validation.
//!
//! The remote platform returns catalog entities as loosely shaped JSON
//! (connections of `edges { node }`, nullable lists, string enums). Before any
//! domain logic runs, the payload goes through [`parse_payload`], which either
//! yields a typed [`EntityPayload`] or a [`ParseError`] naming what was wrong.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use galeria_core::{Money, RemoteId, VariantId};

use crate::model::{Image, InventoryManagement, InventoryPolicy, ProductStatus, Variant};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid variant at position {index}: {reason}")]
    InvalidVariant { index: usize, reason: String },
}

/// A metafield as stored on the remote platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetafieldEntry {
    pub namespace: String,
    pub key: String,
    pub value: String,
}

/// A validated, typed remote entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPayload {
    pub id: RemoteId,
    pub handle: String,
    pub title: String,
    pub description_html: String,
    pub vendor: String,
    pub product_type: String,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub images: Vec<Image>,
    pub variants: Vec<Variant>,
    pub metafields: Vec<MetafieldEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
    id: Option<String>,
    handle: Option<String>,
    title: Option<String>,
    description_html: Option<String>,
    vendor: Option<String>,
    product_type: Option<String>,
    status: Option<String>,
    tags: Option<Vec<String>>,
    images: Option<Connection<RawImage>>,
    variants: Option<Connection<RawVariant>>,
    metafields: Option<Connection<MetafieldEntry>>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default = "Vec::new")]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

impl<T> Connection<T> {
    fn into_nodes(this: Option<Self>) -> Vec<T> {
        this.map(|c| c.edges.into_iter().map(|e| e.node).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImage {
    id: Option<String>,
    url: Option<String>,
    alt_text: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariant {
    id: Option<String>,
    title: Option<String>,
    available_for_sale: Option<bool>,
    price: Option<String>,
    compare_at_price: Option<String>,
    sku: Option<String>,
    inventory_quantity: Option<i64>,
    inventory_policy: Option<String>,
    inventory_item: Option<RawInventoryItem>,
}

#[derive(Debug, Deserialize)]
struct RawInventoryItem {
    #[serde(default)]
    tracked: bool,
}

/// Validate a remote payload and convert it into typed form.
///
/// `currency_code` is attached to variant prices, which the platform reports
/// as bare decimal strings.
pub fn parse_payload(value: JsonValue, currency_code: &str) -> Result<EntityPayload, ParseError> {
    let raw: RawEntity =
        serde_json::from_value(value).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let id = required(raw.id, "id")?;
    let status_raw = required(raw.status, "status")?;
    let status = status_raw
        .parse::<ProductStatus>()
        .map_err(ParseError::InvalidStatus)?;

    let images = Connection::into_nodes(raw.images)
        .into_iter()
        .filter_map(|img| {
            // Images still processing on the platform come back without a url.
            let url = img.url.filter(|u| !u.is_empty())?;
            Some(Image {
                id: img.id,
                url,
                alt_text: img.alt_text,
                width: img.width,
                height: img.height,
            })
        })
        .collect();

    let variants = Connection::into_nodes(raw.variants)
        .into_iter()
        .enumerate()
        .map(|(index, v)| convert_variant(index, v, currency_code))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EntityPayload {
        id: RemoteId::new(id),
        handle: raw.handle.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        description_html: raw.description_html.unwrap_or_default(),
        vendor: raw.vendor.unwrap_or_default(),
        product_type: raw.product_type.unwrap_or_default(),
        status,
        tags: raw.tags.unwrap_or_default(),
        images,
        variants,
        metafields: Connection::into_nodes(raw.metafields),
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ParseError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ParseError::MissingField(field))
}

fn convert_variant(
    index: usize,
    raw: RawVariant,
    currency_code: &str,
) -> Result<Variant, ParseError> {
    let invalid = |reason: &str| ParseError::InvalidVariant {
        index,
        reason: reason.to_string(),
    };

    let id = raw
        .id
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| invalid("missing id"))?;

    let inventory_policy = match raw.inventory_policy.as_deref() {
        None | Some("DENY") => InventoryPolicy::Deny,
        Some("CONTINUE") => InventoryPolicy::Continue,
        Some(other) => return Err(invalid(&format!("unknown inventory policy '{other}'"))),
    };

    let tracked = raw.inventory_item.map(|i| i.tracked).unwrap_or(false);

    Ok(Variant {
        id: VariantId::new(id),
        title: raw.title.unwrap_or_default(),
        available_for_sale: raw.available_for_sale.unwrap_or(false),
        price: Money::new(raw.price.unwrap_or_else(|| "0.00".to_string()), currency_code),
        compare_at_price: raw
            .compare_at_price
            .map(|amount| Money::new(amount, currency_code)),
        sku: raw.sku,
        inventory_quantity: raw.inventory_quantity,
        inventory_management: if tracked {
            InventoryManagement::Tracked
        } else {
            InventoryManagement::NotManaged
        },
        inventory_policy,
    })
}

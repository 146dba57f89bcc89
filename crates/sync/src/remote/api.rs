//! Typed catalog operations on top of [`RemoteClient`].
//!
//! Every mutation result is checked for `userErrors`; a non-empty list becomes
//! [`RemoteError::UserErrors`]. Reads that find nothing return `Ok(None)`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use galeria_catalog::{BaseInput, InventoryItemInput, InventoryPolicy, MetafieldInput};
use galeria_core::{InventoryItemId, LocationId, PublicationId, RemoteId, VariantId};

use crate::error::{RemoteError, UserError};

use super::{queries, RemoteClient};

/// Variant input used to change the price of one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPrice {
    pub id: String,
    pub price: String,
}

/// Variant input that turns on inventory tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryTracking {
    pub id: String,
    pub inventory_item: InventoryItemInput,
    pub inventory_policy: InventoryPolicy,
}

/// One page of a connection, nodes still unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPage {
    pub nodes: Vec<JsonValue>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Clone)]
pub struct CatalogApi {
    client: Arc<dyn RemoteClient>,
}

impl CatalogApi {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self { client }
    }

    /// Create the base record; returns the created entity node.
    pub async fn create_entity(&self, input: &BaseInput) -> Result<JsonValue, RemoteError> {
        let data = self
            .client
            .request(queries::PRODUCT_CREATE, json!({ "input": input }))
            .await?;
        let result = mutation_result(data, "productCreate")?;
        entity_node(result)
    }

    /// Update the base record; returns the updated entity node.
    pub async fn update_entity(&self, input: &BaseInput) -> Result<JsonValue, RemoteError> {
        let data = self
            .client
            .request(queries::PRODUCT_UPDATE, json!({ "input": input }))
            .await?;
        let result = mutation_result(data, "productUpdate")?;
        entity_node(result)
    }

    pub async fn delete_entity(&self, id: &RemoteId) -> Result<RemoteId, RemoteError> {
        let data = self
            .client
            .request(queries::PRODUCT_DELETE, json!({ "input": { "id": id } }))
            .await?;
        let result = mutation_result(data, "productDelete")?;
        let deleted = result
            .get("deletedProductId")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| RemoteError::decode("productDelete returned no deletedProductId"))?;
        Ok(RemoteId::new(deleted))
    }

    pub async fn set_metafields(&self, metafields: &[MetafieldInput]) -> Result<(), RemoteError> {
        if metafields.is_empty() {
            return Ok(());
        }
        let data = self
            .client
            .request(queries::METAFIELDS_SET, json!({ "metafields": metafields }))
            .await?;
        mutation_result(data, "metafieldsSet").map(|_| ())
    }

    pub async fn update_variant_price(
        &self,
        product_id: &RemoteId,
        variant_id: &VariantId,
        price: &str,
    ) -> Result<(), RemoteError> {
        let variants = [VariantPrice {
            id: variant_id.to_string(),
            price: price.to_string(),
        }];
        self.bulk_update_variants(product_id, json!(variants)).await
    }

    /// Track stock on the variant and stop selling at zero.
    pub async fn enable_inventory_tracking(
        &self,
        product_id: &RemoteId,
        variant_id: &VariantId,
    ) -> Result<(), RemoteError> {
        let variants = [InventoryTracking {
            id: variant_id.to_string(),
            inventory_item: InventoryItemInput { tracked: true },
            inventory_policy: InventoryPolicy::Deny,
        }];
        self.bulk_update_variants(product_id, json!(variants)).await
    }

    async fn bulk_update_variants(
        &self,
        product_id: &RemoteId,
        variants: JsonValue,
    ) -> Result<(), RemoteError> {
        let data = self
            .client
            .request(
                queries::VARIANTS_BULK_UPDATE,
                json!({ "productId": product_id, "variants": variants }),
            )
            .await?;
        mutation_result(data, "productVariantsBulkUpdate").map(|_| ())
    }

    pub async fn inventory_item_id(
        &self,
        variant_id: &VariantId,
    ) -> Result<Option<InventoryItemId>, RemoteError> {
        let data = self
            .client
            .request(queries::INVENTORY_ITEM, json!({ "variantId": variant_id }))
            .await?;
        Ok(data
            .pointer("/productVariant/inventoryItem/id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .map(InventoryItemId::new))
    }

    pub async fn set_on_hand_quantity(
        &self,
        inventory_item_id: &InventoryItemId,
        location_id: &LocationId,
        quantity: i64,
    ) -> Result<(), RemoteError> {
        let input = json!({
            "reason": queries::INVENTORY_REASON,
            "setQuantities": [{
                "inventoryItemId": inventory_item_id,
                "locationId": location_id,
                "quantity": quantity,
            }],
        });
        let data = self
            .client
            .request(queries::INVENTORY_SET_ON_HAND, json!({ "input": input }))
            .await?;
        mutation_result(data, "inventorySetOnHandQuantities").map(|_| ())
    }

    /// Every sales-channel publication of the shop.
    pub async fn publications(&self) -> Result<Vec<PublicationId>, RemoteError> {
        let data = self
            .client
            .request(queries::PUBLICATIONS, json!({}))
            .await?;
        let edges = data
            .pointer("/publications/edges")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| RemoteError::decode("publications connection missing"))?;
        Ok(edges
            .iter()
            .filter_map(|edge| edge.pointer("/node/id").and_then(JsonValue::as_str))
            .map(PublicationId::new)
            .collect())
    }

    pub async fn publish(
        &self,
        id: &RemoteId,
        publications: &[PublicationId],
    ) -> Result<(), RemoteError> {
        if publications.is_empty() {
            return Ok(());
        }
        let input: Vec<JsonValue> = publications
            .iter()
            .map(|p| json!({ "publicationId": p }))
            .collect();
        let data = self
            .client
            .request(queries::PUBLISHABLE_PUBLISH, json!({ "id": id, "input": input }))
            .await?;
        mutation_result(data, "publishablePublish").map(|_| ())
    }

    pub async fn fetch_by_id(&self, id: &RemoteId) -> Result<Option<JsonValue>, RemoteError> {
        let data = self
            .client
            .request(queries::PRODUCT_BY_ID, json!({ "id": id }))
            .await?;
        Ok(non_null(data, "product"))
    }

    pub async fn fetch_by_handle(&self, handle: &str) -> Result<Option<JsonValue>, RemoteError> {
        let data = self
            .client
            .request(queries::PRODUCT_BY_HANDLE, json!({ "handle": handle }))
            .await?;
        Ok(non_null(data, "productByHandle"))
    }

    /// One page of entities matching a platform search query.
    pub async fn fetch_page(
        &self,
        search: &str,
        first: u32,
        after: Option<&str>,
    ) -> Result<ConnectionPage, RemoteError> {
        let data = self
            .client
            .request(
                queries::PRODUCTS_PAGE,
                json!({ "query": search, "first": first, "after": after }),
            )
            .await?;

        let connection = data
            .get("products")
            .ok_or_else(|| RemoteError::decode("products connection missing"))?;
        let nodes = connection
            .get("edges")
            .and_then(JsonValue::as_array)
            .map(|edges| edges.iter().filter_map(|e| e.get("node").cloned()).collect())
            .unwrap_or_default();
        let page_info: PageInfo = connection
            .get("pageInfo")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| RemoteError::decode(e.to_string()))?
            .unwrap_or(PageInfo {
                has_next_page: false,
                end_cursor: None,
            });

        Ok(ConnectionPage {
            nodes,
            has_next_page: page_info.has_next_page,
            end_cursor: page_info.end_cursor,
        })
    }

    /// First active inventory location, if the shop has one.
    pub async fn active_location(&self) -> Result<Option<LocationId>, RemoteError> {
        let data = self
            .client
            .request(queries::ACTIVE_LOCATION, json!({}))
            .await?;
        Ok(data
            .pointer("/locations/edges/0/node/id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .map(LocationId::new))
    }
}

/// Take `data[root]` and fail on a non-empty `userErrors`.
fn mutation_result(mut data: JsonValue, root: &str) -> Result<JsonValue, RemoteError> {
    let result = data
        .get_mut(root)
        .map(JsonValue::take)
        .filter(|v| !v.is_null())
        .ok_or_else(|| RemoteError::decode(format!("{root} missing from response")))?;

    let user_errors: Vec<UserError> = match result.get("userErrors") {
        Some(errors) => serde_json::from_value(errors.clone())
            .map_err(|e| RemoteError::decode(format!("{root}.userErrors: {e}")))?,
        None => Vec::new(),
    };
    if !user_errors.is_empty() {
        return Err(RemoteError::UserErrors(user_errors));
    }
    Ok(result)
}

fn entity_node(mut result: JsonValue) -> Result<JsonValue, RemoteError> {
    result
        .get_mut("product")
        .map(JsonValue::take)
        .filter(|v| !v.is_null())
        .ok_or_else(|| RemoteError::decode("mutation returned no product"))
}

fn non_null(mut data: JsonValue, root: &str) -> Option<JsonValue> {
    data.get_mut(root)
        .map(JsonValue::take)
        .filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_fail_the_mutation() {
        let data = json!({
            "productCreate": {
                "product": null,
                "userErrors": [ { "field": ["title"], "message": "Title can't be blank" } ]
            }
        });
        let err = mutation_result(data, "productCreate").unwrap_err();
        assert_eq!(err.to_string(), "Title can't be blank");
    }

    #[test]
    fn empty_user_errors_are_success() {
        let data = json!({ "metafieldsSet": { "metafields": [], "userErrors": [] } });
        assert!(mutation_result(data, "metafieldsSet").is_ok());
    }

    #[test]
    fn missing_root_is_a_decode_error() {
        let err = mutation_result(json!({}), "productUpdate").unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[test]
    fn variant_inputs_serialize_in_platform_casing() {
        let tracking = InventoryTracking {
            id: "gid://shop/ProductVariant/1".into(),
            inventory_item: InventoryItemInput { tracked: true },
            inventory_policy: InventoryPolicy::Deny,
        };
        assert_eq!(
            serde_json::to_value(tracking).unwrap(),
            json!({
                "id": "gid://shop/ProductVariant/1",
                "inventoryItem": { "tracked": true },
                "inventoryPolicy": "DENY"
            })
        );
    }
}

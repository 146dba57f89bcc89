//! In-memory stand-in for the remote platform, used by tests.
//!
//! It understands the documents in [`queries`], keeps products in memory,
//! records every operation it receives and can be told to fail any of them.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::{json, Value as JsonValue};

use crate::error::{RemoteError, UserError};

use super::{queries, RemoteClient};

#[derive(Debug, Clone)]
struct FakeVariant {
    id: String,
    inventory_item_id: String,
    price: String,
    tracked: bool,
    policy: String,
    quantity: i64,
}

#[derive(Debug, Clone)]
struct FakeProduct {
    id: String,
    handle: String,
    title: String,
    description_html: String,
    vendor: String,
    product_type: String,
    status: String,
    tags: Vec<String>,
    metafields: Vec<(String, String, String)>,
    variant: FakeVariant,
    published_to: Vec<String>,
}

impl FakeProduct {
    fn node(&self) -> JsonValue {
        let metafields: Vec<JsonValue> = self
            .metafields
            .iter()
            .map(|(namespace, key, value)| {
                json!({ "node": { "namespace": namespace, "key": key, "value": value } })
            })
            .collect();
        json!({
            "id": self.id,
            "handle": self.handle,
            "title": self.title,
            "descriptionHtml": self.description_html,
            "vendor": self.vendor,
            "productType": self.product_type,
            "status": self.status,
            "tags": self.tags,
            "images": { "edges": [] },
            "variants": { "edges": [ { "node": {
                "id": self.variant.id,
                "title": "Default Title",
                "availableForSale": true,
                "price": self.variant.price,
                "compareAtPrice": null,
                "sku": null,
                "inventoryQuantity": self.variant.quantity,
                "inventoryPolicy": self.variant.policy,
                "inventoryItem": { "tracked": self.variant.tracked }
            }}]},
            "metafields": { "edges": metafields }
        })
    }

    fn apply_base(&mut self, input: &JsonValue) {
        let text = |key: &str| input.get(key).and_then(JsonValue::as_str).map(str::to_string);
        if let Some(v) = text("title") {
            self.title = v;
        }
        if let Some(v) = text("descriptionHtml") {
            self.description_html = v;
        }
        if let Some(v) = text("vendor") {
            self.vendor = v;
        }
        if let Some(v) = text("productType") {
            self.product_type = v;
        }
        if let Some(v) = text("status") {
            self.status = v;
        }
        if let Some(tags) = input.get("tags").and_then(JsonValue::as_array) {
            self.tags = tags
                .iter()
                .filter_map(JsonValue::as_str)
                .map(str::to_string)
                .collect();
        }
    }
}

#[derive(Default)]
struct State {
    next_id: u64,
    products: Vec<FakeProduct>,
    locations: Vec<String>,
    publications: Vec<String>,
    calls: Vec<&'static str>,
    variables: Vec<(&'static str, JsonValue)>,
    failures: HashMap<&'static str, RemoteError>,
    rejections: HashMap<&'static str, String>,
}

pub(crate) struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    /// One active location and two sales channels.
    pub(crate) fn new() -> Self {
        let platform = Self::empty();
        {
            let mut state = platform.state.lock().unwrap();
            state.locations.push("gid://shop/Location/1".into());
            state.publications = vec![
                "gid://shop/Publication/1".into(),
                "gid://shop/Publication/2".into(),
            ];
        }
        platform
    }

    /// No locations, no publications.
    pub(crate) fn empty() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
        }
    }

    /// Make every call to `op` fail at transport level.
    pub(crate) fn fail(&self, op: &'static str, error: RemoteError) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    /// Make every call to mutation `op` answer with a user error.
    pub(crate) fn reject(&self, op: &'static str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .rejections
            .insert(op, message.to_string());
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count(&self, op: &str) -> usize {
        self.calls().into_iter().filter(|c| *c == op).count()
    }

    /// Variables sent with each call to `op`, in order.
    pub(crate) fn variables(&self, op: &str) -> Vec<JsonValue> {
        self.state
            .lock()
            .unwrap()
            .variables
            .iter()
            .filter(|(name, _)| *name == op)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Stored node of a product, as the platform would return it.
    pub(crate) fn product(&self, id: &str) -> Option<JsonValue> {
        let state = self.state.lock().unwrap();
        state.products.iter().find(|p| p.id == id).map(FakeProduct::node)
    }

    pub(crate) fn published_to(&self, id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.published_to.clone())
            .unwrap_or_default()
    }

    /// Insert a product as if it had been created earlier; returns its id.
    pub(crate) fn seed(&self, base: JsonValue, metafields: &[(&str, &str, &str)]) -> String {
        let mut state = self.state.lock().unwrap();
        let mut product = new_product(&mut state);
        product.apply_base(&base);
        product.handle = slug(&product.title);
        if let Some(price) = base.get("price").and_then(JsonValue::as_str) {
            product.variant.price = price.to_string();
        }
        product.metafields = metafields
            .iter()
            .map(|(n, k, v)| (n.to_string(), k.to_string(), v.to_string()))
            .collect();
        let id = product.id.clone();
        state.products.push(product);
        id
    }

    fn op_name(query: &str) -> Option<&'static str> {
        let table: [(&str, &'static str); 13] = [
            (queries::PRODUCT_CREATE, "productCreate"),
            (queries::PRODUCT_UPDATE, "productUpdate"),
            (queries::PRODUCT_DELETE, "productDelete"),
            (queries::PRODUCT_BY_ID, "product"),
            (queries::PRODUCT_BY_HANDLE, "productByHandle"),
            (queries::PRODUCTS_PAGE, "products"),
            (queries::METAFIELDS_SET, "metafieldsSet"),
            (queries::VARIANTS_BULK_UPDATE, "productVariantsBulkUpdate"),
            (queries::INVENTORY_ITEM, "productVariant"),
            (queries::INVENTORY_SET_ON_HAND, "inventorySetOnHandQuantities"),
            (queries::PUBLICATIONS, "publications"),
            (queries::PUBLISHABLE_PUBLISH, "publishablePublish"),
            (queries::ACTIVE_LOCATION, "locations"),
        ];
        table.iter().find(|(doc, _)| *doc == query).map(|(_, op)| *op)
    }

    fn handle(state: &mut State, op: &'static str, vars: &JsonValue) -> JsonValue {
        match op {
            "productCreate" => {
                let input = &vars["input"];
                let title = input.get("title").and_then(JsonValue::as_str).unwrap_or("");
                if title.trim().is_empty() {
                    return user_errors(op, "Title can't be blank");
                }
                let mut product = new_product(state);
                product.apply_base(input);
                product.handle = slug(&product.title);
                let node = product.node();
                state.products.push(product);
                json!({ op: { "product": node, "userErrors": [] } })
            }
            "productUpdate" => {
                let input = &vars["input"];
                let id = input.get("id").and_then(JsonValue::as_str).unwrap_or("");
                match state.products.iter_mut().find(|p| p.id == id) {
                    Some(product) => {
                        product.apply_base(input);
                        json!({ op: { "product": product.node(), "userErrors": [] } })
                    }
                    None => user_errors(op, "Product does not exist"),
                }
            }
            "productDelete" => {
                let id = vars["input"]["id"].as_str().unwrap_or("").to_string();
                let before = state.products.len();
                state.products.retain(|p| p.id != id);
                if state.products.len() == before {
                    return user_errors(op, "Product does not exist");
                }
                json!({ op: { "deletedProductId": id, "userErrors": [] } })
            }
            "product" => {
                let id = vars["id"].as_str().unwrap_or("");
                let node = state.products.iter().find(|p| p.id == id).map(FakeProduct::node);
                json!({ "product": node })
            }
            "productByHandle" => {
                let handle = vars["handle"].as_str().unwrap_or("");
                let node = state
                    .products
                    .iter()
                    .find(|p| p.handle == handle)
                    .map(FakeProduct::node);
                json!({ "productByHandle": node })
            }
            "products" => {
                let first = vars["first"].as_u64().unwrap_or(10) as usize;
                let start = vars["after"]
                    .as_str()
                    .and_then(|c| c.parse::<usize>().ok())
                    .unwrap_or(0);
                let end = (start + first).min(state.products.len());
                let edges: Vec<JsonValue> = state.products[start.min(end)..end]
                    .iter()
                    .enumerate()
                    .map(|(i, p)| json!({ "cursor": (start + i + 1).to_string(), "node": p.node() }))
                    .collect();
                let end_cursor = (end > start).then(|| end.to_string());
                json!({ "products": {
                    "edges": edges,
                    "pageInfo": {
                        "hasNextPage": end < state.products.len(),
                        "endCursor": end_cursor,
                    }
                }})
            }
            "metafieldsSet" => {
                let entries = vars["metafields"].as_array().cloned().unwrap_or_default();
                for entry in entries {
                    let owner = entry["ownerId"].as_str().unwrap_or("");
                    let Some(product) = state.products.iter_mut().find(|p| p.id == owner) else {
                        return user_errors(op, "Owner does not exist");
                    };
                    let namespace = entry["namespace"].as_str().unwrap_or("").to_string();
                    let key = entry["key"].as_str().unwrap_or("").to_string();
                    let value = entry["value"].as_str().unwrap_or("").to_string();
                    product
                        .metafields
                        .retain(|(n, k, _)| !(n == &namespace && k == &key));
                    product.metafields.push((namespace, key, value));
                }
                json!({ op: { "metafields": [], "userErrors": [] } })
            }
            "productVariantsBulkUpdate" => {
                let product_id = vars["productId"].as_str().unwrap_or("");
                let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) else {
                    return user_errors(op, "Product does not exist");
                };
                for input in vars["variants"].as_array().cloned().unwrap_or_default() {
                    if input["id"].as_str() != Some(product.variant.id.as_str()) {
                        return user_errors(op, "Variant does not exist");
                    }
                    if let Some(price) = input["price"].as_str() {
                        product.variant.price = price.to_string();
                    }
                    if let Some(tracked) = input["inventoryItem"]["tracked"].as_bool() {
                        product.variant.tracked = tracked;
                    }
                    if let Some(policy) = input["inventoryPolicy"].as_str() {
                        product.variant.policy = policy.to_string();
                    }
                }
                json!({ op: { "productVariants": [], "userErrors": [] } })
            }
            "productVariant" => {
                let variant_id = vars["variantId"].as_str().unwrap_or("");
                let variant = state
                    .products
                    .iter()
                    .map(|p| &p.variant)
                    .find(|v| v.id == variant_id)
                    .map(|v| json!({ "id": v.id, "inventoryItem": { "id": v.inventory_item_id } }));
                json!({ "productVariant": variant })
            }
            "inventorySetOnHandQuantities" => {
                let entries = vars["input"]["setQuantities"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default();
                for entry in entries {
                    let item = entry["inventoryItemId"].as_str().unwrap_or("");
                    let location = entry["locationId"].as_str().unwrap_or("");
                    if !state.locations.iter().any(|l| l == location) {
                        return user_errors(op, "Location does not exist");
                    }
                    let Some(variant) = state
                        .products
                        .iter_mut()
                        .map(|p| &mut p.variant)
                        .find(|v| v.inventory_item_id == item)
                    else {
                        return user_errors(op, "Inventory item does not exist");
                    };
                    if !variant.tracked {
                        return user_errors(op, "Inventory item is not tracked");
                    }
                    variant.quantity = entry["quantity"].as_i64().unwrap_or(0);
                }
                json!({ op: { "inventoryAdjustmentGroup": { "id": "gid://shop/InventoryAdjustmentGroup/1" }, "userErrors": [] } })
            }
            "publications" => {
                let edges: Vec<JsonValue> = state
                    .publications
                    .iter()
                    .map(|id| json!({ "node": { "id": id, "name": "Channel" } }))
                    .collect();
                json!({ "publications": { "edges": edges } })
            }
            "publishablePublish" => {
                let id = vars["id"].as_str().unwrap_or("");
                let Some(product) = state.products.iter_mut().find(|p| p.id == id) else {
                    return user_errors(op, "Publishable does not exist");
                };
                for input in vars["input"].as_array().cloned().unwrap_or_default() {
                    if let Some(publication) = input["publicationId"].as_str() {
                        product.published_to.push(publication.to_string());
                    }
                }
                json!({ op: { "userErrors": [] } })
            }
            "locations" => {
                let edges: Vec<JsonValue> = state
                    .locations
                    .iter()
                    .take(1)
                    .map(|id| json!({ "node": { "id": id, "name": "Galería" } }))
                    .collect();
                json!({ "locations": { "edges": edges } })
            }
            _ => JsonValue::Null,
        }
    }
}

#[async_trait::async_trait]
impl RemoteClient for FakePlatform {
    async fn request(&self, query: &str, variables: JsonValue) -> Result<JsonValue, RemoteError> {
        let mut state = self.state.lock().unwrap();
        let op = FakePlatform::op_name(query)
            .ok_or_else(|| RemoteError::Graphql(vec!["unknown document".to_string()]))?;

        state.calls.push(op);
        state.variables.push((op, variables.clone()));

        if let Some(error) = state.failures.get(op) {
            return Err(error.clone());
        }
        if let Some(message) = state.rejections.get(op).cloned() {
            return Ok(user_errors(op, &message));
        }
        Ok(FakePlatform::handle(&mut state, op, &variables))
    }
}

fn new_product(state: &mut State) -> FakeProduct {
    state.next_id += 1;
    let n = state.next_id;
    FakeProduct {
        id: format!("gid://shop/Product/{n}"),
        handle: String::new(),
        title: String::new(),
        description_html: String::new(),
        vendor: String::new(),
        product_type: String::new(),
        status: "DRAFT".into(),
        tags: Vec::new(),
        metafields: Vec::new(),
        variant: FakeVariant {
            id: format!("gid://shop/ProductVariant/{n}"),
            inventory_item_id: format!("gid://shop/InventoryItem/{n}"),
            price: "0.00".into(),
            tracked: false,
            policy: "DENY".into(),
            quantity: 0,
        },
        published_to: Vec::new(),
    }
}

fn user_errors(op: &str, message: &str) -> JsonValue {
    let error = serde_json::to_value(UserError::new(message)).unwrap();
    json!({ op: { "userErrors": [error] } })
}

fn slug(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

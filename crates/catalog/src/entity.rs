//! Catalog entity: products and events share one shape and differ by detail schema.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use galeria_core::{money::parse_amount, Entity, LocationId, RemoteId};

use crate::description;
use crate::details::{ArtworkDetails, DetailSchema, EventDetails};
use crate::model::{EntityKind, Image, ProductStatus, Variant};
use crate::payload::{parse_payload, EntityPayload, ParseError};
use crate::tags::{self, TagRules};

pub type Product = CatalogEntity<ArtworkDetails>;
pub type Event = CatalogEntity<EventDetails>;

/// Input for creating a new entity (before it exists remotely).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntity<D> {
    pub title: String,
    /// Free text; the detail list is generated.
    #[serde(default)]
    pub description: String,
    pub vendor: String,
    pub product_type: String,
    pub status: ProductStatus,
    #[serde(default)]
    pub manual_tags: Vec<String>,
    pub details: D,
    /// Decimal price string for the primary variant.
    pub price: Option<String>,
    pub inventory_quantity: Option<i64>,
}

/// Partial changes applied by [`CatalogEntity::update`]. `None` leaves a value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChanges<D> {
    pub title: Option<String>,
    /// Replaces the free-text part of the description only. Blank text is ignored.
    pub description: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub status: Option<ProductStatus>,
    /// Replaces the manual partition as a whole.
    pub manual_tags: Option<Vec<String>>,
    /// Present fields override, empty strings clear.
    pub details: Option<D>,
    pub price: Option<String>,
    pub inventory_quantity: Option<i64>,
}

impl<D> EntityChanges<D> {
    /// Price to push to the primary variant, when supplied and positive.
    pub fn positive_price(&self) -> Option<&str> {
        self.price
            .as_deref()
            .filter(|p| parse_amount(p).is_some_and(|v| v > 0.0))
    }
}

/// In-memory catalog entity.
///
/// `tags` is always `manual_tags ∪ auto_tags`; `auto_tags` is regenerated in
/// full by every [`update`](Self::update).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity<D: DetailSchema> {
    id: RemoteId,
    handle: String,
    title: String,
    description_html: String,
    vendor: String,
    product_type: String,
    status: ProductStatus,
    images: Vec<Image>,
    variants: Vec<Variant>,
    tags: Vec<String>,
    manual_tags: Vec<String>,
    auto_tags: Vec<String>,
    details: D,
    location_id: Option<LocationId>,
    #[serde(skip)]
    rules: Arc<TagRules>,
}

impl<D: DetailSchema> CatalogEntity<D> {
    /// Validate a raw remote payload and build the entity from it.
    pub fn parse(
        value: JsonValue,
        currency_code: &str,
        location_id: Option<LocationId>,
        rules: Arc<TagRules>,
    ) -> Result<Self, ParseError> {
        let payload = parse_payload(value, currency_code)?;
        Ok(Self::from_payload(payload, location_id, rules))
    }

    /// Build from a validated payload.
    ///
    /// Metafields outside this schema's namespace are ignored. The stored tag
    /// list is split into manual and auto partitions by classification.
    pub fn from_payload(
        payload: EntityPayload,
        location_id: Option<LocationId>,
        rules: Arc<TagRules>,
    ) -> Self {
        let mut details = D::default();
        for entry in payload
            .metafields
            .into_iter()
            .filter(|m| m.namespace == D::NAMESPACE)
        {
            details.set_field(&entry.key, Some(entry.value));
        }
        details.on_load(&payload.vendor);

        let (manual_tags, auto_tags) =
            rules.partition(&payload.tags, &payload.vendor, &payload.product_type);
        let tags = tags::union(&manual_tags, &auto_tags);

        Self {
            id: payload.id,
            handle: payload.handle,
            title: payload.title,
            description_html: payload.description_html,
            vendor: payload.vendor,
            product_type: payload.product_type,
            status: payload.status,
            images: payload.images,
            variants: payload.variants,
            tags,
            manual_tags,
            auto_tags,
            details,
            location_id,
            rules,
        }
    }

    /// Local, not-yet-created entity. Its id is empty until the remote platform
    /// assigns one; tags and description are already derived.
    pub fn draft(new: NewEntity<D>, location_id: Option<LocationId>, rules: Arc<TagRules>) -> Self {
        let mut entity = Self {
            id: RemoteId::new(""),
            handle: String::new(),
            title: new.title,
            description_html: String::new(),
            vendor: new.vendor,
            product_type: new.product_type,
            status: new.status,
            images: Vec::new(),
            variants: Vec::new(),
            tags: Vec::new(),
            manual_tags: clean_tags(&new.manual_tags),
            auto_tags: Vec::new(),
            details: new.details,
            location_id,
            rules,
        };
        entity.details.on_load(&entity.vendor);
        entity.refresh(&new.description);
        entity
    }

    /// Apply partial changes, then regenerate auto tags, tags and description.
    pub fn update(&mut self, changes: EntityChanges<D>) {
        let price = changes.positive_price().map(str::to_string);
        let free_text = match changes.description.filter(|t| !t.trim().is_empty()) {
            Some(text) => text,
            None => description::free_text(&self.description_html),
        };

        if let Some(title) = changes.title.filter(|t| !t.trim().is_empty()) {
            self.title = title;
        }
        if let Some(vendor) = changes.vendor.filter(|v| !v.trim().is_empty()) {
            self.vendor = vendor;
        }
        if let Some(product_type) = changes.product_type.filter(|t| !t.trim().is_empty()) {
            self.product_type = product_type;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(patch) = changes.details.as_ref() {
            self.details.merge(patch);
        }
        if let Some(manual) = changes.manual_tags.as_deref() {
            self.manual_tags = clean_tags(manual);
        }

        if let Some(variant) = self.variants.first_mut() {
            if let Some(price) = price {
                variant.price.amount = price;
            }
            if let Some(quantity) = changes.inventory_quantity {
                variant.inventory_quantity = Some(quantity);
            }
        }

        self.refresh(&free_text);
    }

    fn refresh(&mut self, free_text: &str) {
        self.auto_tags = self
            .rules
            .derive(&self.vendor, &self.product_type, self.status, &self.details);
        self.tags = tags::union(&self.manual_tags, &self.auto_tags);

        let rows = self.details.description_rows(&self.vendor, &self.product_type);
        self.description_html = description::render(free_text, &rows);
    }

    /// Whether the remote platform has assigned an id yet.
    pub fn is_persisted(&self) -> bool {
        !self.id.as_str().is_empty()
    }

    pub fn kind(&self) -> EntityKind {
        D::KIND
    }

    pub fn remote_id(&self) -> &RemoteId {
        &self.id
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description_html(&self) -> &str {
        &self.description_html
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn manual_tags(&self) -> &[String] {
        &self.manual_tags
    }

    pub fn auto_tags(&self) -> &[String] {
        &self.auto_tags
    }

    pub fn details(&self) -> &D {
        &self.details
    }

    pub fn location_id(&self) -> Option<&LocationId> {
        self.location_id.as_ref()
    }

    pub fn rules(&self) -> &Arc<TagRules> {
        &self.rules
    }

    pub fn primary_image(&self) -> Option<&Image> {
        self.images.first()
    }

    pub fn primary_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// `$1,500 MXN`, or `Sin precio` when there is no variant.
    pub fn formatted_price(&self) -> String {
        self.primary_variant()
            .map(|v| v.price.display())
            .unwrap_or_else(|| "Sin precio".to_string())
    }

    /// Sellable right now.
    ///
    /// Event tickets whose stock is not tracked only need `availableForSale`;
    /// everything else also needs positive stock.
    pub fn is_available(&self) -> bool {
        let Some(variant) = self.primary_variant() else {
            return false;
        };
        if D::KIND == EntityKind::Event && !variant.is_tracked() {
            return variant.available_for_sale;
        }
        variant.available_for_sale && variant.inventory_quantity.unwrap_or(0) > 0
    }

    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }
}

impl CatalogEntity<EventDetails> {
    pub fn is_past_event(&self, today: NaiveDate) -> bool {
        self.details.is_past(today)
    }

    pub fn days_until_event(&self, today: NaiveDate) -> Option<i64> {
        self.details.days_until(today)
    }

    pub fn formatted_details(&self) -> String {
        self.details.summary()
    }
}

impl<D: DetailSchema> Entity for CatalogEntity<D> {
    type Id = RemoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    let trimmed: Vec<String> = tags.iter().map(|t| t.trim().to_string()).collect();
    tags::union(&trimmed, &[])
}

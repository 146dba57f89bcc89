//! The sync steps, in the order the orchestrator runs them.
//!
//! | Step | Policy |
//! |------|--------|
//! | `base_write` | Abort |
//! | `metafields` | LogAndContinue |
//! | `price` | LogAndContinue |
//! | `location` | Abort (only when inventory runs) |
//! | `inventory` | LogAndContinue |
//! | `publication` | LogAndContinue |
//! | `final_read` | Abort |
//! | `local_mirror` | LogAndContinue (create only) |

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, info};

use galeria_catalog::{CatalogEntity, DetailSchema, InputMode, MetafieldInput, TagRules};
use galeria_core::{DomainError, LocationId, MirrorRecordId, RemoteId, VariantId};

use crate::error::{RemoteError, SyncError};
use crate::location::LocationResolver;
use crate::mirror::MirrorStore;
use crate::remote::CatalogApi;
use crate::workflow::{FailurePolicy, Step};

/// State threaded through one create/update run.
pub struct SyncContext<D: DetailSchema> {
    pub mode: InputMode,
    /// Desired state: a draft on create, the updated entity on update.
    pub entity: CatalogEntity<D>,
    /// Positive price to push to the primary variant.
    pub price: Option<String>,
    /// On-hand quantity to set; `None` leaves inventory alone.
    pub inventory_quantity: Option<i64>,
    pub remote_id: Option<RemoteId>,
    pub primary_variant: Option<VariantId>,
    pub location_id: Option<LocationId>,
    /// Canonical entity re-read after all writes.
    pub canonical: Option<CatalogEntity<D>>,
    pub mirror_record: Option<MirrorRecordId>,
}

impl<D: DetailSchema> SyncContext<D> {
    pub fn new(mode: InputMode, entity: CatalogEntity<D>) -> Self {
        let (remote_id, primary_variant) = match mode {
            InputMode::Create => (None, None),
            InputMode::Update => (
                Some(entity.remote_id().clone()),
                entity.primary_variant().map(|v| v.id.clone()),
            ),
        };
        let location_id = entity.location_id().cloned();

        Self {
            mode,
            entity,
            price: None,
            inventory_quantity: None,
            remote_id,
            primary_variant,
            location_id,
            canonical: None,
            mirror_record: None,
        }
    }

    fn remote_id(&self) -> Result<&RemoteId, SyncError> {
        self.remote_id
            .as_ref()
            .ok_or_else(|| DomainError::invariant("remote id not assigned yet").into())
    }

    fn primary_variant(&self) -> Result<&VariantId, SyncError> {
        self.primary_variant
            .as_ref()
            .ok_or_else(|| DomainError::invariant("entity has no primary variant").into())
    }
}

/// Create or update the core fields. Captures the remote id and primary variant.
pub struct BaseWrite {
    pub api: CatalogApi,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for BaseWrite {
    fn name(&self) -> &'static str {
        "base_write"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let input = ctx.entity.to_remote_input(ctx.mode);
        let node = match ctx.mode {
            InputMode::Create => self.api.create_entity(&input.base).await?,
            InputMode::Update => self.api.update_entity(&input.base).await?,
        };

        let id = node
            .get("id")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RemoteError::decode("written entity carries no id"))?;
        ctx.remote_id = Some(RemoteId::new(id));

        if let Some(variant) = node
            .pointer("/variants/edges/0/node/id")
            .and_then(JsonValue::as_str)
        {
            ctx.primary_variant = Some(VariantId::new(variant));
        }

        info!(entity_id = %id, mode = ?ctx.mode, "base record written");
        Ok(())
    }
}

/// Push present detail fields as metafields.
pub struct Metafields {
    pub api: CatalogApi,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for Metafields {
    fn name(&self) -> &'static str {
        "metafields"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::LogAndContinue
    }

    fn skip_reason(&self, ctx: &SyncContext<D>) -> Option<String> {
        ctx.entity
            .details()
            .present_fields()
            .is_empty()
            .then(|| "no detail values".to_string())
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let owner = ctx.remote_id()?.to_string();
        let metafields: Vec<MetafieldInput> = ctx
            .entity
            .to_remote_input(ctx.mode)
            .metafields
            .into_iter()
            .map(|m| MetafieldInput {
                owner_id: Some(owner.clone()),
                ..m
            })
            .collect();

        self.api.set_metafields(&metafields).await?;
        debug!(entity_id = %owner, count = metafields.len(), "metafields set");
        Ok(())
    }
}

/// Update the primary variant's price.
pub struct Price {
    pub api: CatalogApi,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for Price {
    fn name(&self) -> &'static str {
        "price"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::LogAndContinue
    }

    fn skip_reason(&self, ctx: &SyncContext<D>) -> Option<String> {
        ctx.price
            .is_none()
            .then(|| "no positive price supplied".to_string())
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let Some(price) = ctx.price.as_deref() else {
            return Ok(());
        };
        self.api
            .update_variant_price(ctx.remote_id()?, ctx.primary_variant()?, price)
            .await?;
        debug!(price, "primary variant price updated");
        Ok(())
    }
}

/// Resolve the inventory location; only runs when inventory will.
pub struct Location {
    pub resolver: Arc<LocationResolver>,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for Location {
    fn name(&self) -> &'static str {
        "location"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    fn skip_reason(&self, ctx: &SyncContext<D>) -> Option<String> {
        ctx.inventory_quantity
            .is_none()
            .then(|| "no inventory change".to_string())
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        ctx.location_id = Some(self.resolver.resolve().await?);
        Ok(())
    }
}

/// Enable tracking, look up the inventory item, set the on-hand quantity.
///
/// The quantity is only set once tracking and the item lookup succeeded.
pub struct Inventory {
    pub api: CatalogApi,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for Inventory {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::LogAndContinue
    }

    fn skip_reason(&self, ctx: &SyncContext<D>) -> Option<String> {
        ctx.inventory_quantity
            .is_none()
            .then(|| "no inventory change".to_string())
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let Some(quantity) = ctx.inventory_quantity else {
            return Ok(());
        };
        let remote_id = ctx.remote_id()?;
        let variant_id = ctx.primary_variant()?;
        let location_id = ctx
            .location_id
            .as_ref()
            .ok_or_else(|| DomainError::invariant("inventory step ran without a location"))?;

        self.api.enable_inventory_tracking(remote_id, variant_id).await?;

        let item_id = self
            .api
            .inventory_item_id(variant_id)
            .await?
            .ok_or_else(|| RemoteError::decode("variant has no inventory item"))?;

        self.api
            .set_on_hand_quantity(&item_id, location_id, quantity)
            .await?;
        debug!(inventory_item_id = %item_id, quantity, "on-hand quantity set");
        Ok(())
    }
}

/// Publish to every sales channel.
pub struct Publication {
    pub api: CatalogApi,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for Publication {
    fn name(&self) -> &'static str {
        "publication"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::LogAndContinue
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let publications = self.api.publications().await?;
        self.api.publish(ctx.remote_id()?, &publications).await?;
        debug!(channels = publications.len(), "entity published");
        Ok(())
    }
}

/// Re-read the canonical entity. Without it the operation has no result.
///
/// A created entity must come back with a primary variant.
pub struct FinalRead {
    pub api: CatalogApi,
    pub rules: Arc<TagRules>,
    pub currency_code: String,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for FinalRead {
    fn name(&self) -> &'static str {
        "final_read"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Abort
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let remote_id = ctx.remote_id()?.clone();
        let Some(node) = self.api.fetch_by_id(&remote_id).await? else {
            return Err(SyncError::not_found(D::KIND, remote_id));
        };

        let entity = CatalogEntity::parse(
            node,
            &self.currency_code,
            ctx.location_id.clone(),
            self.rules.clone(),
        )?;
        if ctx.mode == InputMode::Create && entity.primary_variant().is_none() {
            return Err(DomainError::invariant("created entity has no primary variant").into());
        }
        ctx.canonical = Some(entity);
        Ok(())
    }
}

/// Insert the local mirror row.
pub struct LocalMirror {
    pub store: Arc<dyn MirrorStore>,
    pub enabled: bool,
}

#[async_trait::async_trait]
impl<D: DetailSchema> Step<SyncContext<D>> for LocalMirror {
    fn name(&self) -> &'static str {
        "local_mirror"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::LogAndContinue
    }

    fn skip_reason(&self, ctx: &SyncContext<D>) -> Option<String> {
        if !self.enabled {
            return Some("mirror disabled".to_string());
        }
        (ctx.mode != InputMode::Create).then(|| "mirror is written on create only".to_string())
    }

    async fn execute(&self, ctx: &mut SyncContext<D>) -> Result<(), SyncError> {
        let remote_id = ctx.remote_id()?;
        let name = ctx
            .canonical
            .as_ref()
            .map(|e| e.title())
            .unwrap_or_else(|| ctx.entity.title());

        let record = self.store.insert_record(name, remote_id).await?;
        info!(mirror_id = %record, entity_id = %remote_id, "local mirror record inserted");
        ctx.mirror_record = Some(record);
        Ok(())
    }
}

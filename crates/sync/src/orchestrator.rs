//! Catalog synchronization service.
//!
//! `CatalogSync<D>` authorizes the caller, builds the desired entity locally,
//! then drives the [`steps`](crate::steps) against the remote platform and
//! returns the canonical entity it re-read at the end.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use galeria_auth::{Permission, PermissionGuard};
use galeria_catalog::{
    ArtworkDetails, CatalogEntity, DetailSchema, EntityChanges, EntityKind, EventDetails,
    InputMode, NewEntity, TagRules,
};
use galeria_core::{money::parse_amount, DomainError, LocationId, MirrorRecordId, RemoteId};

use crate::config::CatalogSettings;
use crate::error::SyncError;
use crate::location::LocationResolver;
use crate::mirror::MirrorStore;
use crate::remote::CatalogApi;
use crate::steps::{
    BaseWrite, FinalRead, Inventory, LocalMirror, Location, Metafields, Price, Publication,
    SyncContext,
};
use crate::workflow::{SyncReport, Workflow};

pub type ProductSync = CatalogSync<ArtworkDetails>;
pub type EventSync = CatalogSync<EventDetails>;

/// Result of a create or update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Synced<D: DetailSchema> {
    /// Canonical entity as re-read from the remote platform.
    pub entity: CatalogEntity<D>,
    pub report: SyncReport,
    pub mirror_record: Option<MirrorRecordId>,
}

/// One page of a listing. Invalid payloads are not part of `items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<D: DetailSchema> {
    pub items: Vec<CatalogEntity<D>>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

pub struct CatalogSync<D: DetailSchema> {
    api: CatalogApi,
    resolver: Arc<LocationResolver>,
    mirror: Arc<dyn MirrorStore>,
    rules: Arc<TagRules>,
    settings: CatalogSettings,
    _schema: PhantomData<fn() -> D>,
}

impl<D: DetailSchema> CatalogSync<D> {
    pub fn new(
        api: CatalogApi,
        resolver: Arc<LocationResolver>,
        mirror: Arc<dyn MirrorStore>,
        rules: Arc<TagRules>,
    ) -> Self {
        Self {
            api,
            resolver,
            mirror,
            rules,
            settings: CatalogSettings::for_kind(D::KIND),
            _schema: PhantomData,
        }
    }

    pub fn with_settings(mut self, settings: CatalogSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    pub fn kind(&self) -> EntityKind {
        D::KIND
    }

    fn permission(&self) -> Permission {
        match D::KIND {
            EntityKind::Product => Permission::MANAGE_PRODUCTS,
            EntityKind::Event => Permission::MANAGE_EVENTS,
        }
    }

    fn workflow(&self) -> Workflow<SyncContext<D>> {
        Workflow::new()
            .then(BaseWrite {
                api: self.api.clone(),
            })
            .then(Metafields {
                api: self.api.clone(),
            })
            .then(Price {
                api: self.api.clone(),
            })
            .then(Location {
                resolver: self.resolver.clone(),
            })
            .then(Inventory {
                api: self.api.clone(),
            })
            .then(Publication {
                api: self.api.clone(),
            })
            .then(FinalRead {
                api: self.api.clone(),
                rules: self.rules.clone(),
                currency_code: self.settings.currency_code.clone(),
            })
            .then(LocalMirror {
                store: self.mirror.clone(),
                enabled: self.settings.mirror_enabled,
            })
    }

    /// Create a new entity remotely.
    ///
    /// Only the base write, the location lookup (when a quantity is given) and
    /// the final read can fail the call. Other step failures are reported in
    /// [`Synced::report`].
    #[instrument(name = "catalog.create", skip_all, fields(kind = %D::KIND), err)]
    pub async fn create(
        &self,
        guard: &dyn PermissionGuard,
        mut new: NewEntity<D>,
    ) -> Result<Synced<D>, SyncError> {
        guard.require(&self.permission())?;

        if let Some(product_type) = &self.settings.forced_product_type {
            new.product_type = product_type.clone();
        }
        let price = positive_price(new.price.as_deref());
        let inventory_quantity = new.inventory_quantity.filter(|q| *q > 0);

        let location_id = self.resolver.cached().await;
        let draft = CatalogEntity::draft(new, location_id, self.rules.clone());

        let mut ctx = SyncContext::new(InputMode::Create, draft);
        ctx.price = price;
        ctx.inventory_quantity = inventory_quantity;

        let report = self.workflow().run(&mut ctx).await?;
        self.finish(ctx, report)
    }

    /// Apply partial changes to an existing entity.
    ///
    /// The current state is read first; tags and description are regenerated
    /// from it plus `changes` before anything is written.
    #[instrument(name = "catalog.update", skip_all, fields(kind = %D::KIND, entity_id = %id), err)]
    pub async fn update(
        &self,
        guard: &dyn PermissionGuard,
        id: &RemoteId,
        mut changes: EntityChanges<D>,
    ) -> Result<Synced<D>, SyncError> {
        guard.require(&self.permission())?;

        let mut entity = self
            .fetch(id, self.resolver.cached().await)
            .await?
            .ok_or_else(|| SyncError::not_found(D::KIND, id.clone()))?;

        if let Some(product_type) = &self.settings.forced_product_type {
            changes.product_type = Some(product_type.clone());
        }
        let price = changes.positive_price().map(str::to_string);
        let inventory_quantity = changes.inventory_quantity;

        entity.update(changes);

        let mut ctx = SyncContext::new(InputMode::Update, entity);
        ctx.price = price;
        ctx.inventory_quantity = inventory_quantity;

        let report = self.workflow().run(&mut ctx).await?;
        self.finish(ctx, report)
    }

    /// Delete by id; returns the id the platform reports as deleted.
    #[instrument(name = "catalog.delete", skip_all, fields(kind = %D::KIND, entity_id = %id), err)]
    pub async fn delete(
        &self,
        guard: &dyn PermissionGuard,
        id: &RemoteId,
    ) -> Result<RemoteId, SyncError> {
        guard.require(&self.permission())?;

        let deleted = self.api.delete_entity(id).await?;
        info!(entity_id = %deleted, "entity deleted");
        Ok(deleted)
    }

    pub async fn find_by_id(&self, id: &RemoteId) -> Result<Option<CatalogEntity<D>>, SyncError> {
        let location_id = self.location_hint().await;
        self.fetch(id, location_id).await
    }

    pub async fn find_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<CatalogEntity<D>>, SyncError> {
        let Some(node) = self.api.fetch_by_handle(handle).await? else {
            return Ok(None);
        };
        let location_id = self.location_hint().await;
        Ok(Some(self.parse(node, location_id)?))
    }

    /// One page of entities matching `search` (platform query syntax, passed through).
    pub async fn list_page(
        &self,
        search: &str,
        first: u32,
        after: Option<&str>,
    ) -> Result<Page<D>, SyncError> {
        let page = self.api.fetch_page(search, first, after).await?;
        let location_id = self.location_hint().await;

        let items = page
            .nodes
            .into_iter()
            .filter_map(|node| match self.parse(node, location_id.clone()) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(kind = %D::KIND, error = %e, "skipping invalid payload");
                    None
                }
            })
            .collect();

        Ok(Page {
            items,
            has_next_page: page.has_next_page,
            end_cursor: page.end_cursor,
        })
    }

    async fn fetch(
        &self,
        id: &RemoteId,
        location_id: Option<LocationId>,
    ) -> Result<Option<CatalogEntity<D>>, SyncError> {
        match self.api.fetch_by_id(id).await? {
            Some(node) => Ok(Some(self.parse(node, location_id)?)),
            None => Ok(None),
        }
    }

    fn parse(
        &self,
        node: serde_json::Value,
        location_id: Option<LocationId>,
    ) -> Result<CatalogEntity<D>, SyncError> {
        Ok(CatalogEntity::parse(
            node,
            &self.settings.currency_code,
            location_id,
            self.rules.clone(),
        )?)
    }

    /// Location for read paths. Reads never fail on an unresolvable location.
    async fn location_hint(&self) -> Option<LocationId> {
        match self.resolver.resolve().await {
            Ok(location_id) => Some(location_id),
            Err(e) => {
                warn!(error = %e, "reading without an inventory location");
                None
            }
        }
    }

    fn finish(&self, ctx: SyncContext<D>, report: SyncReport) -> Result<Synced<D>, SyncError> {
        let entity = ctx
            .canonical
            .ok_or_else(|| DomainError::invariant("workflow finished without a final read"))?;

        if report.is_degraded() {
            warn!(
                entity_id = %entity.remote_id(),
                failed_steps = ?report.failed(),
                "entity is only partially configured"
            );
        } else {
            info!(entity_id = %entity.remote_id(), "entity synchronized");
        }

        Ok(Synced {
            entity,
            report,
            mirror_record: ctx.mirror_record,
        })
    }
}

fn positive_price(price: Option<&str>) -> Option<String> {
    price
        .filter(|p| parse_amount(p).is_some_and(|v| v > 0.0))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_positive_prices_are_pushed() {
        assert_eq!(positive_price(Some("1500.00")).as_deref(), Some("1500.00"));
        assert_eq!(positive_price(Some("0")), None);
        assert_eq!(positive_price(Some("-3")), None);
        assert_eq!(positive_price(Some("abc")), None);
        assert_eq!(positive_price(None), None);
    }
}

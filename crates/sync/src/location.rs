//! Primary inventory location resolution.
//!
//! The first successful lookup is memoized for the lifetime of the resolver.
//! Concurrent first lookups are serialized by the slot lock, so the remote
//! query runs once.

use tokio::sync::Mutex;
use tracing::{debug, info};

use galeria_core::LocationId;

use crate::error::LocationError;
use crate::remote::CatalogApi;

pub struct LocationResolver {
    api: CatalogApi,
    slot: Mutex<Option<LocationId>>,
}

impl LocationResolver {
    pub fn new(api: CatalogApi) -> Self {
        Self {
            api,
            slot: Mutex::new(None),
        }
    }

    /// Resolver that starts out resolved, e.g. from configuration.
    pub fn with_location(api: CatalogApi, location_id: LocationId) -> Self {
        Self {
            api,
            slot: Mutex::new(Some(location_id)),
        }
    }

    /// The memoized location, looking it up on first use.
    ///
    /// Failures are not memoized; the next call retries the lookup.
    pub async fn resolve(&self) -> Result<LocationId, LocationError> {
        let mut slot = self.slot.lock().await;
        if let Some(location_id) = slot.as_ref() {
            debug!(location_id = %location_id, "using memoized location");
            return Ok(location_id.clone());
        }

        let location_id = self
            .api
            .active_location()
            .await?
            .ok_or(LocationError::Unresolvable)?;

        info!(location_id = %location_id, "resolved primary inventory location");
        *slot = Some(location_id.clone());
        Ok(location_id)
    }

    /// Currently memoized value, without a lookup.
    pub async fn cached(&self) -> Option<LocationId> {
        self.slot.lock().await.clone()
    }

    /// Forget the memoized value.
    pub async fn reset(&self) {
        *self.slot.lock().await = None;
    }
}

//! Remote commerce platform port.
//!
//! The platform speaks GraphQL. Transport-level failures and top-level GraphQL
//! errors surface as `Err`; business-rule failures come back as `userErrors`
//! inside a successful response and are checked by [`CatalogApi`].

pub mod api;
pub mod http;
pub mod queries;

#[cfg(test)]
pub(crate) mod fake;

use serde_json::Value as JsonValue;

use crate::error::RemoteError;

pub use api::{CatalogApi, ConnectionPage, InventoryTracking, VariantPrice};
pub use http::HttpRemoteClient;

/// `request(query, variables) -> data`.
#[async_trait::async_trait]
pub trait RemoteClient: Send + Sync {
    /// Execute a GraphQL document and return its `data` object.
    async fn request(&self, query: &str, variables: JsonValue) -> Result<JsonValue, RemoteError>;
}

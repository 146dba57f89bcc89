//! Local mirror store: a lightweight local row linking a local id to a remote id.
//!
//! Written once, after a successful create. The mirror is never reconciled with
//! the remote platform; a failed insert leaves the remote record unmirrored.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use galeria_core::{MirrorRecordId, RemoteId};

use crate::error::MirrorError;

pub use in_memory::InMemoryMirrorStore;
pub use postgres::PostgresMirrorStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRecord {
    pub id: MirrorRecordId,
    pub name: String,
    pub remote_id: RemoteId,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait MirrorStore: Send + Sync {
    async fn insert_record(
        &self,
        name: &str,
        remote_id: &RemoteId,
    ) -> Result<MirrorRecordId, MirrorError>;
}

#[async_trait::async_trait]
impl<S> MirrorStore for Arc<S>
where
    S: MirrorStore + ?Sized,
{
    async fn insert_record(
        &self,
        name: &str,
        remote_id: &RemoteId,
    ) -> Result<MirrorRecordId, MirrorError> {
        (**self).insert_record(name, remote_id).await
    }
}

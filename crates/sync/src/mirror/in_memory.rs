//! In-memory mirror store for tests/dev.

use std::sync::RwLock;

use chrono::Utc;

use galeria_core::{MirrorRecordId, RemoteId};

use super::{MirrorRecord, MirrorStore};
use crate::error::MirrorError;

#[derive(Debug, Default)]
pub struct InMemoryMirrorStore {
    records: RwLock<Vec<MirrorRecord>>,
    unavailable: RwLock<bool>,
}

impl InMemoryMirrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts fail, as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut flag) = self.unavailable.write() {
            *flag = unavailable;
        }
    }

    pub fn records(&self) -> Vec<MirrorRecord> {
        self.records
            .read()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn find_by_remote_id(&self, remote_id: &RemoteId) -> Option<MirrorRecord> {
        self.records
            .read()
            .ok()?
            .iter()
            .find(|r| &r.remote_id == remote_id)
            .cloned()
    }
}

#[async_trait::async_trait]
impl MirrorStore for InMemoryMirrorStore {
    async fn insert_record(
        &self,
        name: &str,
        remote_id: &RemoteId,
    ) -> Result<MirrorRecordId, MirrorError> {
        if self.unavailable.read().map(|flag| *flag).unwrap_or(true) {
            return Err(MirrorError::Unavailable("in-memory store switched off".into()));
        }

        let mut records = self
            .records
            .write()
            .map_err(|_| MirrorError::Unavailable("lock poisoned".into()))?;

        if records.iter().any(|r| &r.remote_id == remote_id) {
            return Err(MirrorError::Rejected(format!(
                "remote id {remote_id} already mirrored"
            )));
        }

        let record = MirrorRecord {
            id: MirrorRecordId::new(),
            name: name.to_string(),
            remote_id: remote_id.clone(),
            created_at: Utc::now(),
        };
        let id = record.id;
        records.push(record);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inserts_and_finds_by_remote_id() {
        let store = InMemoryMirrorStore::new();
        let remote = RemoteId::new("gid://shop/Product/1");

        let id = store.insert_record("Inauguración", &remote).await.unwrap();

        let record = store.find_by_remote_id(&remote).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.name, "Inauguración");
    }

    #[tokio::test]
    async fn duplicate_remote_ids_are_rejected() {
        let store = InMemoryMirrorStore::new();
        let remote = RemoteId::new("gid://shop/Product/1");
        store.insert_record("a", &remote).await.unwrap();

        let err = store.insert_record("b", &remote).await.unwrap_err();
        assert!(matches!(err, MirrorError::Rejected(_)));
        assert_eq!(store.records().len(), 1);
    }

    #[tokio::test]
    async fn unavailable_store_fails() {
        let store = InMemoryMirrorStore::new();
        store.set_unavailable(true);

        let err = store
            .insert_record("a", &RemoteId::new("gid://shop/Product/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Unavailable(_)));
    }
}

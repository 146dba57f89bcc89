//! Postgres-backed mirror store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | MirrorError |
//! |------------|----------------------|-------------|
//! | Database (unique violation) | `23505` | `Rejected` (remote id already mirrored) |
//! | Database (check constraint violation) | `23514` | `Rejected` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Other | N/A | `Unavailable` |

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;

use galeria_core::{MirrorRecordId, RemoteId};

use super::MirrorStore;
use crate::error::MirrorError;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS catalog_mirror (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    remote_id   TEXT NOT NULL UNIQUE CHECK (remote_id <> ''),
    created_at  TIMESTAMPTZ NOT NULL
)
"#;

#[derive(Debug, Clone)]
pub struct PostgresMirrorStore {
    pool: Arc<PgPool>,
}

impl PostgresMirrorStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the mirror table exists.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("failed to create Postgres pool for the mirror store")?;
        let store = Self::new(pool);
        store
            .ensure_schema()
            .await
            .context("failed to create catalog_mirror table")?;
        Ok(store)
    }

    /// Create the mirror table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), MirrorError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MirrorStore for PostgresMirrorStore {
    #[instrument(skip(self), fields(remote_id = %remote_id), err)]
    async fn insert_record(
        &self,
        name: &str,
        remote_id: &RemoteId,
    ) -> Result<MirrorRecordId, MirrorError> {
        let id = MirrorRecordId::new();

        sqlx::query(
            r#"
            INSERT INTO catalog_mirror (id, name, remote_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id.as_uuid())
        .bind(name)
        .bind(remote_id.as_str())
        .bind(Utc::now())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_record", e))?;

        Ok(id)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> MirrorError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23514") => MirrorError::Rejected(msg),
                _ => MirrorError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            MirrorError::Unavailable(format!("connection pool closed in {}", operation))
        }
        other => MirrorError::Unavailable(format!("{} failed: {}", operation, other)),
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::StoreError;
use crate::id::RealmId;
use crate::service::WorldStore;

/// Snapshot store backed by the `realm_snapshots` table.
#[derive(Debug, Clone)]
pub struct PgWorldStore {
    pool: PgPool,
}

impl PgWorldStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorldStore for PgWorldStore {
    async fn save(&self, realm: &RealmId, blob: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO realm_snapshots (realm_id, blob, saved_at) VALUES ($1, $2, now()) \
             ON CONFLICT (realm_id) DO UPDATE SET blob = EXCLUDED.blob, saved_at = EXCLUDED.saved_at",
        )
        .bind(&realm.0)
        .bind(blob)
        .execute(&self.pool)
        .await?;
        debug!(%realm, bytes = blob.len(), "snapshot saved");
        Ok(())
    }

    async fn load(&self, realm: &RealmId) -> Result<Option<String>, StoreError> {
        let blob: Option<String> = sqlx::query_scalar("SELECT blob FROM realm_snapshots WHERE realm_id = $1")
            .bind(&realm.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(blob)
    }
}

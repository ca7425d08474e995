use crate::storage::{SnapshotStore, StoreError};
use anyhow::Context;

/// Snapshot values kept in `price_snapshots`, one row per key.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: sqlx::PgPool,
}

impl PgSnapshotStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for PgSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM price_snapshots WHERE key = $1")
                .persistent(false)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("select price_snapshots failed (key={key})"))
                .map_err(StoreError::Backend)?;

        Ok(row.map(|(value,)| value))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO price_snapshots (key, value, updated_at) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (key) DO UPDATE SET \
               value = EXCLUDED.value, \
               updated_at = now()",
        )
        .persistent(false)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("upsert price_snapshots failed (key={key})"))
        .map_err(StoreError::Backend)?;

        Ok(())
    }
}

pub mod file;
pub mod memory;
pub mod postgres;

pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use postgres::PgSnapshotStore;

use crate::domain::PriceSnapshot;
use anyhow::Context;

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot store backend error: {0}")]
    Backend(#[source] anyhow::Error),

    #[error("stored snapshot under key {key} is not a price map: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// String-valued key/value store holding the last-known snapshot.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// `Ok(None)` is the "key not found" signal.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites any existing value.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Loads the last snapshot. A missing key is a first run and yields an empty
/// snapshot; backend failures and undecodable values are errors.
pub async fn load_last_prices(
    store: &dyn SnapshotStore,
    key: &str,
) -> Result<PriceSnapshot, StoreError> {
    let Some(raw) = store.get(key).await? else {
        tracing::info!(key, backend = store.backend_name(), "no stored snapshot; starting empty");
        return Ok(PriceSnapshot::new());
    };

    serde_json::from_str::<PriceSnapshot>(&raw).map_err(|source| StoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

/// Replaces the stored snapshot with `prices`.
pub async fn persist_prices(
    store: &dyn SnapshotStore,
    key: &str,
    prices: &PriceSnapshot,
) -> Result<(), StoreError> {
    let value = serde_json::to_string(prices).map_err(StoreError::Encode)?;
    store.put(key, &value).await
}

use crate::storage::{SnapshotStore, StoreError};
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One `<key>.json` file per key under a directory. Writes go through a temp
/// file and a rename so a crashed write never leaves a truncated snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FileSnapshotStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context(format!("read {} failed", path.display())),
            )),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let res: anyhow::Result<()> = async {
            tokio::fs::create_dir_all(&self.dir)
                .await
                .with_context(|| format!("create {} failed", self.dir.display()))?;
            tokio::fs::write(&tmp, value)
                .await
                .with_context(|| format!("write {} failed", tmp.display()))?;
            tokio::fs::rename(&tmp, &path)
                .await
                .with_context(|| format!("rename to {} failed", path.display()))?;
            Ok::<(), anyhow::Error>(())
        }
        .await;

        if res.is_err() {
            if let Err(err) = tokio::fs::remove_file(&tmp).await {
                if err.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %err, "failed to remove temp snapshot");
                }
            }
        }

        res.map_err(StoreError::Backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceSnapshot;
    use crate::storage::{load_last_prices, persist_prices};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("pricewatch-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let store = FileSnapshotStore::new(scratch_dir());
        assert_eq!(store.get("CryptoLastPrices").await.unwrap(), None);
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let dir = scratch_dir();
        let store = FileSnapshotStore::new(&dir);
        let prices: PriceSnapshot = [("ETHUSDT", 2000.0)].into_iter().collect();

        persist_prices(&store, "CryptoLastPrices", &prices).await.unwrap();
        assert!(dir.join("CryptoLastPrices.json").exists());

        // A fresh handle sees what the previous run wrote.
        let next_run = FileSnapshotStore::new(&dir);
        let loaded = load_last_prices(&next_run, "CryptoLastPrices").await.unwrap();
        assert_eq!(loaded, prices);

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = scratch_dir();
        let store = FileSnapshotStore::new(&dir);
        // A directory where the snapshot file should go makes the rename fail.
        tokio::fs::create_dir_all(dir.join("CryptoLastPrices.json")).await.unwrap();

        let err = store.put("CryptoLastPrices", "{}").await.unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
        assert!(!dir.join("CryptoLastPrices.json.tmp").exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[test]
    fn key_is_sanitized_into_file_name() {
        let store = FileSnapshotStore::new("/tmp/x");
        assert_eq!(store.path_for("a/b c"), PathBuf::from("/tmp/x/a_b_c.json"));
    }
}

//! JSON file backed item store.
//!
//! Each write is staged on a copy of the collection, flushed to disk with a
//! write-then-rename, and only then made visible. A failed flush leaves both
//! the file and the in-memory view at their prior state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use review_core::{ItemContent, ItemKey, LearningItem, SchedulePatch};
use tokio::sync::{watch, Mutex};

use super::{Collection, ItemStore, Snapshot, StoreError};

pub struct JsonFileStore {
    path: PathBuf,
    collection: Mutex<Collection>,
    feed: watch::Sender<Snapshot>,
}

impl JsonFileStore {
    /// Open the collection at `path`. A missing file is an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let items: Vec<LearningItem> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!("Loaded {} items from {}", items.len(), path.display());

        let collection = Collection::from_items(items);
        let (feed, _) = watch::channel(collection.snapshot());
        Ok(Self {
            path,
            collection: Mutex::new(collection),
            feed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `op` to a copy of the collection, persist the copy, then swap
    /// it in and publish.
    async fn commit<T>(
        &self,
        op: impl FnOnce(&mut Collection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut current = self.collection.lock().await;
        let mut staged = current.clone();
        let value = op(&mut staged)?;

        let snapshot = staged.snapshot();
        self.flush(&snapshot).await?;

        *current = staged;
        self.feed.send_replace(snapshot);
        Ok(value)
    }

    async fn flush(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(snapshot.as_slice())?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!("Flushed {} items to {}", snapshot.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl ItemStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<LearningItem>, StoreError> {
        Ok(self.collection.lock().await.snapshot().to_vec())
    }

    async fn insert(&self, item: LearningItem) -> Result<LearningItem, StoreError> {
        self.commit(|collection| collection.insert(item)).await
    }

    async fn update_schedule(
        &self,
        key: &ItemKey,
        patch: SchedulePatch,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.commit(|collection| collection.update_schedule(key, patch, expected_version))
            .await
    }

    async fn update_content(
        &self,
        key: &ItemKey,
        content: ItemContent,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.commit(|collection| collection.update_content(key, content, expected_version))
            .await
    }

    async fn delete(&self, key: &ItemKey) -> Result<(), StoreError> {
        self.commit(|collection| collection.delete(key)).await
    }

    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.feed.subscribe()
    }
}

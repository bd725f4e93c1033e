//! In-memory item store.

use async_trait::async_trait;
use review_core::{ItemContent, ItemKey, LearningItem, SchedulePatch};
use tokio::sync::{watch, RwLock};

use super::{Collection, ItemStore, Snapshot, StoreError};

/// Item store held entirely in memory, with a live feed.
pub struct MemoryStore {
    collection: RwLock<Collection>,
    feed: watch::Sender<Snapshot>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_items(Vec::new())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = LearningItem>) -> Self {
        let collection = Collection::from_items(items);
        let (feed, _) = watch::channel(collection.snapshot());
        Self {
            collection: RwLock::new(collection),
            feed,
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.feed.borrow().clone()
    }

    fn publish(&self, collection: &Collection) {
        self.feed.send_replace(collection.snapshot());
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn load(&self) -> Result<Vec<LearningItem>, StoreError> {
        Ok(self.collection.read().await.snapshot().to_vec())
    }

    async fn insert(&self, item: LearningItem) -> Result<LearningItem, StoreError> {
        let mut collection = self.collection.write().await;
        let stored = collection.insert(item)?;
        self.publish(&collection);
        tracing::debug!("Inserted item {}", stored.key);
        Ok(stored)
    }

    async fn update_schedule(
        &self,
        key: &ItemKey,
        patch: SchedulePatch,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut collection = self.collection.write().await;
        let version = collection.update_schedule(key, patch, expected_version)?;
        self.publish(&collection);
        Ok(version)
    }

    async fn update_content(
        &self,
        key: &ItemKey,
        content: ItemContent,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut collection = self.collection.write().await;
        let version = collection.update_content(key, content, expected_version)?;
        self.publish(&collection);
        Ok(version)
    }

    async fn delete(&self, key: &ItemKey) -> Result<(), StoreError> {
        let mut collection = self.collection.write().await;
        collection.delete(key)?;
        self.publish(&collection);
        tracing::debug!("Deleted item {}", key);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.feed.subscribe()
    }
}

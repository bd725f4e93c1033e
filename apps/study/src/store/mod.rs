//! Item store collaborator.
//!
//! The host reads a learner's whole collection from a live feed and writes
//! back one schedule patch at a time. Every accepted write bumps the item's
//! version; a write carrying a stale version is rejected so two sessions
//! for the same learner cannot silently overwrite each other.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use review_core::{ItemContent, ItemKey, LearningItem, SchedulePatch};
use thiserror::Error;
use tokio::sync::watch;

/// Point-in-time view of a collection, newest items first.
pub type Snapshot = Arc<Vec<LearningItem>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Item already exists: {0}")]
    Duplicate(String),

    #[error("Version conflict on {key}: expected {expected}, found {found}")]
    VersionConflict {
        key: String,
        expected: u64,
        found: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// One learner's item collection.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetch the full current collection.
    async fn load(&self) -> Result<Vec<LearningItem>, StoreError>;

    /// Create an item. Fails with `Duplicate` if the key is taken.
    async fn insert(&self, item: LearningItem) -> Result<LearningItem, StoreError>;

    /// Write the schedule fields of one item if it is still at
    /// `expected_version`. Returns the new version.
    async fn update_schedule(
        &self,
        key: &ItemKey,
        patch: SchedulePatch,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    /// Replace the content of one item if it is still at
    /// `expected_version`, keeping its key and schedule. Returns the new
    /// version.
    async fn update_content(
        &self,
        key: &ItemKey,
        content: ItemContent,
        expected_version: u64,
    ) -> Result<u64, StoreError>;

    async fn delete(&self, key: &ItemKey) -> Result<(), StoreError>;

    /// Live feed of the collection, updated after every accepted write.
    fn subscribe(&self) -> watch::Receiver<Snapshot>;
}

/// Keyed collection enforcing the store's write rules.
#[derive(Debug, Clone, Default)]
pub(crate) struct Collection {
    items: HashMap<ItemKey, LearningItem>,
}

impl Collection {
    pub(crate) fn from_items(items: impl IntoIterator<Item = LearningItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.key.clone(), item))
                .collect(),
        }
    }

    pub(crate) fn insert(&mut self, mut item: LearningItem) -> Result<LearningItem, StoreError> {
        if self.items.contains_key(&item.key) {
            return Err(StoreError::Duplicate(item.key.to_string()));
        }
        item.version = 1;
        self.items.insert(item.key.clone(), item.clone());
        Ok(item)
    }

    pub(crate) fn update_schedule(
        &mut self,
        key: &ItemKey,
        patch: SchedulePatch,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let item = self.at_version(key, expected_version)?;
        patch.apply_to(item);
        item.version += 1;
        Ok(item.version)
    }

    pub(crate) fn update_content(
        &mut self,
        key: &ItemKey,
        content: ItemContent,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let item = self.at_version(key, expected_version)?;
        item.content = content;
        item.version += 1;
        Ok(item.version)
    }

    fn at_version(
        &mut self,
        key: &ItemKey,
        expected_version: u64,
    ) -> Result<&mut LearningItem, StoreError> {
        let item = self
            .items
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if item.version != expected_version {
            return Err(StoreError::VersionConflict {
                key: key.to_string(),
                expected: expected_version,
                found: item.version,
            });
        }
        Ok(item)
    }

    pub(crate) fn delete(&mut self, key: &ItemKey) -> Result<(), StoreError> {
        self.items
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let mut items: Vec<LearningItem> = self.items.values().cloned().collect();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        Arc::new(items)
    }
}

//! Error handling for the study host

use review_core::{ItemKey, ScheduleError};
use thiserror::Error;

use crate::store::StoreError;

/// Study operation errors
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Failed to persist {key}: {source}")]
    PersistenceWriteFailed {
        key: ItemKey,
        #[source]
        source: StoreError,
    },

    #[error("Unknown item: {0}")]
    UnknownItem(ItemKey),

    #[error("Item not due: {0}")]
    NotDue(ItemKey),

    #[error("Item busy: {0} has a write in flight")]
    ItemBusy(ItemKey),

    #[error("Duplicate item: {0}")]
    DuplicateItem(ItemKey),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl StudyError {
    /// Whether the caller may simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceWriteFailed { .. } | Self::ItemBusy(_))
    }
}

/// Result type alias for study operations
pub type Result<T> = std::result::Result<T, StudyError>;

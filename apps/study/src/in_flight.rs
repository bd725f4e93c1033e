//! Per-item write claims.
//!
//! At most one schedule write per item may be outstanding. Claimed items
//! are also withheld from the due set, so an item whose state is still in
//! flight is never presented.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use review_core::ItemKey;

#[derive(Debug, Clone, Default)]
pub struct InFlight {
    claimed: Arc<Mutex<HashSet<ItemKey>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, or `None` if another write already holds it. The claim
    /// lasts until the guard is dropped.
    pub fn try_claim(&self, key: &ItemKey) -> Option<InFlightGuard> {
        let mut claimed = self.claimed.lock().unwrap_or_else(PoisonError::into_inner);
        if !claimed.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            key: key.clone(),
            claimed: Arc::clone(&self.claimed),
        })
    }

    pub fn is_claimed(&self, key: &ItemKey) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    /// Keys currently claimed.
    pub fn snapshot(&self) -> HashSet<ItemKey> {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Releases its claim on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    key: ItemKey,
    claimed: Arc<Mutex<HashSet<ItemKey>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

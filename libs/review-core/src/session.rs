//! Ephemeral study-session state.
//!
//! Nothing here is persisted. Dropping a session loses only the current
//! pick and the revealed flags; item schedules live in the store.

use std::collections::HashSet;

use rand::Rng;

use crate::due::DueSet;
use crate::picker::pick_next;
use crate::types::ItemKey;

#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    current: Option<ItemKey>,
    started_with: HashSet<ItemKey>,
    revealed: HashSet<ItemKey>,
    applied: usize,
}

impl ReviewSession {
    /// Enter study mode with the items due right now.
    pub fn start(due: &DueSet) -> Self {
        Self {
            started_with: due.keys().cloned().collect(),
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<&ItemKey> {
        self.current.as_ref()
    }

    /// Keys that were due when the session started.
    pub fn started_with(&self) -> &HashSet<ItemKey> {
        &self.started_with
    }

    /// Transitions confirmed by the store during this session.
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Current pick, choosing a fresh one when there is none or the old one
    /// has left the due set.
    pub fn next<R: Rng + ?Sized>(&mut self, due: &DueSet, rng: &mut R) -> Option<&ItemKey> {
        if matches!(&self.current, Some(key) if !due.contains(key)) {
            self.current = None;
        }
        if self.current.is_none() {
            self.current = pick_next(due, rng);
        }
        self.current.as_ref()
    }

    /// Show or hide the answer of `key`. Showing one item hides any other.
    /// Returns whether `key` is now revealed.
    pub fn toggle_reveal(&mut self, key: &ItemKey) -> bool {
        if self.revealed.remove(key) {
            return false;
        }
        self.revealed.clear();
        self.revealed.insert(key.clone());
        true
    }

    pub fn is_revealed(&self, key: &ItemKey) -> bool {
        self.revealed.contains(key)
    }

    /// A write for `key` is about to start: release the pick so the next
    /// item is chosen fresh.
    pub fn begin_transition(&mut self, key: &ItemKey) {
        if self.current.as_ref() == Some(key) {
            self.current = None;
        }
    }

    /// The write for `key` was confirmed.
    pub fn complete_transition(&mut self, key: &ItemKey) {
        self.revealed.remove(key);
        self.applied += 1;
    }

    /// The write for `key` failed: put it back in front of the reviewer,
    /// answer still shown, so the rating can be re-attempted.
    pub fn abort_transition(&mut self, key: &ItemKey) {
        self.current = Some(key.clone());
    }
}

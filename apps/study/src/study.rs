//! Study driver.
//!
//! Owns one study session for one learner: keeps the latest collection
//! snapshot and "now", presents items through the picker, and pushes rating
//! outcomes to the store. A transition counts only once the store confirms
//! it; until then the item is claimed and withheld from the due set.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use review_core::{
    is_due, select_due, DueSet, ItemContent, ItemKey, LearningItem, Phase, PhaseCounts, Rating,
    ReviewOutcome, ReviewSession, Scheduler,
};
use tokio::sync::watch;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Result, StudyError};
use crate::filter::ItemFilter;
use crate::in_flight::InFlight;
use crate::store::{ItemStore, Snapshot, StoreError};

pub struct StudyDriver {
    id: Uuid,
    store: Arc<dyn ItemStore>,
    scheduler: Scheduler,
    clock: Arc<dyn Clock>,
    filter: ItemFilter,
    in_flight: InFlight,
    session: ReviewSession,
    items: Snapshot,
    now: DateTime<Utc>,
    feed: watch::Receiver<Snapshot>,
    ticks: watch::Receiver<DateTime<Utc>>,
    rng: StdRng,
}

impl StudyDriver {
    /// Enter study mode. `ticks` is the periodic "now" refresh; `clock` is
    /// read directly when a transition is computed.
    pub fn new(
        store: Arc<dyn ItemStore>,
        scheduler: Scheduler,
        clock: Arc<dyn Clock>,
        ticks: watch::Receiver<DateTime<Utc>>,
    ) -> Self {
        let mut feed = store.subscribe();
        let items = feed.borrow_and_update().clone();
        let now = clock.now();
        let mut driver = Self {
            id: Uuid::new_v4(),
            store,
            scheduler,
            clock,
            filter: ItemFilter::default(),
            in_flight: InFlight::new(),
            session: ReviewSession::default(),
            items,
            now,
            feed,
            ticks,
            rng: StdRng::from_entropy(),
        };
        driver.restart();
        tracing::info!(
            session = %driver.id,
            policy = driver.scheduler.intervals().name(),
            due = driver.session.started_with().len(),
            "Study session started"
        );
        driver
    }

    pub fn with_filter(mut self, filter: ItemFilter) -> Self {
        self.filter = filter;
        self.restart();
        self
    }

    /// Share write claims with other drivers for the same learner.
    pub fn with_in_flight(mut self, in_flight: InFlight) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn restart(&mut self) {
        self.session = ReviewSession::start(&self.due());
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn items(&self) -> &[LearningItem] {
        &self.items
    }

    pub fn item(&self, key: &ItemKey) -> Option<&LearningItem> {
        self.items.iter().find(|item| &item.key == key)
    }

    /// Take in the latest feed snapshot and clock tick, if any.
    /// Returns whether either moved.
    pub fn sync(&mut self) -> bool {
        let moved = self.feed.has_changed().unwrap_or(false)
            || self.ticks.has_changed().unwrap_or(false);
        if moved {
            self.refresh();
        }
        moved
    }

    /// Wait for the feed or the clock to move, then take in both. Returns
    /// `false` once either source has closed.
    pub async fn changed(&mut self) -> bool {
        let open = tokio::select! {
            result = self.feed.changed() => result.is_ok(),
            result = self.ticks.changed() => result.is_ok(),
        };
        self.refresh();
        open
    }

    /// Copy the latest snapshot and tick, marking both seen. "Now" never
    /// moves backwards past a time already used for a transition.
    fn refresh(&mut self) {
        self.items = self.feed.borrow_and_update().clone();
        self.now = self.now.max(*self.ticks.borrow_and_update());
        tracing::debug!(session = %self.id, items = self.items.len(), now = %self.now, "Refreshed");
    }

    /// Items actionable now, after the filter, minus claimed items.
    pub fn due(&self) -> DueSet {
        let exclude = self.in_flight.snapshot();
        select_due(
            self.filter.apply(&self.items),
            self.now,
            self.scheduler.day_boundary(),
            &exclude,
        )
    }

    pub fn counts(&self) -> PhaseCounts {
        self.due().counts()
    }

    /// Item to present, or `None` when the session is complete.
    pub fn current(&mut self) -> Option<&LearningItem> {
        self.sync();
        let due = self.due();
        let key = self.session.next(&due, &mut self.rng)?.clone();
        let item = self.item(&key)?;
        tracing::debug!(
            session = %self.id,
            item = %key,
            phase = Phase::of(&item.schedule).number(),
            "Presenting"
        );
        Some(item)
    }

    pub fn toggle_reveal(&mut self, key: &ItemKey) -> bool {
        self.session.toggle_reveal(key)
    }

    pub fn is_revealed(&self, key: &ItemKey) -> bool {
        self.session.is_revealed(key)
    }

    /// Rate `key` with a wire token and persist the outcome. Only items
    /// that are due may be rated.
    #[tracing::instrument(skip(self), fields(session = %self.id))]
    pub async fn rate(&mut self, key: &ItemKey, token: &str) -> Result<ReviewOutcome> {
        let rating = token.parse::<Rating>()?;
        let (item, now) = self.lookup_due(key)?;
        let outcome = self.scheduler.rate(&item, rating, now);
        self.commit(&item, outcome, now).await
    }

    /// Skip the rest of the ladder for `key` and persist the outcome.
    #[tracing::instrument(skip(self), fields(session = %self.id))]
    pub async fn finish_early(&mut self, key: &ItemKey) -> Result<ReviewOutcome> {
        let (item, now) = self.lookup_due(key)?;
        let outcome = self.scheduler.finish_early(&item, now)?;
        self.commit(&item, outcome, now).await
    }

    /// Replace the content of `key`. Its schedule is left as it is.
    #[tracing::instrument(skip(self, content), fields(session = %self.id))]
    pub async fn edit_item(&mut self, key: &ItemKey, content: ItemContent) -> Result<LearningItem> {
        ItemKey::from_term(&content.term)?;
        let item = self.lookup(key)?;
        let _claim = self
            .in_flight
            .try_claim(key)
            .ok_or_else(|| StudyError::ItemBusy(key.clone()))?;

        let version = self
            .store
            .update_content(key, content.clone(), item.version)
            .await
            .map_err(|source| {
                tracing::warn!(item = %key, error = %source, "Edit not persisted");
                StudyError::PersistenceWriteFailed {
                    key: key.clone(),
                    source,
                }
            })?;

        let mut edited = item;
        edited.content = content;
        edited.version = version;
        if let Some(local) = Arc::make_mut(&mut self.items)
            .iter_mut()
            .find(|local| local.key == *key)
        {
            *local = edited.clone();
        }
        tracing::info!(item = %key, "Item edited");
        Ok(edited)
    }

    /// Create a new item from generated or typed content.
    #[tracing::instrument(skip(self, content), fields(session = %self.id, term = %content.term))]
    pub async fn add_item(&mut self, content: ItemContent) -> Result<LearningItem> {
        let item = self.scheduler.introduce(content, self.clock.now())?;
        if self.item(&item.key).is_some() {
            return Err(StudyError::DuplicateItem(item.key));
        }
        let key = item.key.clone();
        let stored = self.store.insert(item).await.map_err(|e| match e {
            StoreError::Duplicate(_) => StudyError::DuplicateItem(key),
            other => StudyError::Store(other),
        })?;
        tracing::info!(item = %stored.key, "Item added");
        Ok(stored)
    }

    #[tracing::instrument(skip(self), fields(session = %self.id))]
    pub async fn delete_item(&mut self, key: &ItemKey) -> Result<()> {
        let _claim = self
            .in_flight
            .try_claim(key)
            .ok_or_else(|| StudyError::ItemBusy(key.clone()))?;
        self.store.delete(key).await?;
        self.session.begin_transition(key);
        tracing::info!(item = %key, "Item deleted");
        Ok(())
    }

    fn lookup(&mut self, key: &ItemKey) -> Result<LearningItem> {
        self.sync();
        self.item(key)
            .cloned()
            .ok_or_else(|| StudyError::UnknownItem(key.clone()))
    }

    /// Look up `key` and read the clock, refusing items that are not due.
    /// Claimed items still pass so the claim check can report them busy.
    fn lookup_due(&mut self, key: &ItemKey) -> Result<(LearningItem, DateTime<Utc>)> {
        let item = self.lookup(key)?;
        let now = self.clock.now().max(self.now);
        if !is_due(&item, now, self.scheduler.day_boundary()) {
            return Err(StudyError::NotDue(item.key));
        }
        Ok((item, now))
    }

    async fn commit(
        &mut self,
        item: &LearningItem,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        let key = outcome.key.clone();
        let _claim = self
            .in_flight
            .try_claim(&key)
            .ok_or_else(|| StudyError::ItemBusy(key.clone()))?;
        self.session.begin_transition(&key);

        match self
            .store
            .update_schedule(&key, outcome.patch, item.version)
            .await
        {
            Ok(version) => {
                if let Some(local) = Arc::make_mut(&mut self.items)
                    .iter_mut()
                    .find(|local| local.key == key)
                {
                    outcome.apply_to(local);
                    local.version = version;
                }
                self.now = self.now.max(now);
                self.session.complete_transition(&key);
                tracing::info!(
                    item = %key,
                    kind = ?outcome.kind,
                    step = ?outcome.patch.learning_step(),
                    due_at = %outcome.patch.due_at,
                    "Review applied"
                );
                Ok(outcome)
            }
            Err(source) => {
                tracing::warn!(item = %key, error = %source, "Review not persisted");
                self.session.abort_transition(&key);
                Err(StudyError::PersistenceWriteFailed { key, source })
            }
        }
    }
}

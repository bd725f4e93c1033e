//! Shared test infrastructure for study integration tests.
//!
//! - TestContext wires a MemoryStore, a ManualClock and a hand-driven tick
//!   channel into study drivers
//! - FlakyStore and GatedStore wrap a MemoryStore to inject write failures
//!   and to hold writes open

#![allow(dead_code)]

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use review_core::{ItemContent, ItemKey, LearningItem, SchedulePatch, Scheduler, SchedulerSettings};
use tokio::sync::{watch, Notify};

use vocab_study::{Clock, InFlight, ItemStore, ManualClock, MemoryStore, Snapshot, StoreError, StudyDriver};

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
    pub ticks: watch::Sender<DateTime<Utc>>,
    pub in_flight: InFlight,
}

impl TestContext {
    pub fn new(items: Vec<LearningItem>) -> Self {
        let clock = ManualClock::new(fixtures::start());
        let (ticks, _) = watch::channel(clock.now());
        Self {
            store: Arc::new(MemoryStore::with_items(items)),
            clock,
            ticks,
            in_flight: InFlight::new(),
        }
    }

    /// Driver on the shared memory store.
    pub fn driver(&self) -> StudyDriver {
        self.driver_on(self.store.clone())
    }

    /// Driver on another store, sharing this context's clock and claims.
    pub fn driver_on(&self, store: Arc<dyn ItemStore>) -> StudyDriver {
        StudyDriver::new(
            store,
            utc_scheduler(),
            Arc::new(self.clock.clone()),
            self.ticks.subscribe(),
        )
        .with_in_flight(self.in_flight.clone())
        .with_seed(7)
    }

    /// Move the clock and publish the new time as a tick.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
        self.ticks.send_replace(self.clock.now());
    }

    pub fn stored(&self, term: &str) -> LearningItem {
        self.store
            .snapshot()
            .iter()
            .find(|item| item.key.as_str() == term)
            .cloned()
            .expect("item should be in the store")
    }
}

/// Default settings with days counted in UTC, so results do not depend on
/// the machine's time zone.
pub fn utc_scheduler() -> Scheduler {
    Scheduler::new(SchedulerSettings {
        utc_offset_minutes: Some(0),
        ..Default::default()
    })
    .expect("UTC settings are valid")
}

/// Fails the next `failures` item writes, then behaves like `inner`.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }

    fn fail_next(&self) -> Result<(), StoreError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for FlakyStore {
    async fn load(&self) -> Result<Vec<LearningItem>, StoreError> {
        self.inner.load().await
    }

    async fn insert(&self, item: LearningItem) -> Result<LearningItem, StoreError> {
        self.inner.insert(item).await
    }

    async fn update_schedule(
        &self,
        key: &ItemKey,
        patch: SchedulePatch,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.fail_next()?;
        self.inner.update_schedule(key, patch, expected_version).await
    }

    async fn update_content(
        &self,
        key: &ItemKey,
        content: ItemContent,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.fail_next()?;
        self.inner.update_content(key, content, expected_version).await
    }

    async fn delete(&self, key: &ItemKey) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.subscribe()
    }
}

/// Holds every item write until `release` is called.
pub struct GatedStore {
    inner: Arc<MemoryStore>,
    pub entered: Notify,
    gate: Notify,
}

impl GatedStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            entered: Notify::new(),
            gate: Notify::new(),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    async fn hold(&self) {
        self.entered.notify_one();
        self.gate.notified().await;
    }
}

#[async_trait]
impl ItemStore for GatedStore {
    async fn load(&self) -> Result<Vec<LearningItem>, StoreError> {
        self.inner.load().await
    }

    async fn insert(&self, item: LearningItem) -> Result<LearningItem, StoreError> {
        self.inner.insert(item).await
    }

    async fn update_schedule(
        &self,
        key: &ItemKey,
        patch: SchedulePatch,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.hold().await;
        self.inner.update_schedule(key, patch, expected_version).await
    }

    async fn update_content(
        &self,
        key: &ItemKey,
        content: ItemContent,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        self.hold().await;
        self.inner.update_content(key, content, expected_version).await
    }

    async fn delete(&self, key: &ItemKey) -> Result<(), StoreError> {
        self.inner.delete(key).await
    }

    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.subscribe()
    }
}

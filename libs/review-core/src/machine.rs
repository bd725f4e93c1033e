//! Review state machine.
//!
//! `New -> Cramming(0..=2) -> Graduated`, with `very_hard` resetting any
//! state to `Cramming(0)` and an explicit early finish graduating from any
//! ladder position. The scheduler only computes outcomes; writing them to
//! the store and clearing session flags is the host's job.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::due::DayBoundary;
use crate::error::{Result, ScheduleError};
use crate::interval::{FixedIntervals, IntervalPolicy};
use crate::ladder::{Ladder, Transition, TransitionKind};
use crate::settings::SchedulerSettings;
use crate::types::{ItemContent, ItemKey, LearningItem, Rating, SchedulePatch, ScheduleState};

/// Result of rating one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    pub key: ItemKey,
    pub kind: TransitionKind,
    pub patch: SchedulePatch,
}

impl ReviewOutcome {
    fn new(key: &ItemKey, transition: Transition) -> Self {
        Self {
            key: key.clone(),
            kind: transition.kind,
            patch: transition.patch(),
        }
    }

    pub fn apply_to(&self, item: &mut LearningItem) {
        self.patch.apply_to(item);
    }
}

/// Stateless scheduler for one learner's settings.
#[derive(Debug, Clone)]
pub struct Scheduler {
    settings: SchedulerSettings,
    intervals: FixedIntervals,
    ladder: Ladder,
    boundary: DayBoundary,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::build(SchedulerSettings::default())
    }
}

impl Scheduler {
    pub fn new(settings: SchedulerSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: SchedulerSettings) -> Self {
        Self {
            intervals: FixedIntervals::from_settings(&settings),
            ladder: Ladder::from_settings(&settings),
            boundary: DayBoundary::from_settings(&settings),
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    pub fn intervals(&self) -> &dyn IntervalPolicy {
        &self.intervals
    }

    pub fn day_boundary(&self) -> &DayBoundary {
        &self.boundary
    }

    pub fn rate(&self, item: &LearningItem, rating: Rating, now: DateTime<Utc>) -> ReviewOutcome {
        let transition = self.ladder.apply(item.schedule, rating, now, &self.intervals);
        ReviewOutcome::new(&item.key, transition)
    }

    /// Rate with a raw wire token. Unknown tokens are rejected before any
    /// schedule is computed.
    pub fn rate_token(
        &self,
        item: &LearningItem,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        let rating = token.parse::<Rating>()?;
        Ok(self.rate(item, rating, now))
    }

    /// Skip the rest of the ladder and graduate with the `medium` interval.
    pub fn finish_early(&self, item: &LearningItem, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        self.ladder
            .finish_early(item.schedule, now, &self.intervals)
            .map(|transition| ReviewOutcome::new(&item.key, transition))
            .ok_or_else(|| ScheduleError::NotInLadder(item.key.to_string()))
    }

    /// Build a freshly created item, first due after the new-item delay.
    pub fn introduce(&self, content: ItemContent, now: DateTime<Utc>) -> Result<LearningItem> {
        let key = ItemKey::from_term(&content.term)?;
        Ok(LearningItem {
            key,
            due_at: Some(
                now.checked_add_signed(self.settings.new_item_delay())
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            schedule: ScheduleState::New,
            created_at: now,
            version: 0,
            content,
        })
    }
}

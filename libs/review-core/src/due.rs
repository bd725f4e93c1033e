//! Due-set selection.
//!
//! Ladder items are compared to "now" exactly, so a rung requeued a minute
//! ago is due right away and one requeued for later is not. Everything else
//! is compared by study day: an item due at any time today is actionable
//! for the whole day.

use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::picker::Phase;
use crate::settings::SchedulerSettings;
use crate::types::{ItemKey, LearningItem, ScheduleState};

/// Calendar the learner reads days from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// Host time zone, including its daylight-saving changes.
    Local,
    Fixed(FixedOffset),
}

/// Where one study day ends and the next begins for a learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    zone: Zone,
    reset_hour: u32,
}

impl DayBoundary {
    /// Days counted in a fixed UTC offset.
    pub fn new(offset: FixedOffset, reset_hour: u32) -> Self {
        Self {
            zone: Zone::Fixed(offset),
            reset_hour,
        }
    }

    /// Days counted in the host's local time zone.
    pub fn local(reset_hour: u32) -> Self {
        Self {
            zone: Zone::Local,
            reset_hour,
        }
    }

    pub fn from_settings(settings: &SchedulerSettings) -> Self {
        match settings.utc_offset() {
            Some(offset) => Self::new(offset, settings.daily_reset_hour),
            None => Self::local(settings.daily_reset_hour),
        }
    }

    /// Study day containing `at`.
    ///
    /// Before the reset hour it is still "yesterday", so late-night study
    /// counts towards the previous day.
    pub fn study_day(&self, at: DateTime<Utc>) -> NaiveDate {
        let local = match self.zone {
            Zone::Local => at.with_timezone(&Local).naive_local(),
            Zone::Fixed(offset) => at.with_timezone(&offset).naive_local(),
        };
        if local.hour() < self.reset_hour {
            (local - Duration::days(1)).date()
        } else {
            local.date()
        }
    }
}

/// Whether `item` is actionable at `now`.
pub fn is_due(item: &LearningItem, now: DateTime<Utc>, boundary: &DayBoundary) -> bool {
    let Some(due_at) = item.due_at else {
        return true;
    };
    match item.schedule {
        ScheduleState::Cramming { .. } => due_at <= now,
        ScheduleState::New | ScheduleState::Graduated => {
            boundary.study_day(due_at) <= boundary.study_day(now)
        }
    }
}

/// Select every actionable item, skipping keys in `exclude` (items whose
/// schedule write has not resolved yet).
pub fn select_due<'a, I>(
    items: I,
    now: DateTime<Utc>,
    boundary: &DayBoundary,
    exclude: &HashSet<ItemKey>,
) -> DueSet
where
    I: IntoIterator<Item = &'a LearningItem>,
{
    let entries = items
        .into_iter()
        .filter(|item| !exclude.contains(&item.key))
        .filter(|item| is_due(item, now, boundary))
        .map(|item| DueEntry {
            key: item.key.clone(),
            phase: Phase::of(&item.schedule),
        })
        .collect();
    DueSet { entries }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueEntry {
    pub key: ItemKey,
    pub phase: Phase,
}

/// Items actionable now, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DueSet {
    entries: Vec<DueEntry>,
}

impl DueSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.iter().any(|entry| &entry.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DueEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ItemKey> {
        self.iter().map(|entry| &entry.key)
    }

    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &ItemKey> {
        self.iter()
            .filter(move |entry| entry.phase == phase)
            .map(|entry| &entry.key)
    }

    pub fn counts(&self) -> PhaseCounts {
        let mut counts = PhaseCounts::default();
        for entry in self.iter() {
            match entry.phase {
                Phase::First => counts.first += 1,
                Phase::Second => counts.second += 1,
                Phase::Third => counts.third += 1,
            }
        }
        counts
    }
}

/// Due items per phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    pub first: usize,
    pub second: usize,
    pub third: usize,
}

impl PhaseCounts {
    pub fn total(&self) -> usize {
        self.first + self.second + self.third
    }
}

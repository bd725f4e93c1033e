//! Item factories for integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use review_core::{ItemContent, ItemKey, LadderStep, LearningItem, ScheduleState};

/// Fixed "now" every test starts from.
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()
}

pub fn key(term: &str) -> ItemKey {
    ItemKey::new(term).unwrap()
}

/// A stored, never-scheduled item.
pub fn new_item(term: &str, translation: &str) -> LearningItem {
    LearningItem {
        key: key(term),
        due_at: None,
        schedule: ScheduleState::New,
        created_at: start() - Duration::days(1),
        version: 1,
        content: ItemContent::new(term, translation),
    }
}

/// A stored item on ladder rung `step`, due at `due_at`.
pub fn cramming(term: &str, translation: &str, step: u8, due_at: DateTime<Utc>) -> LearningItem {
    LearningItem {
        due_at: Some(due_at),
        schedule: ScheduleState::cramming(LadderStep::new(step).unwrap()),
        ..new_item(term, translation)
    }
}

/// A stored graduated item due at `due_at`.
pub fn graduated(term: &str, translation: &str, due_at: DateTime<Utc>) -> LearningItem {
    LearningItem {
        due_at: Some(due_at),
        schedule: ScheduleState::Graduated,
        ..new_item(term, translation)
    }
}

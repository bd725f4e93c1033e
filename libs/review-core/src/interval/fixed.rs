//! Fixed-offset interval policy.
//!
//! Every rating maps to one constant offset from "now"; the item's history
//! plays no part.

use chrono::{DateTime, Duration, Utc};

use super::IntervalPolicy;
use crate::settings::{SchedulerSettings, MAX_INTERVAL_DAYS, MAX_INTERVAL_MINUTES};
use crate::types::Rating;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIntervals {
    pub easy: Duration,
    pub medium: Duration,
    pub hard: Duration,
    pub very_hard: Duration,
}

impl Default for FixedIntervals {
    fn default() -> Self {
        Self::from_settings(&SchedulerSettings::default())
    }
}

impl FixedIntervals {
    /// Offsets from `settings`, clamped to the range `validate` accepts.
    pub fn from_settings(settings: &SchedulerSettings) -> Self {
        let days = |value: i64| Duration::days(value.clamp(1, MAX_INTERVAL_DAYS));
        Self {
            easy: days(settings.easy_days),
            medium: days(settings.medium_days),
            hard: days(settings.hard_days),
            very_hard: Duration::minutes(settings.very_hard_minutes.clamp(1, MAX_INTERVAL_MINUTES)),
        }
    }

    pub fn offset(&self, rating: Rating) -> Duration {
        match rating {
            Rating::Easy => self.easy,
            Rating::Medium => self.medium,
            Rating::Hard => self.hard,
            Rating::VeryHard => self.very_hard,
        }
    }
}

impl IntervalPolicy for FixedIntervals {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn next_due_at(&self, rating: Rating, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.offset(rating))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

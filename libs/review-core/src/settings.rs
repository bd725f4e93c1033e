//! Scheduler settings.

use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Largest UTC offset any real time zone uses, in minutes.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Longest interval a setting may ask for, about a hundred years.
pub(crate) const MAX_INTERVAL_DAYS: i64 = 36_500;
pub(crate) const MAX_INTERVAL_MINUTES: i64 = MAX_INTERVAL_DAYS * 24 * 60;
const MAX_NEW_ITEM_DELAY_HOURS: i64 = MAX_INTERVAL_DAYS * 24;
const MAX_REQUEUE_SECONDS: i64 = 24 * 60 * 60;

/// Tunable offsets and calendar settings for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub easy_days: i64,
    pub medium_days: i64,
    pub hard_days: i64,
    pub very_hard_minutes: i64,
    /// How far in the past a requeued ladder item is placed.
    pub requeue_seconds: i64,
    /// Delay before a freshly created item is first due.
    pub new_item_delay_hours: i64,
    /// Hour (0-23) at which a new study day begins.
    pub daily_reset_hour: u32,
    /// Fixed calendar offset. `None` follows the host's local time zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    /// How often the host refreshes "now".
    pub refresh_seconds: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            easy_days: 7,
            medium_days: 3,
            hard_days: 1,
            very_hard_minutes: 10,
            requeue_seconds: 60,
            new_item_delay_hours: 24,
            daily_reset_hour: 0,
            utc_offset_minutes: None,
            refresh_seconds: 60,
        }
    }
}

impl SchedulerSettings {
    pub fn validate(&self) -> Result<()> {
        check_range("easy_days", self.easy_days, 1, MAX_INTERVAL_DAYS)?;
        check_range("medium_days", self.medium_days, 1, MAX_INTERVAL_DAYS)?;
        check_range("hard_days", self.hard_days, 1, MAX_INTERVAL_DAYS)?;
        check_range("very_hard_minutes", self.very_hard_minutes, 1, MAX_INTERVAL_MINUTES)?;
        check_range("requeue_seconds", self.requeue_seconds, 0, MAX_REQUEUE_SECONDS)?;
        check_range(
            "new_item_delay_hours",
            self.new_item_delay_hours,
            0,
            MAX_NEW_ITEM_DELAY_HOURS,
        )?;
        check_range("daily_reset_hour", self.daily_reset_hour.into(), 0, 23)?;
        if let Some(minutes) = self.utc_offset_minutes {
            let max = i64::from(MAX_OFFSET_MINUTES);
            check_range("utc_offset_minutes", minutes.into(), -max, max)?;
        }
        if self.refresh_seconds == 0 {
            return Err(ScheduleError::InvalidSettings(
                "refresh_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn requeue_offset(&self) -> Duration {
        Duration::seconds(self.requeue_seconds.clamp(0, MAX_REQUEUE_SECONDS))
    }

    pub fn new_item_delay(&self) -> Duration {
        Duration::hours(self.new_item_delay_hours.clamp(0, MAX_NEW_ITEM_DELAY_HOURS))
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_seconds)
    }

    /// Configured fixed offset, or `None` for local time. Out-of-range
    /// values also read as `None`; [`validate`](Self::validate) rejects them.
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .filter(|minutes| minutes.abs() <= MAX_OFFSET_MINUTES)
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
    }
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        return Ok(());
    }
    Err(ScheduleError::InvalidSettings(format!(
        "{name} must be between {min} and {max}, got {value}"
    )))
}

//! Environment configuration.
//!
//! Recognised variables:
//! - VOCAB_DATA_PATH: JSON collection file (default `vocab.json`)
//! - VOCAB_SEARCH, VOCAB_CATEGORY, VOCAB_LEVEL: collection filter
//! - REVIEW_*: overrides for [`SchedulerSettings`] fields, e.g.
//!   REVIEW_EASY_DAYS or REVIEW_DAILY_RESET_HOUR. Without
//!   REVIEW_UTC_OFFSET_MINUTES study days follow the local time zone.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use review_core::{ScheduleError, SchedulerSettings};
use thiserror::Error;

use crate::filter::ItemFilter;

const DEFAULT_DATA_PATH: &str = "vocab.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid settings: {0}")]
    Settings(#[from] ScheduleError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
    pub filter: ItemFilter,
    pub settings: SchedulerSettings,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_path = lookup("VOCAB_DATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string())
            .into();

        let filter = ItemFilter {
            search: lookup("VOCAB_SEARCH").filter(|s| !s.trim().is_empty()),
            category: parse_var(&lookup, "VOCAB_CATEGORY")?,
            level: parse_var(&lookup, "VOCAB_LEVEL")?,
        };

        let mut settings = SchedulerSettings::default();
        override_var(&lookup, "REVIEW_EASY_DAYS", &mut settings.easy_days)?;
        override_var(&lookup, "REVIEW_MEDIUM_DAYS", &mut settings.medium_days)?;
        override_var(&lookup, "REVIEW_HARD_DAYS", &mut settings.hard_days)?;
        override_var(&lookup, "REVIEW_VERY_HARD_MINUTES", &mut settings.very_hard_minutes)?;
        override_var(&lookup, "REVIEW_REQUEUE_SECONDS", &mut settings.requeue_seconds)?;
        override_var(&lookup, "REVIEW_NEW_ITEM_DELAY_HOURS", &mut settings.new_item_delay_hours)?;
        override_var(&lookup, "REVIEW_DAILY_RESET_HOUR", &mut settings.daily_reset_hour)?;
        if let Some(minutes) = parse_var(&lookup, "REVIEW_UTC_OFFSET_MINUTES")? {
            settings.utc_offset_minutes = Some(minutes);
        }
        override_var(&lookup, "REVIEW_REFRESH_SECONDS", &mut settings.refresh_seconds)?;
        settings.validate()?;

        Ok(Self {
            data_path,
            filter,
            settings,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            var,
            value: value.clone(),
            reason: e.to_string(),
        })
}

fn override_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    field: &mut T,
) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    if let Some(value) = parse_var(lookup, var)? {
        *field = value;
    }
    Ok(())
}

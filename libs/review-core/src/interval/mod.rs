//! Long-interval scheduling for graduated items.

pub mod fixed;

pub use fixed::FixedIntervals;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Rating;

/// Maps a rating to the next due time of an item outside the ladder.
pub trait IntervalPolicy: Send + Sync {
    /// Policy identifier.
    fn name(&self) -> &'static str;

    /// Due time for an item rated `rating` at `now`.
    fn next_due_at(&self, rating: Rating, now: DateTime<Utc>) -> DateTime<Utc>;

    /// Same as [`next_due_at`](Self::next_due_at) for a raw wire token.
    fn next_due_at_token(&self, token: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let rating = token.parse::<Rating>()?;
        Ok(self.next_due_at(rating, now))
    }
}

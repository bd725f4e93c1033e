//! Error types for review-core.

use thiserror::Error;

/// Result type alias using ScheduleError.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Errors raised by the scheduling engine.
///
/// All of these are caller errors: they are returned before any schedule
/// field is computed, so nothing needs to be rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid rating: {0:?} (expected very_hard, hard, medium or easy)")]
    InvalidRating(String),

    #[error("invalid learning step {0} (expected 0, 1 or 2)")]
    InvalidLearningStep(u8),

    #[error("item {0} is not in the cramming ladder")]
    NotInLadder(String),

    #[error("item key must not be empty")]
    EmptyKey,

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

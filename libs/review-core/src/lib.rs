//! Scheduling engine shared by study front ends.
//!
//! Provides:
//! - Long-interval calculation for graduated items
//! - The three-step cramming ladder and its reset/early-finish rules
//! - Due-set selection with exact and calendar-day granularity
//! - Phase-prioritised random picking of the next item
//! - The review state machine tying the above together
//!
//! Everything here is a pure transform of explicit inputs. Persistence,
//! clocks and the live item feed belong to the host.

pub mod due;
pub mod error;
pub mod interval;
pub mod ladder;
pub mod machine;
pub mod picker;
pub mod session;
pub mod settings;
pub mod types;

pub use due::{is_due, select_due, DayBoundary, DueEntry, DueSet, PhaseCounts};
pub use error::{Result, ScheduleError};
pub use interval::{FixedIntervals, IntervalPolicy};
pub use ladder::{Ladder, Transition, TransitionKind};
pub use machine::{ReviewOutcome, Scheduler};
pub use picker::{pick_next, Phase};
pub use session::ReviewSession;
pub use settings::SchedulerSettings;
pub use types::{
    Category, CefrLevel, ItemContent, ItemKey, LadderStep, LearningItem, Rating, SchedulePatch,
    ScheduleState,
};

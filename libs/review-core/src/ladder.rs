//! Cramming ladder.
//!
//! A rated item climbs three short-interval rungs (steps 0, 1, 2) before it
//! is handed to the interval policy. `very_hard` always sends it back to
//! the bottom rung; any other rating climbs exactly one rung, whatever its
//! value. Rungs are requeued slightly in the past so the item is due again
//! right away.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::IntervalPolicy;
use crate::settings::SchedulerSettings;
use crate::types::{LadderStep, Rating, SchedulePatch, ScheduleState};

/// Which rule produced a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// `very_hard` sent the item to the bottom rung.
    Reset,
    /// A new item took its first rung.
    Entered,
    /// Climbed one rung.
    Advanced,
    /// Left the top rung for long-interval rotation.
    Graduated,
    /// Already graduated; only the due time moved.
    Rescheduled,
    /// Skipped the remaining rungs.
    FinishedEarly,
}

/// New schedule fields for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub schedule: ScheduleState,
    pub due_at: DateTime<Utc>,
}

impl Transition {
    pub fn patch(&self) -> SchedulePatch {
        SchedulePatch {
            due_at: self.due_at,
            schedule: self.schedule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder {
    requeue_offset: Duration,
}

impl Default for Ladder {
    fn default() -> Self {
        Self::from_settings(&SchedulerSettings::default())
    }
}

impl Ladder {
    pub fn new(requeue_offset: Duration) -> Self {
        Self { requeue_offset }
    }

    pub fn from_settings(settings: &SchedulerSettings) -> Self {
        Self::new(settings.requeue_offset())
    }

    /// Due time that puts an item straight back into the due set.
    pub fn requeue_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.requeue_offset)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn apply(
        &self,
        state: ScheduleState,
        rating: Rating,
        now: DateTime<Utc>,
        policy: &dyn IntervalPolicy,
    ) -> Transition {
        if rating.is_reset() {
            return self.requeue(TransitionKind::Reset, LadderStep::FIRST, now);
        }

        match state {
            ScheduleState::New => self.requeue(TransitionKind::Entered, LadderStep::FIRST, now),
            ScheduleState::Cramming { step } => match step.next() {
                Some(next) => self.requeue(TransitionKind::Advanced, next, now),
                None => Transition {
                    kind: TransitionKind::Graduated,
                    schedule: ScheduleState::Graduated,
                    due_at: policy.next_due_at(rating, now),
                },
            },
            ScheduleState::Graduated => Transition {
                kind: TransitionKind::Rescheduled,
                schedule: ScheduleState::Graduated,
                due_at: policy.next_due_at(rating, now),
            },
        }
    }

    /// Graduate immediately as if rated `medium`. Returns `None` for items
    /// that are already graduated.
    pub fn finish_early(
        &self,
        state: ScheduleState,
        now: DateTime<Utc>,
        policy: &dyn IntervalPolicy,
    ) -> Option<Transition> {
        if !state.can_finish_early() {
            return None;
        }
        Some(Transition {
            kind: TransitionKind::FinishedEarly,
            schedule: ScheduleState::Graduated,
            due_at: policy.next_due_at(Rating::Medium, now),
        })
    }

    fn requeue(&self, kind: TransitionKind, step: LadderStep, now: DateTime<Utc>) -> Transition {
        Transition {
            kind,
            schedule: ScheduleState::cramming(step),
            due_at: self.requeue_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::FixedIntervals;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 2, 9, 30, 0).unwrap()
    }

    fn step(n: u8) -> ScheduleState {
        ScheduleState::cramming(LadderStep::new(n).unwrap())
    }

    fn all_states() -> Vec<ScheduleState> {
        vec![ScheduleState::New, step(0), step(1), step(2), ScheduleState::Graduated]
    }

    #[test]
    fn very_hard_resets_from_every_state() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        for state in all_states() {
            let t = ladder.apply(state, Rating::VeryHard, now(), &policy);
            assert_eq!(t.kind, TransitionKind::Reset);
            assert_eq!(t.schedule, step(0));
            assert!(t.due_at <= now(), "reset must be due immediately from {state:?}");
        }
    }

    #[test]
    fn lower_rungs_advance_exactly_one_step_for_any_rating() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        for rating in [Rating::Hard, Rating::Medium, Rating::Easy] {
            for (from, to) in [(0, 1), (1, 2)] {
                let t = ladder.apply(step(from), rating, now(), &policy);
                assert_eq!(t.kind, TransitionKind::Advanced);
                assert_eq!(t.schedule, step(to));
                assert_eq!(t.due_at, now() - Duration::seconds(60));
            }
        }
    }

    #[test]
    fn top_rung_graduates_with_rating_interval() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        for (rating, days) in [(Rating::Hard, 1), (Rating::Medium, 3), (Rating::Easy, 7)] {
            let t = ladder.apply(step(2), rating, now(), &policy);
            assert_eq!(t.kind, TransitionKind::Graduated);
            assert_eq!(t.schedule, ScheduleState::Graduated);
            assert_eq!(t.due_at, now() + Duration::days(days));
        }
    }

    #[test]
    fn graduated_items_stay_graduated() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        for (rating, days) in [(Rating::Hard, 1), (Rating::Medium, 3), (Rating::Easy, 7)] {
            let t = ladder.apply(ScheduleState::Graduated, rating, now(), &policy);
            assert_eq!(t.kind, TransitionKind::Rescheduled);
            assert_eq!(t.schedule, ScheduleState::Graduated);
            assert_eq!(t.due_at, now() + Duration::days(days));
        }
    }

    #[test]
    fn new_item_enters_bottom_rung() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        let t = ladder.apply(ScheduleState::New, Rating::Easy, now(), &policy);
        assert_eq!(t.kind, TransitionKind::Entered);
        assert_eq!(t.schedule, step(0));
        assert!(t.due_at <= now());
    }

    #[test]
    fn finish_early_matches_medium_from_top_rung() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        let reference = ladder.apply(step(2), Rating::Medium, now(), &policy);
        for state in [ScheduleState::New, step(0), step(1), step(2)] {
            let t = ladder.finish_early(state, now(), &policy).unwrap();
            assert_eq!(t.kind, TransitionKind::FinishedEarly);
            assert_eq!(t.schedule, reference.schedule);
            assert_eq!(t.due_at, reference.due_at);
        }
    }

    #[test]
    fn finish_early_refused_once_graduated() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        assert_eq!(
            ladder.finish_early(ScheduleState::Graduated, now(), &policy),
            None
        );
    }

    #[test]
    fn zero_requeue_offset_is_due_exactly_now() {
        let ladder = Ladder::new(Duration::zero());
        let policy = FixedIntervals::default();
        let t = ladder.apply(step(0), Rating::Hard, now(), &policy);
        assert_eq!(t.due_at, now());
    }

    #[test]
    fn patch_carries_both_fields() {
        let ladder = Ladder::default();
        let policy = FixedIntervals::default();
        let t = ladder.apply(step(1), Rating::Medium, now(), &policy);
        let patch = t.patch();
        assert_eq!(patch.due_at, t.due_at);
        assert_eq!(patch.learning_step(), Some(2));
    }
}

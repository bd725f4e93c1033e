//! Next-item selection.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::due::DueSet;
use crate::types::{ItemKey, ScheduleState};

/// Priority bucket of a due item. Lower phases are always drained first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Bottom rung, and new items about to take it.
    First,
    /// Middle rung.
    Second,
    /// Top rung and graduated items.
    Third,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Self::First, Self::Second, Self::Third];

    pub fn of(state: &ScheduleState) -> Self {
        match state.learning_step() {
            Some(0) => Self::First,
            Some(1) => Self::Second,
            Some(_) => Self::Third,
            None if matches!(state, ScheduleState::New) => Self::First,
            None => Self::Third,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

/// Pick the next item to present: the lowest non-empty phase, then a
/// uniformly random member of it. `None` means nothing is due and the
/// session is complete.
pub fn pick_next<R: Rng + ?Sized>(due: &DueSet, rng: &mut R) -> Option<ItemKey> {
    Phase::ALL.iter().find_map(|phase| {
        let members: Vec<&ItemKey> = due.in_phase(*phase).collect();
        members.choose(rng).map(|key| (*key).clone())
    })
}

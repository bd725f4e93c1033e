//! Core types for the scheduling engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Stable identity of an item within one learner's collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ScheduleError::EmptyKey);
        }
        Ok(Self(key))
    }

    /// Derive a key from the source term.
    ///
    /// Surrounding whitespace is dropped, so `"Haus "` and `"Haus"` map to
    /// the same item.
    pub fn from_term(term: &str) -> Result<Self> {
        Self::new(term.trim())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemKey {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ItemKey> for String {
    fn from(key: ItemKey) -> Self {
        key.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reviewer's self-assessed recall difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    VeryHard,
    Hard,
    Medium,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Self::VeryHard, Self::Hard, Self::Medium, Self::Easy];

    /// Wire token for this rating.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VeryHard => "very_hard",
            Self::Hard => "hard",
            Self::Medium => "medium",
            Self::Easy => "easy",
        }
    }

    /// Whether this rating restarts the cramming ladder.
    pub fn is_reset(self) -> bool {
        matches!(self, Self::VeryHard)
    }
}

impl FromStr for Rating {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "very_hard" => Ok(Self::VeryHard),
            "hard" => Ok(Self::Hard),
            "medium" => Ok(Self::Medium),
            "easy" => Ok(Self::Easy),
            other => Err(ScheduleError::InvalidRating(other.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position on the cramming ladder. Only 0, 1 and 2 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LadderStep(u8);

impl LadderStep {
    /// Number of rungs on the ladder.
    pub const COUNT: u8 = 3;
    pub const FIRST: Self = Self(0);
    pub const TOP: Self = Self(Self::COUNT - 1);

    pub fn new(step: u8) -> Result<Self> {
        if step < Self::COUNT {
            Ok(Self(step))
        } else {
            Err(ScheduleError::InvalidLearningStep(step))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The next rung, or `None` at the top.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    pub fn is_top(self) -> bool {
        self == Self::TOP
    }
}

impl TryFrom<u8> for LadderStep {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LadderStep> for u8 {
    fn from(step: LadderStep) -> Self {
        step.0
    }
}

/// Where an item sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ScheduleState {
    /// Created but never rated.
    New,
    /// Mid-ladder; rescheduled by short fixed offsets.
    Cramming { step: LadderStep },
    /// Out of the ladder; rescheduled by the interval calculator.
    Graduated,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self::New
    }
}

impl ScheduleState {
    pub fn cramming(step: LadderStep) -> Self {
        Self::Cramming { step }
    }

    /// Flat encoding used by stores that keep a nullable step column:
    /// present while cramming, absent otherwise.
    pub fn learning_step(&self) -> Option<u8> {
        match self {
            Self::Cramming { step } => Some(step.get()),
            Self::New | Self::Graduated => None,
        }
    }

    /// Rebuild a state from the flat encoding. An absent step means the
    /// item is in long-interval rotation.
    pub fn from_learning_step(step: Option<u8>) -> Result<Self> {
        match step {
            Some(step) => Ok(Self::cramming(LadderStep::new(step)?)),
            None => Ok(Self::Graduated),
        }
    }

    /// Whether the reviewer may skip the rest of the ladder.
    pub fn can_finish_early(&self) -> bool {
        !matches!(self, Self::Graduated)
    }

    /// Progress label shown next to an item under study.
    pub fn round_label(&self) -> Option<String> {
        match self {
            Self::New => Some(format!("Round 1/{}", LadderStep::COUNT)),
            Self::Cramming { step } if step.is_top() => Some("Final Round".to_string()),
            Self::Cramming { step } => Some(format!("Round {}/{}", step.get() + 1, LadderStep::COUNT)),
            Self::Graduated => None,
        }
    }
}

/// Item topic bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Work,
    General,
}

impl Default for Category {
    fn default() -> Self {
        Self::General
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "work" => Ok(Self::Work),
            "general" => Ok(Self::General),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

/// CEFR difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl Default for CefrLevel {
    fn default() -> Self {
        Self::B1
    }
}

impl FromStr for CefrLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A1" => Ok(Self::A1),
            "A2" => Ok(Self::A2),
            "B1" => Ok(Self::B1),
            "B2" => Ok(Self::B2),
            "C1" => Ok(Self::C1),
            other => Err(format!("unknown CEFR level: {other}")),
        }
    }
}

/// Card content. The scheduler never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemContent {
    pub term: String,
    pub translation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub example_translation: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<CefrLevel>,
}

impl ItemContent {
    pub fn new(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    /// Level with older items (saved before levels existed) counted as B1.
    pub fn level_or_default(&self) -> CefrLevel {
        self.level.unwrap_or_default()
    }
}

/// One unit of study owned by a single learner's collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningItem {
    pub key: ItemKey,
    /// `None` means never scheduled; such items are always due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub schedule: ScheduleState,
    pub created_at: DateTime<Utc>,
    /// Store revision, bumped on every accepted write.
    #[serde(default)]
    pub version: u64,
    pub content: ItemContent,
}

/// Partial update carrying exactly the schedule fields of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePatch {
    pub due_at: DateTime<Utc>,
    pub schedule: ScheduleState,
}

impl SchedulePatch {
    pub fn learning_step(&self) -> Option<u8> {
        self.schedule.learning_step()
    }

    pub fn apply_to(&self, item: &mut LearningItem) {
        item.due_at = Some(self.due_at);
        item.schedule = self.schedule;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rating_parses_the_four_tokens() {
        for rating in Rating::ALL {
            assert_eq!(rating.as_str().parse::<Rating>(), Ok(rating));
        }
    }

    #[test]
    fn rating_rejects_unknown_tokens() {
        for token in ["again", "Easy", "", " hard", "very hard"] {
            assert_eq!(
                token.parse::<Rating>(),
                Err(ScheduleError::InvalidRating(token.to_string()))
            );
        }
    }

    #[test]
    fn ladder_step_bounds() {
        assert!(LadderStep::new(0).is_ok());
        assert!(LadderStep::new(2).is_ok());
        assert_eq!(LadderStep::new(3), Err(ScheduleError::InvalidLearningStep(3)));
        assert_eq!(LadderStep::new(255), Err(ScheduleError::InvalidLearningStep(255)));
    }

    #[test]
    fn ladder_step_next_stops_at_top() {
        assert_eq!(LadderStep::FIRST.next().map(LadderStep::get), Some(1));
        assert_eq!(LadderStep::TOP.next(), None);
        assert!(LadderStep::TOP.is_top());
    }

    #[test]
    fn ladder_step_rejected_on_deserialize() {
        let result: std::result::Result<ScheduleState, _> =
            serde_json::from_str(r#"{"phase":"cramming","step":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn schedule_state_json_shape() {
        let state = ScheduleState::cramming(LadderStep::new(1).unwrap());
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"phase":"cramming","step":1}"#);
        assert_eq!(
            serde_json::to_string(&ScheduleState::Graduated).unwrap(),
            r#"{"phase":"graduated"}"#
        );
    }

    #[test]
    fn flat_learning_step_encoding() {
        assert_eq!(ScheduleState::New.learning_step(), None);
        assert_eq!(ScheduleState::Graduated.learning_step(), None);
        assert_eq!(ScheduleState::cramming(LadderStep::TOP).learning_step(), Some(2));

        assert_eq!(ScheduleState::from_learning_step(None), Ok(ScheduleState::Graduated));
        assert_eq!(
            ScheduleState::from_learning_step(Some(1)),
            Ok(ScheduleState::cramming(LadderStep::new(1).unwrap()))
        );
        assert_eq!(
            ScheduleState::from_learning_step(Some(5)),
            Err(ScheduleError::InvalidLearningStep(5))
        );
    }

    #[test]
    fn round_labels() {
        assert_eq!(ScheduleState::New.round_label().as_deref(), Some("Round 1/3"));
        assert_eq!(
            ScheduleState::cramming(LadderStep::new(1).unwrap()).round_label().as_deref(),
            Some("Round 2/3")
        );
        assert_eq!(
            ScheduleState::cramming(LadderStep::TOP).round_label().as_deref(),
            Some("Final Round")
        );
        assert_eq!(ScheduleState::Graduated.round_label(), None);
    }

    #[test]
    fn item_key_from_term_trims() {
        let key = ItemKey::from_term("  Haus ").unwrap();
        assert_eq!(key.as_str(), "Haus");
        assert_eq!(ItemKey::from_term("   "), Err(ScheduleError::EmptyKey));
    }

    #[test]
    fn item_without_schedule_fields_deserializes_as_new() {
        let json = r#"{
            "key": "Haus",
            "created_at": "2026-01-01T00:00:00Z",
            "content": {"term": "house", "translation": "das Haus"}
        }"#;
        let item: LearningItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.due_at, None);
        assert_eq!(item.schedule, ScheduleState::New);
        assert_eq!(item.version, 0);
        assert_eq!(item.content.level_or_default(), CefrLevel::B1);
        assert_eq!(item.content.category, Category::General);
    }
}

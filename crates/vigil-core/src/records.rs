//! Stored rows for the progression and companion state.
//!
//! One row of each kind per user. Both are lazily created with zeroed
//! defaults on first access; a missing row is never an error. Level and
//! title are cached for display but always recomputed from XP at the
//! mutation site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::StudyDay;
use crate::guardian::GuardianStage;
use crate::levels::{level_for_xp, LEVELS};
use crate::wraith::WraithStage;

/// Per-user progression row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionRecord {
    /// Monotonic XP total; only an explicit full reset may lower it.
    pub xp: u64,
    /// Cached from `xp`, never independently advanced.
    pub level: u32,
    /// Cached from `xp`, never independently advanced.
    pub title: String,
    pub current_streak: u32,
    /// Always >= current_streak.
    pub longest_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<StudyDay>,
    pub total_focus_minutes: u64,
    pub total_reviews: u64,
    pub total_mocks: u64,
    /// Append-only set of unlocked achievement ids.
    pub achievements: Vec<String>,
    /// 0 or 1 under current policy. New users deliberately start with one
    /// banked (the refresh-time replenish rule would grant it anyway) so a
    /// first missed day can be forgiven without an intervening refresh.
    pub streak_freezes_remaining: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_freeze_used_at: Option<DateTime<Utc>>,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            xp: 0,
            level: LEVELS[0].level,
            title: LEVELS[0].title.to_string(),
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            total_focus_minutes: 0,
            total_reviews: 0,
            total_mocks: 0,
            achievements: Vec::new(),
            streak_freezes_remaining: 1,
            streak_freeze_used_at: None,
        }
    }
}

impl ProgressionRecord {
    /// Recompute the cached level and title from XP. The single place where
    /// level may change; it is a lookup, never an increment.
    pub fn refresh_level(&mut self) {
        let entry = level_for_xp(self.xp);
        self.level = entry.level;
        self.title = entry.title.to_string();
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }
}

/// Which companion authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompanionKind {
    Guardian,
    Wraith,
}

/// One line of companion dialogue shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionMessage {
    pub id: Uuid,
    pub companion: CompanionKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl CompanionMessage {
    pub fn new(companion: CompanionKind, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            companion,
            text: text.into(),
            created_at: at,
        }
    }
}

/// Per-user companion row, holding both automata. Written as one unit so
/// guardian and wraith updates from the same event cannot race each other.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompanionRecord {
    /// Monotonic feeding total in hours.
    pub guardian_total_hours: f64,
    /// Non-decreasing projection of guardian_total_hours.
    pub guardian_stage: GuardianStage,
    /// 0-100 as of `guardian_last_fed`. The stored value only changes on a
    /// feeding; the decayed view is recomputed from this anchor on read and
    /// never written back.
    pub guardian_health: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_last_fed: Option<DateTime<Utc>>,
    /// Consecutive fully missed days; reset by any qualifying event.
    pub wraith_days_idle: u32,
    pub wraith_stage: WraithStage,
    /// Urgency-weighted regret accumulator. Grows only while idle with an
    /// exam date set; never decremented by later study.
    pub wraith_wasted_days: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<StudyDay>,
    /// Bounded append-only message history, newest last.
    pub messages: Vec<CompanionMessage>,
}

impl CompanionRecord {
    /// Append a message, dropping the oldest past `max_history`.
    pub fn push_message(&mut self, message: CompanionMessage, max_history: usize) {
        self.messages.push(message);
        if self.messages.len() > max_history {
            let overflow = self.messages.len() - max_history;
            self.messages.drain(..overflow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progression_defaults() {
        let rec = ProgressionRecord::default();
        assert_eq!(rec.xp, 0);
        assert_eq!(rec.level, 1);
        assert_eq!(rec.title, "Fresh Candidate");
        assert!(rec.last_active_date.is_none());
        assert_eq!(rec.streak_freezes_remaining, 1);
    }

    #[test]
    fn test_refresh_level_follows_xp() {
        let mut rec = ProgressionRecord::default();
        rec.xp = 250;
        rec.refresh_level();
        assert_eq!(rec.level, 3);
        assert_eq!(rec.title, "Note Taker");
    }

    #[test]
    fn test_companion_defaults() {
        let rec = CompanionRecord::default();
        assert_eq!(rec.guardian_stage, GuardianStage::DormantSeed);
        assert_eq!(rec.wraith_stage, WraithStage::Vigilant);
        assert_eq!(rec.guardian_total_hours, 0.0);
        assert!(rec.messages.is_empty());
    }

    #[test]
    fn test_message_history_bounded() {
        let mut rec = CompanionRecord::default();
        let now = Utc::now();
        for i in 0..25 {
            rec.push_message(
                CompanionMessage::new(CompanionKind::Guardian, format!("m{}", i), now),
                20,
            );
        }
        assert_eq!(rec.messages.len(), 20);
        assert_eq!(rec.messages[0].text, "m5");
        assert_eq!(rec.messages.last().unwrap().text, "m24");
    }

    #[test]
    fn test_record_roundtrip() {
        let mut rec = ProgressionRecord::default();
        rec.xp = 120;
        rec.refresh_level();
        rec.achievements.push("first_session".to_string());
        let json = serde_json::to_string(&rec).unwrap();
        let back: ProgressionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.xp, 120);
        assert_eq!(back.level, 2);
        assert!(back.has_achievement("first_session"));
    }
}

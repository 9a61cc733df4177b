//! Achievement catalog for the progression system.
//!
//! Predicates are pure functions over the progression row. Checking never
//! mutates anything; the caller appends returned ids and persists.

use serde::Serialize;

use crate::records::ProgressionRecord;

/// Achievement badge with ASCII symbol and description.
/// The catalog is static; only ids are persisted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Achievement {
    /// Unique identifier
    pub id: &'static str,
    /// ASCII badge symbol (e.g., "[1]", "<7d>")
    pub badge: &'static str,
    /// Short name
    pub name: &'static str,
    /// Description of how to earn it
    pub description: &'static str,
}

impl Achievement {
    const fn new(id: &'static str, badge: &'static str, name: &'static str, desc: &'static str) -> Self {
        Self { id, badge, name, description: desc }
    }
}

/// All available achievements with ASCII badges.
pub fn all_achievements() -> Vec<Achievement> {
    vec![
        // First steps
        Achievement::new("first_session", "[1]", "First Focus", "Complete your first focus session"),
        Achievement::new("first_mock", "[M]", "Into the Arena", "Log your first mock exam"),

        // Focus-time milestones
        Achievement::new("focus_10h", "[10h]", "Deep Diver", "Accumulate 10 hours of focus time"),
        Achievement::new("focus_50h", "[50h]", "Marathon Mind", "Accumulate 50 hours of focus time"),
        Achievement::new("focus_100h", "[100h]", "Iron Focus", "Accumulate 100 hours of focus time"),

        // Streak achievements
        Achievement::new("streak_3", "<3d>", "On Fire", "Maintain a 3-day study streak"),
        Achievement::new("streak_7", "<7d>", "Week Warrior", "Maintain a 7-day study streak"),
        Achievement::new("streak_30", "<30d>", "Monthly Master", "Maintain a 30-day study streak"),

        // Volume achievements
        Achievement::new("reviews_50", "(50r)", "Card Shark", "Complete 50 reviews"),
        Achievement::new("reviews_250", "(250r)", "Memory Palace", "Complete 250 reviews"),
        Achievement::new("mocks_10", "(10m)", "Battle Tested", "Log 10 mock exams"),

        // Level achievements
        Achievement::new("level_5", "{L5}", "Halfway Up", "Reach level 5"),
        Achievement::new("level_10", "{L10}", "Summit", "Reach the top level"),

        // Special
        Achievement::new("frost_guard", "|*|", "Saved by the Freeze", "Have a streak freeze rescue your streak"),
    ]
}

/// Check if a specific achievement's predicate holds for a record.
fn is_satisfied(id: &str, rec: &ProgressionRecord) -> bool {
    match id {
        "first_session" => rec.total_focus_minutes >= 1,
        "first_mock" => rec.total_mocks >= 1,

        "focus_10h" => rec.total_focus_minutes >= 600,
        "focus_50h" => rec.total_focus_minutes >= 3_000,
        "focus_100h" => rec.total_focus_minutes >= 6_000,

        "streak_3" => rec.longest_streak >= 3,
        "streak_7" => rec.longest_streak >= 7,
        "streak_30" => rec.longest_streak >= 30,

        "reviews_50" => rec.total_reviews >= 50,
        "reviews_250" => rec.total_reviews >= 250,
        "mocks_10" => rec.total_mocks >= 10,

        "level_5" => rec.level >= 5,
        "level_10" => rec.level >= 10,

        "frost_guard" => rec.streak_freeze_used_at.is_some(),

        _ => false,
    }
}

/// Every catalog entry whose predicate holds and whose id is not yet in
/// `rec.achievements`. Pure: re-running without appending the returned ids
/// returns the same set; running after appending returns none of them.
pub fn check_new_achievements(rec: &ProgressionRecord) -> Vec<Achievement> {
    all_achievements()
        .into_iter()
        .filter(|a| is_satisfied(a.id, rec) && !rec.has_achievement(a.id))
        .collect()
}

/// Format a single achievement for a one-shot notification.
pub fn format_achievement_unlock(ach: &Achievement) -> String {
    format!("{} Achievement unlocked: {} - {}", ach.badge, ach.name, ach.description)
}
